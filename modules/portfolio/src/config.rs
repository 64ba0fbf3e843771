use serde::{Deserialize, Serialize};

/// Configuration for the portfolio module (`modules.portfolio` in the app config).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortfolioConfig {
    /// Key used to sign session cookies.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Upload folder; relative paths are resolved against the server home dir.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Lifetime of a "remember me" session.
    #[serde(default = "default_remember_days")]
    pub remember_days: u64,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default)]
    pub password: PasswordConfig,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
            page_size: default_page_size(),
            remember_days: default_remember_days(),
            secure_cookies: false,
            password: PasswordConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl PortfolioConfig {
    pub fn remember_lifetime(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.remember_days * 24 * 3600)
    }
}

fn default_secret_key() -> String {
    "dev-secret-key-change-me".to_string()
}

fn default_upload_dir() -> String {
    "static/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_page_size() -> u64 {
    9
}

fn default_remember_days() -> u64 {
    30
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}
