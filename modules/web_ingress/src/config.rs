use serde::{Deserialize, Serialize};

/// HTTP front door settings, read from `modules.web_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebIngressConfig {
    /// `host:port`; empty means "use server.host and server.port".
    #[serde(default)]
    pub bind_addr: String,
    /// Whole-request body limit in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Per-request timeout; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default)]
    pub cors_enabled: bool,
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for WebIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            max_body_bytes: default_max_body_bytes(),
            timeout_sec: 0,
            cors_enabled: false,
        }
    }
}
