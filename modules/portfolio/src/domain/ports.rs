use async_trait::async_trait;

use crate::contract::model::MediaUpload;

/// Where uploaded images end up.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Whether `file_name` carries an allowed image extension.
    fn accepts(&self, file_name: &str) -> bool;

    /// Store the upload under a fresh unique name and return that name.
    /// `None` when the upload has no name or a disallowed extension.
    async fn save(&self, upload: &MediaUpload) -> anyhow::Result<Option<String>>;
}

/// Salted one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;
    /// False for a wrong password or an unreadable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
