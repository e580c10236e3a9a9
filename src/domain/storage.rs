//! File storage contract
//!
//! Uploaded covers and book files are handed to a `FileStore`, which keeps
//! the bytes and hands back a stable retrieval URL. The implementation lives
//! in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `folder` using a generated name ending in `extension`.
    async fn save(&self, folder: &str, extension: &str, bytes: &[u8])
    -> Result<StoredFile, DomainError>;

    /// List the files stored under `folder`.
    async fn list(&self, folder: &str) -> Result<Vec<StoredFile>, DomainError>;
}
