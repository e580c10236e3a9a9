//! Local-disk implementation of FileStore

use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::{DomainError, FileStore, StoredFile};

/// Writes files below `root/<folder>/` and serves them from
/// `<base_url>/static/<folder>/<name>`.
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: PathBuf, base_url: String) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, folder: &str, filename: &str) -> String {
        format!("{}/static/{}/{}", self.base_url, folder, filename)
    }
}

fn io_error(e: std::io::Error) -> DomainError {
    DomainError::Internal(format!("File storage error: {}", e))
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(
        &self,
        folder: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, DomainError> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;

        let filename = format!("{}{}", Uuid::new_v4(), extension);
        tokio::fs::write(dir.join(&filename), bytes)
            .await
            .map_err(io_error)?;

        tracing::info!("Stored upload {}/{} ({} bytes)", folder, filename, bytes.len());

        Ok(StoredFile {
            url: self.url_for(folder, &filename),
            filename,
            size: bytes.len() as u64,
        })
    }

    async fn list(&self, folder: &str) -> Result<Vec<StoredFile>, DomainError> {
        let dir = self.root.join(folder);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_error(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let metadata = entry.metadata().await.map_err(io_error)?;
            if !metadata.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            files.push(StoredFile {
                url: self.url_for(folder, &filename),
                filename,
                size: metadata.len(),
            });
        }
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }
}
