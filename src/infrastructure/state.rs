//! Application state shared by every handler

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::FileStore;
use crate::infrastructure::{Config, LocalFileStore};

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Settings built once at startup
    pub config: Arc<Config>,
    /// Where uploaded covers and book files go
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let files = Arc::new(LocalFileStore::new(
            config.upload_dir.clone(),
            config.public_base_url.clone(),
        ));

        Self {
            db,
            config: Arc::new(config),
            files,
        }
    }

    /// Swap the file store (tests use this to avoid touching disk layout).
    pub fn with_file_store(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = files;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
