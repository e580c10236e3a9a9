use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::domain::DomainError;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::AppState;

const MIB: usize = 1024 * 1024;

/// What an upload endpoint accepts and where it stores it.
pub struct UploadKind {
    pub folder: &'static str,
    pub extensions: &'static [&'static str],
    pub max_bytes: usize,
}

pub const BOOK_COVER: UploadKind = UploadKind {
    folder: "images/books",
    extensions: &[".jpg", ".jpeg", ".png", ".webp"],
    max_bytes: 5 * MIB,
};

pub const BOOK_FILE: UploadKind = UploadKind {
    folder: "files/books",
    extensions: &[".pdf", ".epub", ".mobi", ".txt", ".doc", ".docx"],
    max_bytes: 50 * MIB,
};

impl UploadKind {
    /// Lower-cased extension (with the dot) if the file name is acceptable.
    pub fn accepted_extension(&self, filename: &str) -> Result<String, DomainError> {
        let ext = filename
            .rfind('.')
            .map(|i| filename[i..].to_lowercase())
            .unwrap_or_default();
        if self.extensions.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(DomainError::Validation(format!(
                "Invalid file type. Allowed: {}",
                self.extensions.join(", ")
            )))
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), DomainError> {
        if len > self.max_bytes {
            return Err(DomainError::Validation(format!(
                "File too large. Maximum size: {}MB",
                self.max_bytes / MIB
            )));
        }
        Ok(())
    }
}

async fn store_upload(
    state: &AppState,
    kind: &UploadKind,
    mut multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let ext = kind.accepted_extension(field.file_name().unwrap_or_default())?;
        let data = field
            .bytes()
            .await
            .map_err(|e| DomainError::Validation(format!("Could not read upload: {}", e)))?;
        kind.check_size(data.len())?;

        let stored = state.files.save(kind.folder, &ext, &data).await?;
        return Ok(Json(json!({
            "message": "Upload successful",
            "url": stored.url,
            "filename": stored.filename
        })));
    }
    Err(DomainError::Validation("No file uploaded".to_string()))
}

pub async fn upload_book_cover(
    State(state): State<AppState>,
    _current: CurrentUser,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    store_upload(&state, &BOOK_COVER, multipart).await
}

pub async fn upload_book_file(
    State(state): State<AppState>,
    _current: CurrentUser,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    store_upload(&state, &BOOK_FILE, multipart).await
}

pub async fn list_book_covers(State(state): State<AppState>) -> Result<impl IntoResponse, DomainError> {
    let files = state.files.list(BOOK_COVER.folder).await?;
    let total = files.len();
    Ok(Json(json!({ "images": files, "total": total })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_extensions_are_case_insensitive() {
        assert_eq!(BOOK_COVER.accepted_extension("Front.JPG").unwrap(), ".jpg");
        assert!(BOOK_COVER.accepted_extension("book.pdf").is_err());
        assert!(BOOK_COVER.accepted_extension("noext").is_err());
    }

    #[test]
    fn size_limits_differ_per_kind() {
        assert!(BOOK_COVER.check_size(5 * MIB).is_ok());
        assert!(BOOK_COVER.check_size(5 * MIB + 1).is_err());
        assert!(BOOK_FILE.check_size(20 * MIB).is_ok());
    }
}
