// ABOUTME: Attachment storage collaborators for planning and evidence files
// ABOUTME: FileStore trait with local-disk and Google Drive implementations

mod drive;
mod local;

pub use drive::DriveFileStore;
pub use local::LocalFileStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the attachment store; any of these aborts the surrounding write
#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected: {0}")]
    Upload(String),
}

/// Where an attachment lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Local,
    GoogleDrive,
}

/// Reference to a stored attachment
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub file_name: String,
    pub external_id: Option<String>,
    pub kind: StorageKind,
}

/// Storage collaborator contract: one save per create/update, delete on rollback
#[async_trait]
pub trait FileStore: Send + Sync {
    fn kind(&self) -> StorageKind;

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, FileError>;

    async fn delete(&self, stored: &StoredFile) -> Result<(), FileError>;
}

/// Strip path components from a client-supplied file name
pub(crate) fn sanitize_file_name(raw: &str) -> String {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim();
    if name.is_empty() {
        "attachment".to_string()
    } else {
        name.to_string()
    }
}
