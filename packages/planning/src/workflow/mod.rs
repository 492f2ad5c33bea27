// ABOUTME: Workflow services enforcing the review/ownership rules on top of storage
// ABOUTME: One service per entity; all dependencies injected, no global state

use std::sync::Arc;

use base64::Engine;
use planea_files::{FileError, FileStore, StorageKind, StoredFile};
use thiserror::Error;
use tracing::warn;

use crate::storage::StorageError;
use crate::types::AttachmentInput;
use crate::validator::ValidationError;

pub mod evidences;
pub mod notify;
pub mod plannings;
pub mod progress;
pub mod reports;
pub mod users;

pub use evidences::EvidenceWorkflow;
pub use plannings::PlanningWorkflow;
pub use progress::{can_create_progress, can_view_progress, ProgressWorkflow};
pub use reports::ReportWorkflow;
pub use users::UserWorkflow;

/// Workflow errors, mapped to HTTP statuses at the API layer
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation errors: {0:?}")]
    Validation(Vec<ValidationError>),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Upstream storage failure: {0}")]
    Upstream(#[from] FileError),
    #[error("Password hashing failed")]
    Password(#[from] planea_auth::PasswordError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Resolve an attachment input into a stored file reference.
/// Inline content goes through the configured file store; a Drive reference
/// from a client-side upload is taken as-is.
pub(crate) async fn resolve_attachment(
    files: &Arc<dyn FileStore>,
    attachment: &AttachmentInput,
) -> WorkflowResult<StoredFile> {
    if let Some(content) = &attachment.content_base64 {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(content.trim())
            .map_err(|_| {
                WorkflowError::Validation(vec![ValidationError::new(
                    "attachment.contentBase64",
                    "attachment content is not valid base64",
                )])
            })?;
        Ok(files.save(&attachment.file_name, &bytes).await?)
    } else if let Some(drive_id) = &attachment.drive_file_id {
        let url = attachment
            .file_url
            .clone()
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", drive_id));
        Ok(StoredFile {
            url,
            file_name: attachment.file_name.clone(),
            external_id: Some(drive_id.clone()),
            kind: StorageKind::GoogleDrive,
        })
    } else {
        Err(WorkflowError::Validation(vec![ValidationError::new(
            "attachment",
            "attachment must carry contentBase64 or driveFileId",
        )]))
    }
}

/// Best-effort cleanup when the row write fails after a successful upload
pub(crate) async fn discard_stored_file(files: &Arc<dyn FileStore>, stored: &StoredFile) {
    if let Err(e) = files.delete(stored).await {
        warn!("Failed to discard orphaned attachment {}: {}", stored.url, e);
    }
}
