use chrono::{DateTime, Utc};
use planea_auth::Role;
use thiserror::Error;

use crate::types::{EvidenceStatus, PlanningStatus};

pub mod evidences;
pub mod plannings;
pub mod progress;
pub mod sessions;
pub mod users;

pub use evidences::EvidenceStorage;
pub use plannings::PlanningStorage;
pub use progress::{ProgressStorage, ProgressWithContext};
pub use sessions::{Session, SessionStorage};
pub use users::UserStorage;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Filter for querying plannings. The workflow layer forces `professor_id`
/// for professors before this reaches storage; storage applies it ahead of
/// every user-supplied predicate.
#[derive(Debug, Clone, Default)]
pub struct PlanningFilter {
    pub professor_id: Option<String>,
    pub course_name: Option<String>,
    pub partial: Option<i64>,
    pub status: Option<PlanningStatus>,
    pub cycle: Option<String>,
}

/// Filter for querying evidences
#[derive(Debug, Clone, Default)]
pub struct EvidenceFilter {
    pub professor_id: Option<String>,
    pub status: Option<EvidenceStatus>,
}

/// Filter for the training report date range
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Filter plannings/evidences by role: reviewers see everything,
/// professors only their own rows
pub fn owner_scope(role: Role, user_id: &str) -> Option<String> {
    if role.is_reviewer() {
        None
    } else {
        Some(user_id.to_string())
    }
}
