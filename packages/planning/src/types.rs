use chrono::{DateTime, Utc};
use planea_auth::Role;
use planea_files::StorageKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review outcome of a didactic planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanningStatus {
    Pending,
    Approved,
    AdjustmentsRequired,
}

impl Default for PlanningStatus {
    fn default() -> Self {
        PlanningStatus::Pending
    }
}

impl fmt::Display for PlanningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningStatus::Pending => write!(f, "pending"),
            PlanningStatus::Approved => write!(f, "approved"),
            PlanningStatus::AdjustmentsRequired => write!(f, "adjustments_required"),
        }
    }
}

/// Review outcome of a training evidence; binary, no adjustments state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for EvidenceStatus {
    fn default() -> Self {
        EvidenceStatus::Pending
    }
}

impl fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceStatus::Pending => write!(f, "pending"),
            EvidenceStatus::Approved => write!(f, "approved"),
            EvidenceStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Derived fulfillment band of a partial-progress entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Fulfilled,
    Partial,
    Unfulfilled,
}

impl ProgressStatus {
    /// Fixed thresholds, inclusive on the lower bound of each band.
    /// Always recomputed server-side; never taken from client input.
    pub fn from_percentage(percentage: i64) -> Self {
        if percentage >= 90 {
            ProgressStatus::Fulfilled
        } else if percentage >= 60 {
            ProgressStatus::Partial
        } else {
            ProgressStatus::Unfulfilled
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::Fulfilled => write!(f, "fulfilled"),
            ProgressStatus::Partial => write!(f, "partial"),
            ProgressStatus::Unfulfilled => write!(f, "unfulfilled"),
        }
    }
}

/// Owner info embedded in planning/evidence responses
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A user account. Never hard-deleted; deactivation is a soft flag.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A didactic planning submitted by a professor for one grading partial
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub id: String,
    pub professor_id: String,
    pub course_name: String,
    pub partial: i64,
    pub cycle: String,
    pub content: String,
    pub objectives: String,
    pub methodology: String,
    pub evaluation: String,
    pub resources: Option<String>,
    pub status: PlanningStatus,
    pub feedback: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub drive_file_id: Option<String>,
    pub storage_type: StorageKind,
    pub submission_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<OwnerInfo>,
}

/// A completed external training course with supporting document
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    pub professor_id: String,
    pub course_name: String,
    pub institution: String,
    pub date: DateTime<Utc>,
    pub hours: i64,
    pub file_url: String,
    pub file_name: Option<String>,
    pub drive_file_id: Option<String>,
    pub storage_type: StorageKind,
    pub status: EvidenceStatus,
    pub feedback: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<OwnerInfo>,
}

/// A mid-cycle progress report against an approved planning
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PartialProgress {
    pub id: String,
    pub planning_id: String,
    pub partial: i64,
    pub progress_percentage: i64,
    pub status: ProgressStatus,
    pub achievements: Option<String>,
    pub challenges: Option<String>,
    pub adjustments: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attachment supplied with a planning or evidence submission.
/// Either inline content (stored through the configured file store) or a
/// reference to a file the client already uploaded to Drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    pub file_name: String,
    pub content_base64: Option<String>,
    pub drive_file_id: Option<String>,
    pub file_url: Option<String>,
}

/// Input for submitting a new planning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningCreateInput {
    pub course_name: String,
    pub partial: i64,
    pub cycle: String,
    pub content: String,
    pub objectives: String,
    pub methodology: String,
    pub evaluation: String,
    pub resources: Option<String>,
    pub attachment: Option<AttachmentInput>,
}

/// Input for updating an existing planning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningUpdateInput {
    pub course_name: Option<String>,
    pub partial: Option<i64>,
    pub cycle: Option<String>,
    pub content: Option<String>,
    pub objectives: Option<String>,
    pub methodology: Option<String>,
    pub evaluation: Option<String>,
    pub resources: Option<String>,
    pub attachment: Option<AttachmentInput>,
}

/// Reviewer decision on a planning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningReviewInput {
    pub status: PlanningStatus,
    pub feedback: Option<String>,
}

/// Input for submitting a new evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceCreateInput {
    pub course_name: String,
    pub institution: String,
    pub date: DateTime<Utc>,
    pub hours: i64,
    pub attachment: Option<AttachmentInput>,
}

/// Input for updating an existing evidence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceUpdateInput {
    pub course_name: Option<String>,
    pub institution: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub hours: Option<i64>,
    pub attachment: Option<AttachmentInput>,
}

/// Reviewer decision on an evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceReviewInput {
    pub status: EvidenceStatus,
    pub feedback: Option<String>,
}

/// Input for recording partial progress. The status is always derived
/// from the percentage, never accepted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCreateInput {
    pub planning_id: String,
    pub partial: i64,
    pub progress_percentage: i64,
    pub achievements: Option<String>,
    pub challenges: Option<String>,
    pub adjustments: Option<String>,
}

/// Input for updating a progress entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateInput {
    pub partial: Option<i64>,
    pub progress_percentage: Option<i64>,
    pub achievements: Option<String>,
    pub challenges: Option<String>,
    pub adjustments: Option<String>,
}

/// Input for creating a user account (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Input for updating a user account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// An issued session, returned by login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_thresholds() {
        assert_eq!(ProgressStatus::from_percentage(95), ProgressStatus::Fulfilled);
        assert_eq!(ProgressStatus::from_percentage(90), ProgressStatus::Fulfilled);
        assert_eq!(ProgressStatus::from_percentage(75), ProgressStatus::Partial);
        assert_eq!(ProgressStatus::from_percentage(60), ProgressStatus::Partial);
        assert_eq!(ProgressStatus::from_percentage(59), ProgressStatus::Unfulfilled);
        assert_eq!(ProgressStatus::from_percentage(40), ProgressStatus::Unfulfilled);
        assert_eq!(ProgressStatus::from_percentage(0), ProgressStatus::Unfulfilled);
        assert_eq!(ProgressStatus::from_percentage(100), ProgressStatus::Fulfilled);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PlanningStatus::AdjustmentsRequired).unwrap(),
            "\"adjustments_required\""
        );
        assert_eq!(serde_json::to_string(&EvidenceStatus::Rejected).unwrap(), "\"rejected\"");
        assert_eq!(serde_json::to_string(&ProgressStatus::Unfulfilled).unwrap(), "\"unfulfilled\"");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Role::Professor,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("passwordHash"));
    }
}
