use serde::Serialize;

use crate::types::{
    EvidenceCreateInput, EvidenceReviewInput, EvidenceStatus, EvidenceUpdateInput,
    PlanningCreateInput, PlanningReviewInput, PlanningStatus, PlanningUpdateInput,
    ProgressCreateInput, ProgressUpdateInput, UserCreateInput, UserUpdateInput,
};

/// Validation errors for workflow inputs
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if is_blank(value) {
        errors.push(ValidationError::new(field, format!("{} is required", field)));
    }
}

fn check_partial(errors: &mut Vec<ValidationError>, partial: i64) {
    if !(1..=3).contains(&partial) {
        errors.push(ValidationError::new("partial", "partial must be between 1 and 3"));
    }
}

fn check_attachment(errors: &mut Vec<ValidationError>, attachment: &crate::types::AttachmentInput) {
    if is_blank(&attachment.file_name) {
        errors.push(ValidationError::new("attachment.fileName", "attachment.fileName is required"));
    }
    if attachment.content_base64.is_none() && attachment.drive_file_id.is_none() {
        errors.push(ValidationError::new(
            "attachment",
            "attachment must carry contentBase64 or driveFileId",
        ));
    }
}

/// Validates a planning submission
pub fn validate_planning_create(data: &PlanningCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require(&mut errors, "courseName", &data.course_name);
    require(&mut errors, "cycle", &data.cycle);
    require(&mut errors, "content", &data.content);
    require(&mut errors, "objectives", &data.objectives);
    require(&mut errors, "methodology", &data.methodology);
    require(&mut errors, "evaluation", &data.evaluation);
    check_partial(&mut errors, data.partial);

    if let Some(attachment) = &data.attachment {
        check_attachment(&mut errors, attachment);
    }

    errors
}

/// Validates a planning update; provided fields must not be blank
pub fn validate_planning_update(data: &PlanningUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("courseName", &data.course_name),
        ("cycle", &data.cycle),
        ("content", &data.content),
        ("objectives", &data.objectives),
        ("methodology", &data.methodology),
        ("evaluation", &data.evaluation),
    ] {
        if let Some(value) = value {
            if is_blank(value) {
                errors.push(ValidationError::new(field, format!("{} cannot be empty", field)));
            }
        }
    }

    if let Some(partial) = data.partial {
        check_partial(&mut errors, partial);
    }
    if let Some(attachment) = &data.attachment {
        check_attachment(&mut errors, attachment);
    }

    errors
}

/// Validates a reviewer decision on a planning.
/// Feedback is mandatory whenever the status leaves `pending`.
pub fn validate_planning_review(data: &PlanningReviewInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.status == PlanningStatus::Pending {
        errors.push(ValidationError::new(
            "status",
            "status must be approved or adjustments_required",
        ));
    }
    match &data.feedback {
        Some(feedback) if !is_blank(feedback) => {}
        _ => errors.push(ValidationError::new("feedback", "feedback is required")),
    }

    errors
}

/// Validates an evidence submission. The file itself is checked by the workflow.
pub fn validate_evidence_create(data: &EvidenceCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require(&mut errors, "courseName", &data.course_name);
    require(&mut errors, "institution", &data.institution);
    if data.hours <= 0 {
        errors.push(ValidationError::new("hours", "hours must be a positive integer"));
    }
    if let Some(attachment) = &data.attachment {
        check_attachment(&mut errors, attachment);
    }

    errors
}

/// Validates an evidence update
pub fn validate_evidence_update(data: &EvidenceUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [("courseName", &data.course_name), ("institution", &data.institution)] {
        if let Some(value) = value {
            if is_blank(value) {
                errors.push(ValidationError::new(field, format!("{} cannot be empty", field)));
            }
        }
    }
    if let Some(hours) = data.hours {
        if hours <= 0 {
            errors.push(ValidationError::new("hours", "hours must be a positive integer"));
        }
    }
    if let Some(attachment) = &data.attachment {
        check_attachment(&mut errors, attachment);
    }

    errors
}

/// Validates a reviewer decision on an evidence
pub fn validate_evidence_review(data: &EvidenceReviewInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.status == EvidenceStatus::Pending {
        errors.push(ValidationError::new("status", "status must be approved or rejected"));
    }
    match &data.feedback {
        Some(feedback) if !is_blank(feedback) => {}
        _ => errors.push(ValidationError::new("feedback", "feedback is required")),
    }

    errors
}

fn check_percentage(errors: &mut Vec<ValidationError>, percentage: i64) {
    if !(0..=100).contains(&percentage) {
        errors.push(ValidationError::new(
            "progressPercentage",
            "progressPercentage must be between 0 and 100",
        ));
    }
}

/// Validates a progress submission
pub fn validate_progress_create(data: &ProgressCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require(&mut errors, "planningId", &data.planning_id);
    check_partial(&mut errors, data.partial);
    check_percentage(&mut errors, data.progress_percentage);

    errors
}

/// Validates a progress update
pub fn validate_progress_update(data: &ProgressUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(partial) = data.partial {
        check_partial(&mut errors, partial);
    }
    if let Some(percentage) = data.progress_percentage {
        check_percentage(&mut errors, percentage);
    }

    errors
}

/// Validates a user creation request
pub fn validate_user_create(data: &UserCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require(&mut errors, "name", &data.name);
    if is_blank(&data.email) || !data.email.contains('@') {
        errors.push(ValidationError::new("email", "a valid email is required"));
    }
    if data.password.len() < 8 {
        errors.push(ValidationError::new("password", "password must be at least 8 characters"));
    }

    errors
}

/// Validates a user update request
pub fn validate_user_update(data: &UserUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(name) = &data.name {
        if is_blank(name) {
            errors.push(ValidationError::new("name", "name cannot be empty"));
        }
    }
    if let Some(password) = &data.password {
        if password.len() < 8 {
            errors.push(ValidationError::new("password", "password must be at least 8 characters"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttachmentInput;

    fn planning_input() -> PlanningCreateInput {
        PlanningCreateInput {
            course_name: "Algebra".to_string(),
            partial: 1,
            cycle: "2024-2025".to_string(),
            content: "Linear equations".to_string(),
            objectives: "Solve systems".to_string(),
            methodology: "Workshops".to_string(),
            evaluation: "Weekly quizzes".to_string(),
            resources: None,
            attachment: None,
        }
    }

    #[test]
    fn test_valid_planning_passes() {
        assert!(validate_planning_create(&planning_input()).is_empty());
    }

    #[test]
    fn test_blank_required_fields_are_reported() {
        let mut input = planning_input();
        input.course_name = "  ".to_string();
        input.content = String::new();

        let errors = validate_planning_create(&input);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["courseName", "content"]);
    }

    #[test]
    fn test_partial_out_of_range() {
        let mut input = planning_input();
        input.partial = 4;
        let errors = validate_planning_create(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "partial");
    }

    #[test]
    fn test_attachment_requires_content_or_drive_reference() {
        let mut input = planning_input();
        input.attachment = Some(AttachmentInput {
            file_name: "plan.pdf".to_string(),
            content_base64: None,
            drive_file_id: None,
            file_url: None,
        });
        let errors = validate_planning_create(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "attachment");
    }

    #[test]
    fn test_review_requires_feedback() {
        let review = PlanningReviewInput {
            status: PlanningStatus::Approved,
            feedback: None,
        };
        let errors = validate_planning_review(&review);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "feedback");

        let review = PlanningReviewInput {
            status: PlanningStatus::Approved,
            feedback: Some("   ".to_string()),
        };
        assert_eq!(validate_planning_review(&review).len(), 1);
    }

    #[test]
    fn test_review_rejects_pending_status() {
        let review = PlanningReviewInput {
            status: PlanningStatus::Pending,
            feedback: Some("ok".to_string()),
        };
        let errors = validate_planning_review(&review);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "status");
    }

    #[test]
    fn test_evidence_hours_must_be_positive() {
        let input = EvidenceCreateInput {
            course_name: "Didactics".to_string(),
            institution: "UNAM".to_string(),
            date: chrono::Utc::now(),
            hours: 0,
            attachment: None,
        };
        let errors = validate_evidence_create(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "hours");
    }

    #[test]
    fn test_progress_percentage_bounds() {
        let input = ProgressCreateInput {
            planning_id: "p1".to_string(),
            partial: 1,
            progress_percentage: 101,
            achievements: None,
            challenges: None,
            adjustments: None,
        };
        let errors = validate_progress_create(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "progressPercentage");
    }
}
