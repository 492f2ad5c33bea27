// ABOUTME: Calendar notification contract consumed by the workflows
// ABOUTME: Notifications are fire-and-forget; failures are logged, never propagated

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::warn;

use crate::types::{Evidence, PartialProgress, Planning};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Calendar request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarEventKind {
    PlanningSubmitted,
    PlanningReviewed,
    EvidenceSubmitted,
    EvidenceReviewed,
    ProgressRecorded,
}

/// An event pushed to the reviewer/professor calendars
#[derive(Debug, Clone)]
pub struct CalendarNotification {
    pub kind: CalendarEventKind,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait CalendarNotifier: Send + Sync {
    async fn notify(&self, event: CalendarNotification) -> Result<(), NotifyError>;
}

/// Used when no calendar credentials are configured
pub struct NoopNotifier;

#[async_trait::async_trait]
impl CalendarNotifier for NoopNotifier {
    async fn notify(&self, _event: CalendarNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Dispatch without blocking the operation; errors are logged and swallowed
pub fn dispatch(notifier: &Arc<dyn CalendarNotifier>, event: CalendarNotification) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        let kind = event.kind;
        if let Err(e) = notifier.notify(event).await {
            warn!("Calendar notification {:?} failed: {}", kind, e);
        }
    });
}

fn one_hour_slot(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start, start + Duration::hours(1))
}

pub fn planning_submitted(planning: &Planning, professor_name: &str) -> CalendarNotification {
    let (start, end) = one_hour_slot(planning.submission_date);
    CalendarNotification {
        kind: CalendarEventKind::PlanningSubmitted,
        summary: format!("New planning: {}", planning.course_name),
        description: format!(
            "Planning for {} - partial {}\nCycle: {}\nProfessor: {}",
            planning.course_name, planning.partial, planning.cycle, professor_name
        ),
        start,
        end,
    }
}

pub fn planning_reviewed(planning: &Planning) -> CalendarNotification {
    let (start, end) = one_hour_slot(Utc::now());
    CalendarNotification {
        kind: CalendarEventKind::PlanningReviewed,
        summary: format!("Planning reviewed: {}", planning.course_name),
        description: format!(
            "Status: {}\nFeedback: {}",
            planning.status,
            planning.feedback.as_deref().unwrap_or("-")
        ),
        start,
        end,
    }
}

pub fn evidence_submitted(evidence: &Evidence, professor_name: &str) -> CalendarNotification {
    let (start, end) = one_hour_slot(evidence.date);
    CalendarNotification {
        kind: CalendarEventKind::EvidenceSubmitted,
        summary: format!("Training evidence: {}", evidence.course_name),
        description: format!(
            "Institution: {}\nHours: {}\nProfessor: {}",
            evidence.institution, evidence.hours, professor_name
        ),
        start,
        end,
    }
}

pub fn evidence_reviewed(evidence: &Evidence) -> CalendarNotification {
    let (start, end) = one_hour_slot(Utc::now());
    CalendarNotification {
        kind: CalendarEventKind::EvidenceReviewed,
        summary: format!("Evidence reviewed: {}", evidence.course_name),
        description: format!(
            "Status: {}\nFeedback: {}",
            evidence.status,
            evidence.feedback.as_deref().unwrap_or("-")
        ),
        start,
        end,
    }
}

pub fn progress_recorded(progress: &PartialProgress, course_name: &str) -> CalendarNotification {
    let (start, end) = one_hour_slot(Utc::now());
    CalendarNotification {
        kind: CalendarEventKind::ProgressRecorded,
        summary: format!("Progress: {} - partial {}", course_name, progress.partial),
        description: format!(
            "Recorded {}% complete\nAchievements: {}",
            progress.progress_percentage,
            progress.achievements.as_deref().unwrap_or("-")
        ),
        start,
        end,
    }
}
