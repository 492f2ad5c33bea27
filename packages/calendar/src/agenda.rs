// ABOUTME: Agenda synthesis from database rows
// ABOUTME: Maps plannings, evidences, and progress entries to calendar events

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use planea_auth::AuthUser;
use planea_planning::storage::{owner_scope, EvidenceFilter, PlanningFilter};
use planea_planning::{DbState, WorkflowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaEventKind {
    Planning,
    Evidence,
    Progress,
}

/// One entry in the synthesized agenda
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: AgendaEventKind,
    pub status: String,
    pub description: String,
}

fn one_hour(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start, start + Duration::hours(1))
}

/// Synthesize the requesting user's agenda from database rows.
/// Reviewers see every row; professors only their own. Events are merged,
/// sorted by start time, and truncated to `max_results`.
pub async fn build_agenda(
    db: &DbState,
    user: &AuthUser,
    max_results: usize,
) -> WorkflowResult<Vec<AgendaEvent>> {
    let scope = owner_scope(user.role, &user.id);
    let mut events = Vec::new();

    let plannings = db
        .plannings
        .list(&PlanningFilter { professor_id: scope.clone(), ..Default::default() })
        .await?;
    for planning in plannings {
        let (start, end) = one_hour(planning.submission_date);
        events.push(AgendaEvent {
            id: planning.id,
            title: format!("Planning: {} (partial {})", planning.course_name, planning.partial),
            start,
            end,
            kind: AgendaEventKind::Planning,
            status: planning.status.to_string(),
            description: format!("Cycle {}", planning.cycle),
        });
    }

    let evidences = db
        .evidences
        .list(&EvidenceFilter { professor_id: scope.clone(), status: None })
        .await?;
    for evidence in evidences {
        let (start, end) = one_hour(evidence.date);
        events.push(AgendaEvent {
            id: evidence.id,
            title: format!("Training: {}", evidence.course_name),
            start,
            end,
            kind: AgendaEventKind::Evidence,
            status: evidence.status.to_string(),
            description: format!("{} ({} hours)", evidence.institution, evidence.hours),
        });
    }

    let progress = db.progress.list_with_context(None, scope.as_deref()).await?;
    for item in progress {
        let (start, end) = one_hour(item.entry.created_at);
        events.push(AgendaEvent {
            id: item.entry.id,
            title: format!("Progress: {} (partial {})", item.course_name, item.entry.partial),
            start,
            end,
            kind: AgendaEventKind::Progress,
            status: item.entry.status.to_string(),
            description: format!("{}% complete", item.entry.progress_percentage),
        });
    }

    events.sort_by_key(|event| event.start);
    events.truncate(max_results);
    Ok(events)
}
