// ABOUTME: Partial-progress lifecycle gated by the parent planning's status
// ABOUTME: Progress status is always derived server-side from the percentage

use std::sync::Arc;

use planea_auth::{policy, AuthUser, Operation, Role};
use serde::Serialize;
use tracing::info;

use super::notify::{self, CalendarNotifier};
use super::{WorkflowError, WorkflowResult};
use crate::db::DbState;
use crate::types::{
    PartialProgress, Planning, PlanningStatus, ProgressCreateInput, ProgressStatus,
    ProgressUpdateInput,
};
use crate::validator::{validate_progress_create, validate_progress_update};

/// Whether progress entries under a planning are visible to the requester.
/// Reviewers always; the owning professor only once the planning is approved.
pub fn can_view_progress(role: Role, is_owner: bool, planning_status: PlanningStatus) -> bool {
    if role.is_reviewer() {
        return true;
    }
    is_owner && planning_status == PlanningStatus::Approved
}

/// Whether a progress entry may be recorded under a planning.
/// Same rule as visibility; this is the authoritative server-side check.
pub fn can_create_progress(role: Role, is_owner: bool, planning_status: PlanningStatus) -> bool {
    can_view_progress(role, is_owner, planning_status)
}

/// Aggregate counts over active progress entries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total: usize,
    pub fulfilled: usize,
    pub partial: usize,
    pub unfulfilled: usize,
    pub average_progress: f64,
}

pub struct ProgressWorkflow {
    db: DbState,
    notifier: Arc<dyn CalendarNotifier>,
}

impl ProgressWorkflow {
    pub fn new(db: DbState, notifier: Arc<dyn CalendarNotifier>) -> Self {
        Self { db, notifier }
    }

    async fn parent(&self, planning_id: &str) -> WorkflowResult<Planning> {
        self.db
            .plannings
            .get(planning_id)
            .await?
            .ok_or(WorkflowError::NotFound("Planning"))
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        input: ProgressCreateInput,
    ) -> WorkflowResult<PartialProgress> {
        let errors = validate_progress_create(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let planning = self.parent(&input.planning_id).await?;
        let is_owner = planning.professor_id == user.id;
        if !can_create_progress(user.role, is_owner, planning.status) {
            return Err(WorkflowError::Forbidden(
                "Progress can be recorded only on your own approved plannings",
            ));
        }

        let status = ProgressStatus::from_percentage(input.progress_percentage);
        let progress = self.db.progress.create(&input, status).await?;

        notify::dispatch(&self.notifier, notify::progress_recorded(&progress, &planning.course_name));

        info!(
            "Progress {} recorded for planning {} ({}%)",
            progress.id, planning.id, progress.progress_percentage
        );
        Ok(progress)
    }

    pub async fn list_for_planning(
        &self,
        user: &AuthUser,
        planning_id: &str,
    ) -> WorkflowResult<Vec<PartialProgress>> {
        let planning = self.parent(planning_id).await?;
        let is_owner = planning.professor_id == user.id;
        if !can_view_progress(user.role, is_owner, planning.status) {
            return Err(WorkflowError::Forbidden(
                "Not authorized to view progress for this planning",
            ));
        }

        let entries = self.db.progress.list_for_planning(planning_id).await?;
        Ok(entries)
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: &str,
        input: ProgressUpdateInput,
    ) -> WorkflowResult<PartialProgress> {
        let progress = self
            .db
            .progress
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Progress"))?;
        let planning = self.parent(&progress.planning_id).await?;

        if !policy::row_allowed(Operation::ProgressUpdate, user.role, &planning.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to update this progress"));
        }

        let errors = validate_progress_update(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        // Re-derive the status whenever the percentage changes
        let status = input.progress_percentage.map(ProgressStatus::from_percentage);

        let progress = self
            .db
            .progress
            .update(id, &input, status)
            .await?
            .ok_or(WorkflowError::NotFound("Progress"))?;

        info!("Progress {} updated by {}", progress.id, user.email);
        Ok(progress)
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> WorkflowResult<()> {
        let progress = self
            .db
            .progress
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Progress"))?;
        let planning = self.parent(&progress.planning_id).await?;

        if !policy::row_allowed(Operation::ProgressDelete, user.role, &planning.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to delete this progress"));
        }

        self.db.progress.soft_delete(id).await?;
        info!("Progress {} deleted by {}", id, user.email);
        Ok(())
    }

    /// Aggregate statistics for reviewers
    pub async fn stats(&self, user: &AuthUser, partial: Option<i64>) -> WorkflowResult<ProgressStats> {
        if !policy::role_allowed(Operation::ProgressStats, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to view progress statistics"));
        }

        let entries = self.db.progress.list_active(partial).await?;
        let total = entries.len();
        let fulfilled = entries.iter().filter(|p| p.status == ProgressStatus::Fulfilled).count();
        let partial_count = entries.iter().filter(|p| p.status == ProgressStatus::Partial).count();
        let unfulfilled = entries.iter().filter(|p| p.status == ProgressStatus::Unfulfilled).count();
        let average_progress = if total > 0 {
            entries.iter().map(|p| p.progress_percentage as f64).sum::<f64>() / total as f64
        } else {
            0.0
        };

        Ok(ProgressStats {
            total,
            fulfilled,
            partial: partial_count,
            unfulfilled,
            average_progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviewers_always_pass_the_gate() {
        for status in [
            PlanningStatus::Pending,
            PlanningStatus::Approved,
            PlanningStatus::AdjustmentsRequired,
        ] {
            assert!(can_view_progress(Role::Admin, false, status));
            assert!(can_create_progress(Role::Coordinator, false, status));
        }
    }

    #[test]
    fn test_owner_professor_requires_approved_parent() {
        assert!(can_create_progress(Role::Professor, true, PlanningStatus::Approved));
        assert!(!can_create_progress(Role::Professor, true, PlanningStatus::Pending));
        assert!(!can_create_progress(Role::Professor, true, PlanningStatus::AdjustmentsRequired));
    }

    #[test]
    fn test_foreign_professor_never_passes_the_gate() {
        for status in [
            PlanningStatus::Pending,
            PlanningStatus::Approved,
            PlanningStatus::AdjustmentsRequired,
        ] {
            assert!(!can_view_progress(Role::Professor, false, status));
            assert!(!can_create_progress(Role::Professor, false, status));
        }
    }
}
