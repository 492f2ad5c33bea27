// ABOUTME: Planning lifecycle: create, list, update, review, soft delete
// ABOUTME: Enforces the role/ownership policy and the status transition rules

use std::collections::HashMap;
use std::sync::Arc;

use planea_auth::{policy, AuthUser, Operation};
use planea_files::FileStore;
use tracing::info;

use super::notify::{self, CalendarNotifier};
use super::{discard_stored_file, resolve_attachment, WorkflowError, WorkflowResult};
use crate::db::DbState;
use crate::storage::{owner_scope, PlanningFilter};
use crate::types::{
    OwnerInfo, Planning, PlanningCreateInput, PlanningReviewInput, PlanningStatus,
    PlanningUpdateInput,
};
use crate::validator::{
    validate_planning_create, validate_planning_review, validate_planning_update,
};

pub struct PlanningWorkflow {
    db: DbState,
    files: Arc<dyn FileStore>,
    notifier: Arc<dyn CalendarNotifier>,
}

impl PlanningWorkflow {
    pub fn new(db: DbState, files: Arc<dyn FileStore>, notifier: Arc<dyn CalendarNotifier>) -> Self {
        Self { db, files, notifier }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        input: PlanningCreateInput,
    ) -> WorkflowResult<Planning> {
        if !policy::role_allowed(Operation::PlanningCreate, user.role) {
            return Err(WorkflowError::Forbidden("Only professors can submit plannings"));
        }

        let errors = validate_planning_create(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        // Upload first; a failed upload must prevent the database write
        let mut uploaded = false;
        let stored = match &input.attachment {
            Some(attachment) => {
                uploaded = attachment.content_base64.is_some();
                Some(resolve_attachment(&self.files, attachment).await?)
            }
            None => None,
        };

        let mut planning = match self.db.plannings.create(&user.id, &input, stored.as_ref()).await {
            Ok(planning) => planning,
            Err(e) => {
                if uploaded {
                    if let Some(stored) = &stored {
                        discard_stored_file(&self.files, stored).await;
                    }
                }
                return Err(e.into());
            }
        };

        self.attach_owner(&mut planning).await?;
        notify::dispatch(&self.notifier, notify::planning_submitted(&planning, &user.name));

        info!("Planning {} submitted by {}", planning.id, user.email);
        Ok(planning)
    }

    pub async fn get(&self, user: &AuthUser, id: &str) -> WorkflowResult<Planning> {
        let mut planning = self
            .db
            .plannings
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Planning"))?;

        if !policy::row_allowed(Operation::PlanningRead, user.role, &planning.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to view this planning"));
        }

        self.attach_owner(&mut planning).await?;
        Ok(planning)
    }

    /// List plannings. Professors are unconditionally scoped to their own
    /// rows; any professorId they supply is silently overridden.
    pub async fn list(
        &self,
        user: &AuthUser,
        mut filter: PlanningFilter,
    ) -> WorkflowResult<Vec<Planning>> {
        if let Some(owner) = owner_scope(user.role, &user.id) {
            filter.professor_id = Some(owner);
        }

        let mut plannings = self.db.plannings.list(&filter).await?;
        self.attach_owners(&mut plannings).await?;
        Ok(plannings)
    }

    /// Plannings for a course across past cycles
    pub async fn history(
        &self,
        user: &AuthUser,
        course_name: &str,
        exclude_cycle: Option<&str>,
    ) -> WorkflowResult<Vec<Planning>> {
        let scope = owner_scope(user.role, &user.id);

        let mut plannings = self
            .db
            .plannings
            .history(course_name, exclude_cycle, scope.as_deref())
            .await?;
        self.attach_owners(&mut plannings).await?;
        Ok(plannings)
    }

    /// Update the content of a planning. Only the owning professor, and only
    /// while the planning is pending or has adjustments required; editing an
    /// adjustments_required planning re-submits it as pending.
    pub async fn update(
        &self,
        user: &AuthUser,
        id: &str,
        input: PlanningUpdateInput,
    ) -> WorkflowResult<Planning> {
        let planning = self
            .db
            .plannings
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Planning"))?;

        if !policy::role_allowed(Operation::PlanningUpdate, user.role)
            || !policy::row_allowed(Operation::PlanningUpdate, user.role, &planning.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to update this planning"));
        }
        if planning.status == PlanningStatus::Approved {
            return Err(WorkflowError::Forbidden(
                "Approved plannings can only be changed through review",
            ));
        }

        let errors = validate_planning_update(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let mut uploaded = false;
        let stored = match &input.attachment {
            Some(attachment) => {
                uploaded = attachment.content_base64.is_some();
                Some(resolve_attachment(&self.files, attachment).await?)
            }
            None => None,
        };

        let reset_review = planning.status == PlanningStatus::AdjustmentsRequired;
        let updated = self
            .db
            .plannings
            .update(id, &input, stored.as_ref(), reset_review)
            .await;

        let mut planning = match updated {
            Ok(Some(planning)) => planning,
            Ok(None) => return Err(WorkflowError::NotFound("Planning")),
            Err(e) => {
                if uploaded {
                    if let Some(stored) = &stored {
                        discard_stored_file(&self.files, stored).await;
                    }
                }
                return Err(e.into());
            }
        };

        self.attach_owner(&mut planning).await?;
        info!("Planning {} updated by {}", planning.id, user.email);
        Ok(planning)
    }

    /// Record a reviewer decision. Feedback is mandatory; any current state
    /// may be re-reviewed.
    pub async fn review(
        &self,
        user: &AuthUser,
        id: &str,
        input: PlanningReviewInput,
    ) -> WorkflowResult<Planning> {
        if !policy::role_allowed(Operation::PlanningReview, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to review plannings"));
        }

        let errors = validate_planning_review(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let feedback = input.feedback.as_deref().unwrap_or_default();
        let mut planning = self
            .db
            .plannings
            .review(id, input.status, feedback)
            .await?
            .ok_or(WorkflowError::NotFound("Planning"))?;

        self.attach_owner(&mut planning).await?;
        notify::dispatch(&self.notifier, notify::planning_reviewed(&planning));

        info!("Planning {} reviewed as {} by {}", planning.id, planning.status, user.email);
        Ok(planning)
    }

    /// Soft-delete. The owning professor may delete only approved plannings;
    /// reviewers may delete in any state.
    pub async fn delete(&self, user: &AuthUser, id: &str) -> WorkflowResult<()> {
        let planning = self
            .db
            .plannings
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Planning"))?;

        if !policy::row_allowed(Operation::PlanningDelete, user.role, &planning.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to delete this planning"));
        }
        if !user.role.is_reviewer() && planning.status != PlanningStatus::Approved {
            return Err(WorkflowError::Forbidden(
                "Plannings can be deleted only after approval",
            ));
        }

        self.db.plannings.soft_delete(id).await?;
        info!("Planning {} deleted by {}", id, user.email);
        Ok(())
    }

    async fn attach_owner(&self, planning: &mut Planning) -> WorkflowResult<()> {
        let owners = self.db.users.owner_infos(&[planning.professor_id.clone()]).await?;
        planning.professor = owners.into_iter().next();
        Ok(())
    }

    async fn attach_owners(&self, plannings: &mut [Planning]) -> WorkflowResult<()> {
        if plannings.is_empty() {
            return Ok(());
        }

        let mut ids: Vec<String> = plannings.iter().map(|p| p.professor_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let owners: HashMap<String, OwnerInfo> = self
            .db
            .users
            .owner_infos(&ids)
            .await?
            .into_iter()
            .map(|owner| (owner.id.clone(), owner))
            .collect();

        for planning in plannings {
            planning.professor = owners.get(&planning.professor_id).cloned();
        }
        Ok(())
    }
}
