// ABOUTME: Evidence lifecycle: create, list, update, review, soft delete
// ABOUTME: Mirrors the planning lifecycle with a binary review outcome

use std::collections::HashMap;
use std::sync::Arc;

use planea_auth::{policy, AuthUser, Operation};
use planea_files::FileStore;
use tracing::info;

use super::notify::{self, CalendarNotifier};
use super::{discard_stored_file, resolve_attachment, WorkflowError, WorkflowResult};
use crate::db::DbState;
use crate::storage::{owner_scope, EvidenceFilter};
use crate::types::{
    Evidence, EvidenceCreateInput, EvidenceReviewInput, EvidenceStatus, EvidenceUpdateInput,
    OwnerInfo,
};
use crate::validator::{
    validate_evidence_create, validate_evidence_review, validate_evidence_update, ValidationError,
};

pub struct EvidenceWorkflow {
    db: DbState,
    files: Arc<dyn FileStore>,
    notifier: Arc<dyn CalendarNotifier>,
}

impl EvidenceWorkflow {
    pub fn new(db: DbState, files: Arc<dyn FileStore>, notifier: Arc<dyn CalendarNotifier>) -> Self {
        Self { db, files, notifier }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        input: EvidenceCreateInput,
    ) -> WorkflowResult<Evidence> {
        if !policy::role_allowed(Operation::EvidenceCreate, user.role) {
            return Err(WorkflowError::Forbidden("Only professors can submit evidences"));
        }

        let mut errors = validate_evidence_create(&input);
        // The supporting document is mandatory for evidences
        let Some(attachment) = input.attachment.as_ref() else {
            errors.push(ValidationError::new("attachment", "a supporting file is required"));
            return Err(WorkflowError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let uploaded = attachment.content_base64.is_some();
        let stored = resolve_attachment(&self.files, attachment).await?;

        let mut evidence = match self.db.evidences.create(&user.id, &input, &stored).await {
            Ok(evidence) => evidence,
            Err(e) => {
                if uploaded {
                    discard_stored_file(&self.files, &stored).await;
                }
                return Err(e.into());
            }
        };

        self.attach_owner(&mut evidence).await?;
        notify::dispatch(&self.notifier, notify::evidence_submitted(&evidence, &user.name));

        info!("Evidence {} submitted by {}", evidence.id, user.email);
        Ok(evidence)
    }

    pub async fn get(&self, user: &AuthUser, id: &str) -> WorkflowResult<Evidence> {
        let mut evidence = self
            .db
            .evidences
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Evidence"))?;

        if !policy::row_allowed(Operation::EvidenceRead, user.role, &evidence.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to view this evidence"));
        }

        self.attach_owner(&mut evidence).await?;
        Ok(evidence)
    }

    /// List evidences; professors are unconditionally scoped to their own rows
    pub async fn list(
        &self,
        user: &AuthUser,
        mut filter: EvidenceFilter,
    ) -> WorkflowResult<Vec<Evidence>> {
        if let Some(owner) = owner_scope(user.role, &user.id) {
            filter.professor_id = Some(owner);
        }

        let mut evidences = self.db.evidences.list(&filter).await?;
        self.attach_owners(&mut evidences).await?;
        Ok(evidences)
    }

    /// Update an evidence. Only the owning professor, and only while the
    /// evidence has not been approved; editing a rejected evidence
    /// re-submits it as pending.
    pub async fn update(
        &self,
        user: &AuthUser,
        id: &str,
        input: EvidenceUpdateInput,
    ) -> WorkflowResult<Evidence> {
        let evidence = self
            .db
            .evidences
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Evidence"))?;

        if !policy::role_allowed(Operation::EvidenceUpdate, user.role)
            || !policy::row_allowed(Operation::EvidenceUpdate, user.role, &evidence.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to update this evidence"));
        }
        if evidence.status == EvidenceStatus::Approved {
            return Err(WorkflowError::Forbidden(
                "Approved evidences can only be changed through review",
            ));
        }

        let errors = validate_evidence_update(&input);
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

        let reset_review = evidence.status == EvidenceStatus::Rejected;
        let updated = self
            .db
            .evidences
            .update(id, &input, stored.as_ref(), reset_review)
            .await;

        let mut evidence = match updated {
            Ok(Some(evidence)) => evidence,
            Ok(None) => return Err(WorkflowError::NotFound("Evidence")),
            Err(e) => {
                if uploaded {
                    if let Some(stored) = &stored {
                        discard_stored_file(&self.files, stored).await;
                    }
                }
                return Err(e.into());
            }
        };

        self.attach_owner(&mut evidence).await?;
        info!("Evidence {} updated by {}", evidence.id, user.email);
        Ok(evidence)
    }

    pub async fn review(
        &self,
        user: &AuthUser,
        id: &str,
        input: EvidenceReviewInput,
    ) -> WorkflowResult<Evidence> {
        if !policy::role_allowed(Operation::EvidenceReview, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to review evidences"));
        }

        let errors = validate_evidence_review(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let feedback = input.feedback.as_deref().unwrap_or_default();
        let mut evidence = self
            .db
            .evidences
            .review(id, input.status, feedback)
            .await?
            .ok_or(WorkflowError::NotFound("Evidence"))?;

        self.attach_owner(&mut evidence).await?;
        notify::dispatch(&self.notifier, notify::evidence_reviewed(&evidence));

        info!("Evidence {} reviewed as {} by {}", evidence.id, evidence.status, user.email);
        Ok(evidence)
    }

    /// Soft-delete. The owning professor may delete only approved evidences;
    /// reviewers may delete in any state.
    pub async fn delete(&self, user: &AuthUser, id: &str) -> WorkflowResult<()> {
        let evidence = self
            .db
            .evidences
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("Evidence"))?;

        if !policy::row_allowed(Operation::EvidenceDelete, user.role, &evidence.professor_id, &user.id)
        {
            return Err(WorkflowError::Forbidden("Not authorized to delete this evidence"));
        }
        if !user.role.is_reviewer() && evidence.status != EvidenceStatus::Approved {
            return Err(WorkflowError::Forbidden(
                "Evidences can be deleted only after approval",
            ));
        }

        self.db.evidences.soft_delete(id).await?;
        info!("Evidence {} deleted by {}", id, user.email);
        Ok(())
    }

    async fn attach_owner(&self, evidence: &mut Evidence) -> WorkflowResult<()> {
        let owners = self.db.users.owner_infos(&[evidence.professor_id.clone()]).await?;
        evidence.professor = owners.into_iter().next();
        Ok(())
    }

    async fn attach_owners(&self, evidences: &mut [Evidence]) -> WorkflowResult<()> {
        if evidences.is_empty() {
            return Ok(());
        }

        let mut ids: Vec<String> = evidences.iter().map(|e| e.professor_id.clone()).collect();
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

        for evidence in evidences {
            evidence.professor = owners.get(&evidence.professor_id).cloned();
        }
        Ok(())
    }
}
