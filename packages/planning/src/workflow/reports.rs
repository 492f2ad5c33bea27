// ABOUTME: Aggregate reports over plannings, progress, and training evidences
// ABOUTME: Reviewer-only JSON summaries; rendering to Excel/PDF is out of scope

use std::collections::HashMap;

use planea_auth::{policy, AuthUser, Operation};
use serde::Serialize;

use super::{WorkflowError, WorkflowResult};
use crate::db::DbState;
use crate::storage::{DateRange, PlanningFilter};
use crate::types::{OwnerInfo, PlanningStatus, ProgressStatus};

/// Counts by review status for one cycle/partial slice
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningComplianceReport {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub adjustments_required: usize,
    /// Share of plannings already approved, 0.0 when there are none
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorProgress {
    pub professor: OwnerInfo,
    pub total: usize,
    pub average_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub total: usize,
    pub average_progress: f64,
    pub fulfilled: usize,
    pub partial: usize,
    pub unfulfilled: usize,
    pub by_professor: Vec<ProfessorProgress>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorTraining {
    pub professor: OwnerInfo,
    pub courses: usize,
    pub hours: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub total_courses: usize,
    pub total_hours: i64,
    pub by_professor: Vec<ProfessorTraining>,
}

pub struct ReportWorkflow {
    db: DbState,
}

impl ReportWorkflow {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }

    fn authorize(&self, user: &AuthUser) -> WorkflowResult<()> {
        if !policy::role_allowed(Operation::ReportRead, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to view reports"));
        }
        Ok(())
    }

    async fn owners_by_id(&self, ids: Vec<String>) -> WorkflowResult<HashMap<String, OwnerInfo>> {
        let owners = self.db.users.owner_infos(&ids).await?;
        Ok(owners.into_iter().map(|o| (o.id.clone(), o)).collect())
    }

    pub async fn planning_compliance(
        &self,
        user: &AuthUser,
        cycle: Option<String>,
        partial: Option<i64>,
    ) -> WorkflowResult<PlanningComplianceReport> {
        self.authorize(user)?;

        let filter = PlanningFilter { cycle, partial, ..Default::default() };
        let plannings = self.db.plannings.list(&filter).await?;

        let total = plannings.len();
        let approved = plannings.iter().filter(|p| p.status == PlanningStatus::Approved).count();
        let pending = plannings.iter().filter(|p| p.status == PlanningStatus::Pending).count();
        let adjustments_required = plannings
            .iter()
            .filter(|p| p.status == PlanningStatus::AdjustmentsRequired)
            .count();
        let compliance_rate = if total > 0 { approved as f64 / total as f64 } else { 0.0 };

        Ok(PlanningComplianceReport {
            total,
            pending,
            approved,
            adjustments_required,
            compliance_rate,
        })
    }

    pub async fn progress(
        &self,
        user: &AuthUser,
        partial: Option<i64>,
    ) -> WorkflowResult<ProgressReport> {
        self.authorize(user)?;

        let entries = self.db.progress.list_with_context(partial, None).await?;

        let total = entries.len();
        let fulfilled = entries.iter().filter(|e| e.entry.status == ProgressStatus::Fulfilled).count();
        let partial_count = entries.iter().filter(|e| e.entry.status == ProgressStatus::Partial).count();
        let unfulfilled = entries
            .iter()
            .filter(|e| e.entry.status == ProgressStatus::Unfulfilled)
            .count();
        let average_progress = if total > 0 {
            entries.iter().map(|e| e.entry.progress_percentage as f64).sum::<f64>() / total as f64
        } else {
            0.0
        };

        // Per-professor buckets: (entry count, percentage sum)
        let mut buckets: HashMap<String, (usize, i64)> = HashMap::new();
        for entry in &entries {
            let bucket = buckets.entry(entry.professor_id.clone()).or_default();
            bucket.0 += 1;
            bucket.1 += entry.entry.progress_percentage;
        }

        let owners = self.owners_by_id(buckets.keys().cloned().collect()).await?;
        let mut by_professor: Vec<ProfessorProgress> = buckets
            .into_iter()
            .filter_map(|(id, (count, sum))| {
                owners.get(&id).map(|owner| ProfessorProgress {
                    professor: owner.clone(),
                    total: count,
                    average_progress: sum as f64 / count as f64,
                })
            })
            .collect();
        by_professor.sort_by(|a, b| a.professor.name.cmp(&b.professor.name));

        Ok(ProgressReport {
            total,
            average_progress,
            fulfilled,
            partial: partial_count,
            unfulfilled,
            by_professor,
        })
    }

    pub async fn training(
        &self,
        user: &AuthUser,
        range: DateRange,
    ) -> WorkflowResult<TrainingReport> {
        self.authorize(user)?;

        let evidences = self.db.evidences.list_approved(&range).await?;

        let total_courses = evidences.len();
        let total_hours: i64 = evidences.iter().map(|e| e.hours).sum();

        let mut buckets: HashMap<String, (usize, i64)> = HashMap::new();
        for evidence in &evidences {
            let bucket = buckets.entry(evidence.professor_id.clone()).or_default();
            bucket.0 += 1;
            bucket.1 += evidence.hours;
        }

        let owners = self.owners_by_id(buckets.keys().cloned().collect()).await?;
        let mut by_professor: Vec<ProfessorTraining> = buckets
            .into_iter()
            .filter_map(|(id, (courses, hours))| {
                owners.get(&id).map(|owner| ProfessorTraining {
                    professor: owner.clone(),
                    courses,
                    hours,
                })
            })
            .collect();
        by_professor.sort_by(|a, b| a.professor.name.cmp(&b.professor.name));

        Ok(TrainingReport { total_courses, total_hours, by_professor })
    }
}
