// ABOUTME: Partial-progress storage layer using SQLite
// ABOUTME: CRUD for progress entries keyed by their parent planning

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{StorageError, StorageResult};
use crate::types::{PartialProgress, ProgressCreateInput, ProgressStatus, ProgressUpdateInput};

/// A progress entry joined with its parent planning's owner and course
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressWithContext {
    #[sqlx(flatten)]
    pub entry: PartialProgress,
    pub professor_id: String,
    pub course_name: String,
}

pub struct ProgressStorage {
    pool: SqlitePool,
}

impl ProgressStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        input: &ProgressCreateInput,
        status: ProgressStatus,
    ) -> StorageResult<PartialProgress> {
        let id = planea_core::generate_id();
        let now = Utc::now();

        debug!("Creating progress {} for planning {}", id, input.planning_id);

        let progress = sqlx::query_as::<_, PartialProgress>(
            r#"
            INSERT INTO partial_progress (
                id, planning_id, partial, progress_percentage, status,
                achievements, challenges, adjustments,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&input.planning_id)
        .bind(input.partial)
        .bind(input.progress_percentage)
        .bind(status)
        .bind(&input.achievements)
        .bind(&input.challenges)
        .bind(&input.adjustments)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(progress)
    }

    pub async fn get(&self, id: &str) -> StorageResult<Option<PartialProgress>> {
        let progress = sqlx::query_as::<_, PartialProgress>(
            "SELECT * FROM partial_progress WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(progress)
    }

    pub async fn list_for_planning(&self, planning_id: &str) -> StorageResult<Vec<PartialProgress>> {
        let entries = sqlx::query_as::<_, PartialProgress>(
            "SELECT * FROM partial_progress WHERE planning_id = ? AND is_active = 1 ORDER BY partial ASC",
        )
        .bind(planning_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(entries)
    }

    pub async fn update(
        &self,
        id: &str,
        input: &ProgressUpdateInput,
        status: Option<ProgressStatus>,
    ) -> StorageResult<Option<PartialProgress>> {
        debug!("Updating progress: {}", id);

        let mut query = String::from("UPDATE partial_progress SET updated_at = ?");
        if input.partial.is_some() {
            query.push_str(", partial = ?");
        }
        if input.progress_percentage.is_some() {
            query.push_str(", progress_percentage = ?");
        }
        if status.is_some() {
            query.push_str(", status = ?");
        }
        if input.achievements.is_some() {
            query.push_str(", achievements = ?");
        }
        if input.challenges.is_some() {
            query.push_str(", challenges = ?");
        }
        if input.adjustments.is_some() {
            query.push_str(", adjustments = ?");
        }
        query.push_str(" WHERE id = ? AND is_active = 1");

        let mut q = sqlx::query(&query).bind(Utc::now());
        if let Some(partial) = input.partial {
            q = q.bind(partial);
        }
        if let Some(percentage) = input.progress_percentage {
            q = q.bind(percentage);
        }
        if let Some(status) = status {
            q = q.bind(status);
        }
        if let Some(achievements) = &input.achievements {
            q = q.bind(achievements);
        }
        if let Some(challenges) = &input.challenges {
            q = q.bind(challenges);
        }
        if let Some(adjustments) = &input.adjustments {
            q = q.bind(adjustments);
        }
        q.bind(id).execute(&self.pool).await.map_err(StorageError::Sqlx)?;

        self.get(id).await
    }

    pub async fn soft_delete(&self, id: &str) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE partial_progress SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Active progress entries joined with their parent planning, for
    /// reports and the calendar agenda. Rows under inactive plannings are
    /// excluded; an optional professor scope restricts to one owner.
    pub async fn list_with_context(
        &self,
        partial: Option<i64>,
        professor_id: Option<&str>,
    ) -> StorageResult<Vec<ProgressWithContext>> {
        let mut query = String::from(
            "SELECT pp.*, p.professor_id, p.course_name \
             FROM partial_progress pp \
             JOIN plannings p ON p.id = pp.planning_id \
             WHERE pp.is_active = 1 AND p.is_active = 1",
        );
        if partial.is_some() {
            query.push_str(" AND pp.partial = ?");
        }
        if professor_id.is_some() {
            query.push_str(" AND p.professor_id = ?");
        }
        query.push_str(" ORDER BY pp.created_at DESC");

        let mut q = sqlx::query_as::<_, ProgressWithContext>(&query);
        if let Some(partial) = partial {
            q = q.bind(partial);
        }
        if let Some(professor_id) = professor_id {
            q = q.bind(professor_id);
        }

        let entries = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(entries)
    }

    /// All active progress entries, optionally restricted to one partial
    pub async fn list_active(&self, partial: Option<i64>) -> StorageResult<Vec<PartialProgress>> {
        let mut query = String::from("SELECT * FROM partial_progress WHERE is_active = 1");
        if partial.is_some() {
            query.push_str(" AND partial = ?");
        }

        let mut q = sqlx::query_as::<_, PartialProgress>(&query);
        if let Some(partial) = partial {
            q = q.bind(partial);
        }

        let entries = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(entries)
    }
}
