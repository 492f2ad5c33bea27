// ABOUTME: Planning storage layer using SQLite
// ABOUTME: CRUD, filtered listing, cycle history, review and soft deletion

use chrono::Utc;
use planea_files::{StorageKind, StoredFile};
use sqlx::SqlitePool;
use tracing::debug;

use super::{PlanningFilter, StorageError, StorageResult};
use crate::types::{Planning, PlanningCreateInput, PlanningStatus, PlanningUpdateInput};

pub struct PlanningStorage {
    pool: SqlitePool,
}

impl PlanningStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        professor_id: &str,
        input: &PlanningCreateInput,
        file: Option<&StoredFile>,
    ) -> StorageResult<Planning> {
        let id = planea_core::generate_id();
        let now = Utc::now();
        let storage_type = file.map(|f| f.kind).unwrap_or(StorageKind::Local);

        debug!("Creating planning {} for professor {}", id, professor_id);

        let planning = sqlx::query_as::<_, Planning>(
            r#"
            INSERT INTO plannings (
                id, professor_id, course_name, partial, cycle,
                content, objectives, methodology, evaluation, resources,
                status, file_url, file_name, drive_file_id, storage_type,
                submission_date, is_active, created_at, updated_at
            ) VALUES (
                ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?,
                'pending', ?, ?, ?, ?,
                ?, 1, ?, ?
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(professor_id)
        .bind(&input.course_name)
        .bind(input.partial)
        .bind(&input.cycle)
        .bind(&input.content)
        .bind(&input.objectives)
        .bind(&input.methodology)
        .bind(&input.evaluation)
        .bind(&input.resources)
        .bind(file.map(|f| f.url.as_str()))
        .bind(file.map(|f| f.file_name.as_str()))
        .bind(file.and_then(|f| f.external_id.as_deref()))
        .bind(storage_type)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(planning)
    }

    pub async fn get(&self, id: &str) -> StorageResult<Option<Planning>> {
        let planning =
            sqlx::query_as::<_, Planning>("SELECT * FROM plannings WHERE id = ? AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(planning)
    }

    pub async fn list(&self, filter: &PlanningFilter) -> StorageResult<Vec<Planning>> {
        // The ownership clause binds first, ahead of any user-supplied filter
        let mut query = String::from("SELECT * FROM plannings WHERE is_active = 1");
        if filter.professor_id.is_some() {
            query.push_str(" AND professor_id = ?");
        }
        if filter.course_name.is_some() {
            query.push_str(" AND course_name = ?");
        }
        if filter.partial.is_some() {
            query.push_str(" AND partial = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.cycle.is_some() {
            query.push_str(" AND cycle = ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Planning>(&query);
        if let Some(professor_id) = &filter.professor_id {
            q = q.bind(professor_id);
        }
        if let Some(course_name) = &filter.course_name {
            q = q.bind(course_name);
        }
        if let Some(partial) = filter.partial {
            q = q.bind(partial);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(cycle) = &filter.cycle {
            q = q.bind(cycle);
        }

        let plannings = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(plannings)
    }

    /// Plannings for a course across past cycles
    pub async fn history(
        &self,
        course_name: &str,
        exclude_cycle: Option<&str>,
        professor_id: Option<&str>,
    ) -> StorageResult<Vec<Planning>> {
        let mut query =
            String::from("SELECT * FROM plannings WHERE is_active = 1 AND course_name = ?");
        if exclude_cycle.is_some() {
            query.push_str(" AND cycle != ?");
        }
        if professor_id.is_some() {
            query.push_str(" AND professor_id = ?");
        }
        query.push_str(" ORDER BY cycle DESC, partial ASC");

        let mut q = sqlx::query_as::<_, Planning>(&query).bind(course_name);
        if let Some(cycle) = exclude_cycle {
            q = q.bind(cycle);
        }
        if let Some(professor_id) = professor_id {
            q = q.bind(professor_id);
        }

        let plannings = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(plannings)
    }

    pub async fn update(
        &self,
        id: &str,
        input: &PlanningUpdateInput,
        file: Option<&StoredFile>,
        reset_review: bool,
    ) -> StorageResult<Option<Planning>> {
        debug!("Updating planning: {}", id);

        let mut query = String::from("UPDATE plannings SET updated_at = ?");
        if input.course_name.is_some() {
            query.push_str(", course_name = ?");
        }
        if input.partial.is_some() {
            query.push_str(", partial = ?");
        }
        if input.cycle.is_some() {
            query.push_str(", cycle = ?");
        }
        if input.content.is_some() {
            query.push_str(", content = ?");
        }
        if input.objectives.is_some() {
            query.push_str(", objectives = ?");
        }
        if input.methodology.is_some() {
            query.push_str(", methodology = ?");
        }
        if input.evaluation.is_some() {
            query.push_str(", evaluation = ?");
        }
        if input.resources.is_some() {
            query.push_str(", resources = ?");
        }
        if file.is_some() {
            query.push_str(", file_url = ?, file_name = ?, drive_file_id = ?, storage_type = ?");
        }
        if reset_review {
            query.push_str(", status = 'pending', feedback = NULL");
        }
        query.push_str(" WHERE id = ? AND is_active = 1");

        let mut q = sqlx::query(&query).bind(Utc::now());
        if let Some(course_name) = &input.course_name {
            q = q.bind(course_name);
        }
        if let Some(partial) = input.partial {
            q = q.bind(partial);
        }
        if let Some(cycle) = &input.cycle {
            q = q.bind(cycle);
        }
        if let Some(content) = &input.content {
            q = q.bind(content);
        }
        if let Some(objectives) = &input.objectives {
            q = q.bind(objectives);
        }
        if let Some(methodology) = &input.methodology {
            q = q.bind(methodology);
        }
        if let Some(evaluation) = &input.evaluation {
            q = q.bind(evaluation);
        }
        if let Some(resources) = &input.resources {
            q = q.bind(resources);
        }
        if let Some(file) = file {
            q = q
                .bind(&file.url)
                .bind(&file.file_name)
                .bind(file.external_id.as_deref())
                .bind(file.kind);
        }
        q.bind(id).execute(&self.pool).await.map_err(StorageError::Sqlx)?;

        self.get(id).await
    }

    /// Overwrite the review decision; any current state may be re-reviewed
    pub async fn review(
        &self,
        id: &str,
        status: PlanningStatus,
        feedback: &str,
    ) -> StorageResult<Option<Planning>> {
        debug!("Reviewing planning {} -> {}", id, status);

        let planning = sqlx::query_as::<_, Planning>(
            r#"
            UPDATE plannings
            SET status = ?, feedback = ?, updated_at = ?
            WHERE id = ? AND is_active = 1
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(feedback)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(planning)
    }

    pub async fn soft_delete(&self, id: &str) -> StorageResult<bool> {
        let result =
            sqlx::query("UPDATE plannings SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
