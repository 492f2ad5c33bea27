// ABOUTME: Evidence storage layer using SQLite
// ABOUTME: CRUD for training evidence records with review and soft deletion

use chrono::Utc;
use planea_files::StoredFile;
use sqlx::SqlitePool;
use tracing::debug;

use super::{DateRange, EvidenceFilter, StorageError, StorageResult};
use crate::types::{Evidence, EvidenceCreateInput, EvidenceStatus, EvidenceUpdateInput};

pub struct EvidenceStorage {
    pool: SqlitePool,
}

impl EvidenceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        professor_id: &str,
        input: &EvidenceCreateInput,
        file: &StoredFile,
    ) -> StorageResult<Evidence> {
        let id = planea_core::generate_id();
        let now = Utc::now();

        debug!("Creating evidence {} for professor {}", id, professor_id);

        let evidence = sqlx::query_as::<_, Evidence>(
            r#"
            INSERT INTO evidences (
                id, professor_id, course_name, institution, date, hours,
                file_url, file_name, drive_file_id, storage_type,
                status, is_active, created_at, updated_at
            ) VALUES (
                ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?,
                'pending', 1, ?, ?
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(professor_id)
        .bind(&input.course_name)
        .bind(&input.institution)
        .bind(input.date)
        .bind(input.hours)
        .bind(&file.url)
        .bind(&file.file_name)
        .bind(file.external_id.as_deref())
        .bind(file.kind)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(evidence)
    }

    pub async fn get(&self, id: &str) -> StorageResult<Option<Evidence>> {
        let evidence =
            sqlx::query_as::<_, Evidence>("SELECT * FROM evidences WHERE id = ? AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(evidence)
    }

    pub async fn list(&self, filter: &EvidenceFilter) -> StorageResult<Vec<Evidence>> {
        let mut query = String::from("SELECT * FROM evidences WHERE is_active = 1");
        if filter.professor_id.is_some() {
            query.push_str(" AND professor_id = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Evidence>(&query);
        if let Some(professor_id) = &filter.professor_id {
            q = q.bind(professor_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }

        let evidences = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(evidences)
    }

    /// Approved evidences inside an optional date range, for the training report
    pub async fn list_approved(&self, range: &DateRange) -> StorageResult<Vec<Evidence>> {
        let mut query =
            String::from("SELECT * FROM evidences WHERE is_active = 1 AND status = 'approved'");
        if range.start.is_some() {
            query.push_str(" AND date >= ?");
        }
        if range.end.is_some() {
            query.push_str(" AND date <= ?");
        }
        query.push_str(" ORDER BY date DESC");

        let mut q = sqlx::query_as::<_, Evidence>(&query);
        if let Some(start) = range.start {
            q = q.bind(start);
        }
        if let Some(end) = range.end {
            q = q.bind(end);
        }

        let evidences = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(evidences)
    }

    pub async fn update(
        &self,
        id: &str,
        input: &EvidenceUpdateInput,
        file: Option<&StoredFile>,
        reset_review: bool,
    ) -> StorageResult<Option<Evidence>> {
        debug!("Updating evidence: {}", id);

        let mut query = String::from("UPDATE evidences SET updated_at = ?");
        if input.course_name.is_some() {
            query.push_str(", course_name = ?");
        }
        if input.institution.is_some() {
            query.push_str(", institution = ?");
        }
        if input.date.is_some() {
            query.push_str(", date = ?");
        }
        if input.hours.is_some() {
            query.push_str(", hours = ?");
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
        if let Some(institution) = &input.institution {
            q = q.bind(institution);
        }
        if let Some(date) = input.date {
            q = q.bind(date);
        }
        if let Some(hours) = input.hours {
            q = q.bind(hours);
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

    pub async fn review(
        &self,
        id: &str,
        status: EvidenceStatus,
        feedback: &str,
    ) -> StorageResult<Option<Evidence>> {
        debug!("Reviewing evidence {} -> {}", id, status);

        let evidence = sqlx::query_as::<_, Evidence>(
            r#"
            UPDATE evidences
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

        Ok(evidence)
    }

    pub async fn soft_delete(&self, id: &str) -> StorageResult<bool> {
        let result =
            sqlx::query("UPDATE evidences SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
