// ABOUTME: Session storage for bearer-token authentication
// ABOUTME: Only SHA-256 digests of tokens are persisted

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{StorageError, StorageResult};

/// A bearer-token session row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

pub struct SessionStorage {
    pool: SqlitePool,
}

impl SessionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<Session> {
        let id = planea_core::generate_id();

        debug!("Creating session for user {}", user_id);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at, is_active)
            VALUES (?, ?, ?, ?, ?, 1)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(session)
    }

    pub async fn find_active(&self, token_hash: &str) -> StorageResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token_hash = ? AND is_active = 1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(session)
    }

    /// Best-effort usage timestamp; callers log and continue on failure
    pub async fn touch(&self, token_hash: &str) -> StorageResult<()> {
        sqlx::query("UPDATE sessions SET last_used_at = ? WHERE token_hash = ? AND is_active = 1")
            .bind(Utc::now())
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    pub async fn revoke(&self, token_hash: &str) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE sessions SET is_active = 0 WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke_for_user(&self, user_id: &str) -> StorageResult<u64> {
        let result = sqlx::query("UPDATE sessions SET is_active = 0 WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected())
    }
}
