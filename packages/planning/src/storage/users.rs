// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles CRUD operations for user accounts with soft deletion

use chrono::Utc;
use planea_auth::Role;
use sqlx::SqlitePool;
use tracing::debug;

use super::{StorageError, StorageResult};
use crate::types::{OwnerInfo, User};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> StorageResult<User> {
        let id = planea_core::generate_id();
        let now = Utc::now();

        debug!("Creating user: {} ({})", email, role);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn get(&self, id: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? AND is_active = 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn list_active(&self) -> StorageResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_active = 1 ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(users)
    }

    pub async fn list_professors(&self) -> StorageResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'professor' AND is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(users)
    }

    /// Owner info for embedding in planning/evidence responses.
    /// Includes deactivated owners so historical rows keep their author.
    pub async fn owner_infos(&self, ids: &[String]) -> StorageResult<Vec<OwnerInfo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!("SELECT id, name, email FROM users WHERE id IN ({})", placeholders);

        let mut q = sqlx::query_as::<_, (String, String, String)>(&query);
        for id in ids {
            q = q.bind(id);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, email)| OwnerInfo { id, name, email })
            .collect())
    }

    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        password_hash: Option<&str>,
        role: Option<Role>,
    ) -> StorageResult<Option<User>> {
        debug!("Updating user: {}", id);

        let mut query = String::from("UPDATE users SET updated_at = ?");
        if name.is_some() {
            query.push_str(", name = ?");
        }
        if password_hash.is_some() {
            query.push_str(", password_hash = ?");
        }
        if role.is_some() {
            query.push_str(", role = ?");
        }
        query.push_str(" WHERE id = ?");

        let mut q = sqlx::query(&query).bind(Utc::now());
        if let Some(name) = name {
            q = q.bind(name);
        }
        if let Some(password_hash) = password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = role {
            q = q.bind(role);
        }
        q.bind(id).execute(&self.pool).await.map_err(StorageError::Sqlx)?;

        self.get(id).await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
