// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and per-entity storages

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use crate::storage::{
    EvidenceStorage, PlanningStorage, ProgressStorage, SessionStorage, StorageError, UserStorage,
};

/// Shared database state, explicitly constructed and passed into the
/// workflows and API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub users: Arc<UserStorage>,
    pub plannings: Arc<PlanningStorage>,
    pub evidences: Arc<EvidenceStorage>,
    pub progress: Arc<ProgressStorage>,
    pub sessions: Arc<SessionStorage>,
}

impl DbState {
    /// Create new database state from a SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(UserStorage::new(pool.clone())),
            plannings: Arc::new(PlanningStorage::new(pool.clone())),
            evidences: Arc::new(EvidenceStorage::new(pool.clone())),
            progress: Arc::new(ProgressStorage::new(pool.clone())),
            sessions: Arc::new(SessionStorage::new(pool.clone())),
            pool,
        }
    }

    /// Initialize database state with optional custom database path
    pub async fn init_with_path(
        database_path: Option<std::path::PathBuf>,
    ) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(planea_core::database_path);

        // Ensure parent directory exists
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());

        debug!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        info!("Database connection established");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StorageError::Migration)?;

        debug!("Database migrations completed");

        Ok(Self::new(pool))
    }

    /// In-memory database for tests and demos.
    /// A single connection keeps every query on the same memory database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StorageError::Migration)?;

        Ok(Self::new(pool))
    }
}
