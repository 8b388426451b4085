use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

use super::contacts::ContactRepository;
use super::deals::DealRepository;
use super::users::UserRepository;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Unexpected value in column {column}: {value}")]
    InvalidColumn { column: &'static str, value: String },

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the connection pool. Opened once at startup and passed to
/// whoever needs it; cloning shares the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a bounded pool. Requests beyond `max_connections` wait for a free
    /// connection up to the acquire timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Opened database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Build the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect_lazy(&config.url)?;
        Ok(Self { pool })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the flat schema in `migrations/`
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    pub fn contacts(&self) -> ContactRepository<'_> {
        ContactRepository::new(&self.pool)
    }

    pub fn deals(&self) -> DealRepository<'_> {
        DealRepository::new(&self.pool)
    }
}

/// Postgres unique_violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
