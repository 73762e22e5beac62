//! Session provider and transactional executor.
//!
//! Exactly one [`Database`] exists per process. It owns the connection pool,
//! hands out short-lived sessions, and wraps units of work in transactions.
//! It is constructed once at startup and read-only thereafter.

use crate::config::DbConfig;
use crate::error::AppError;
use crate::store;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool, Postgres};
use std::future::Future;
use std::pin::Pin;

/// A leased connection scoped to one unit of work. Returned to the pool on
/// drop, on every exit path.
pub type Session = PoolConnection<Postgres>;

/// Boxed future produced by a unit of work running on a session.
pub type ActionFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'c>>;

pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Establish connectivity and prepare the schema: create the database if
    /// it does not yet exist, connect the pool, and create all tables.
    /// Failure here is an unrecoverable startup error.
    pub async fn initialize(config: &DbConfig) -> Result<Self, AppError> {
        store::ensure_database_exists(config).await?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.url())
            .await?;
        store::ensure_tables(&pool).await?;
        tracing::info!(database = %config.name, "database initialised");
        Ok(Database { pool })
    }

    /// Lease a new session from the shared pool. Fails once the provider has
    /// been torn down.
    pub async fn open_session(&self) -> Result<Session, AppError> {
        if self.pool.is_closed() {
            return Err(AppError::Unavailable("connection pool is closed".into()));
        }
        Ok(self.pool.acquire().await?)
    }

    /// Run a unit of work on a fresh session. Exactly one session is opened
    /// and released per call, regardless of outcome.
    ///
    /// With `transactional`, the work runs inside a transaction committed
    /// only on normal return; on failure the transaction is rolled back and
    /// the error is re-raised unchanged. Without it, the work runs directly
    /// on the session (pure reads that need no durability boundary).
    pub async fn execute<T, F>(&self, transactional: bool, action: F) -> Result<T, AppError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> ActionFuture<'c, T>,
    {
        let mut session = self.open_session().await?;
        tracing::debug!(transactional, "begin database session");
        let result = if transactional {
            let mut tx = session.begin().await?;
            match action(&mut tx).await {
                Ok(out) => {
                    tx.commit().await?;
                    Ok(out)
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::error!(error = %rollback_err, "transaction rollback failed");
                    }
                    Err(e)
                }
            }
        } else {
            action(&mut session).await
        };
        tracing::debug!(ok = result.is_ok(), "completed database session");
        result
    }

    /// Tear the pool down. Sessions can no longer be opened afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
