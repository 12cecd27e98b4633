//! Database connection and schema management for the waiting-room API.
//!
//! The pool is opened lazily: connections are acquired per statement and
//! returned to the pool when the statement future completes or is dropped, so
//! every exit path of a handler releases what it acquired. An unreachable
//! database therefore never prevents the server from starting.

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AppConfig;

/// Attempts made by [`initialize_schema`] before giving up.
const SCHEMA_INIT_MAX_ATTEMPTS: u32 = 5;

/// Delay before the first schema retry; doubles on every attempt.
const SCHEMA_INIT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: DbErr,
    },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Outcome of the startup schema initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// The providers table exists (created now or earlier).
    Ready,
    /// Every attempt failed; requests may fail until the schema exists.
    Unavailable,
}

/// Builds the connection pool described by the configuration.
///
/// # Examples
///
/// ```no_run
/// use waiting_room::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = AppConfig::default();
///     let db = init_pool(&config).await?;
///     // Use the database connection...
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let url = cfg
        .database
        .connection_url()
        .map_err(|e| DatabaseError::InvalidConfiguration {
            message: e.to_string(),
        })?;

    if url.is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "Database URL cannot be empty".to_string(),
        }
        .into());
    }

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(cfg.database.max_connections)
        .acquire_timeout(Duration::from_millis(cfg.database.acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600)) // 10 minutes
        .max_lifetime(Duration::from_secs(1800)) // 30 minutes
        .connect_lazy(true)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let conn = Database::connect(opt)
        .await
        .map_err(|source| DatabaseError::ConnectionFailed { source })?;

    tracing::info!(
        host = %cfg.database.host,
        port = cfg.database.port,
        database = %cfg.database.name,
        "Database pool configured"
    );

    Ok(conn)
}

/// Ensures the providers table exists, retrying transient failures with
/// exponential backoff.
///
/// Failure is logged and reported as [`SchemaStatus::Unavailable`]; it never
/// aborts startup.
pub async fn initialize_schema(db: &DatabaseConnection) -> SchemaStatus {
    let mut retry_delay = SCHEMA_INIT_INITIAL_DELAY;

    for attempt in 1..=SCHEMA_INIT_MAX_ATTEMPTS {
        match Migrator::up(db, None).await {
            Ok(()) => {
                tracing::info!(attempt, "Database schema initialized");
                return SchemaStatus::Ready;
            }
            Err(e) if attempt == SCHEMA_INIT_MAX_ATTEMPTS => {
                tracing::error!(
                    attempts = SCHEMA_INIT_MAX_ATTEMPTS,
                    error = %e,
                    "Database initialization failed; continuing without a verified schema"
                );
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    error = %e,
                    retry_in = ?retry_delay,
                    "Database initialization attempt failed"
                );
                sleep(retry_delay).await;
                retry_delay *= 2;
            }
        }
    }

    SchemaStatus::Unavailable
}

/// Health check for the database connection.
///
/// Verifies that a connection can be acquired and the server answers.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    db.ping().await.context("Database health check failed")?;

    Ok(())
}
