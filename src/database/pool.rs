// Connection pool construction. Built once at startup, read-only after init.
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{AppError, ErrorKind};

/// Bounded deadline for the startup/health ping
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the process-wide pool from configuration. Connections are opened
/// lazily; callers that need proof of connectivity use [`ping`].
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let dsn = config
        .dsn
        .as_deref()
        .ok_or_else(|| AppError::invalid("database DSN is not configured"))?;

    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .idle_timeout(Duration::from_millis(config.conn_max_idle_ms))
        .max_lifetime(Duration::from_millis(config.conn_max_life_ms))
        .connect_lazy(dsn)
        .map_err(|e| AppError::wrap(ErrorKind::Invalid, "invalid database DSN", e))
}

/// Ping the store with a bounded deadline
pub async fn ping(pool: &PgPool) -> Result<(), AppError> {
    let query = sqlx::query("SELECT 1").execute(pool);
    tokio::time::timeout(PING_TIMEOUT, query)
        .await
        .map_err(|_| AppError::internal("database ping timed out"))??;
    Ok(())
}
