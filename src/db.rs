//! Store connection setup.
//!
//! The pool is created once per process and handed to whoever needs it; there
//! is no process-wide handle. SQLite runs in WAL mode so readers never block
//! the single writer, and the busy timeout makes conflicting writers queue up
//! instead of failing with `SQLITE_BUSY`.
//!
//! Inspection tools open the store with [`connect_read_only`], which neither
//! creates a missing file nor changes the journal mode.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = base_options(config)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    open(config, options, "connected to coin store").await
}

/// Opens an existing store for reading only.
pub async fn connect_read_only(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = base_options(config)?.read_only(true);

    open(config, options, "opened coin store read-only").await
}

fn base_options(config: &AppConfig) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(&config.database_url)?.busy_timeout(config.db_busy_timeout))
}

async fn open(
    config: &AppConfig,
    options: SqliteConnectOptions,
    message: &'static str,
) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    info!(
        url = %config.database_url,
        max_connections = config.db_max_connections,
        "{message}"
    );

    Ok(pool)
}
