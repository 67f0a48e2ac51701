//! Recorder database: connection pool with the `states` schema applied.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::RecorderError;

/// Open the recorder database at `database_url` (`sqlite:mapcard.db`,
/// `sqlite::memory:`), creating the file when missing and applying pending
/// migrations.
///
/// # Errors
///
/// Returns [`RecorderError`] if the URL is malformed, the connection fails or
/// a migration fails.
pub async fn connect(database_url: &str) -> Result<SqlitePool, RecorderError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!(database_url, "recorder database ready");
    Ok(pool)
}
