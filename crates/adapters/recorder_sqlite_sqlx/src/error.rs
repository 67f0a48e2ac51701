//! Recorder-specific error type wrapping sqlx errors.

use mapcard_domain::error::MapCardError;

/// Errors originating from the `SQLite` recorder.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize an attribute bag.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<RecorderError> for MapCardError {
    fn from(err: RecorderError) -> Self {
        Self::History(Box::new(err))
    }
}
