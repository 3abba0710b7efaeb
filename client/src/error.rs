//! Unified error handling for the client.

use cubelog_engine::CubeId;
use std::time::Duration;

/// Entity store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cannot encode or decode cube {id}: {source}")]
    Codec {
        id: CubeId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cube not found: {0}")]
    NotFound(CubeId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A batch write failed; `unapplied` names every cube that did not land.
    #[error("Batch write failed for {} cube(s): {source}", .unapplied.len())]
    Batch {
        unapplied: Vec<CubeId>,
        #[source]
        source: Box<StoreError>,
    },
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Backup retrieval errors. The restore pipeline degrades on these.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backup server returned status {0}")]
    Status(u16),

    #[error("Cannot read backup file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a restore before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Failed to read local store: {0}")]
    StoreRead(#[source] StoreError),

    #[error("Backup fetch timed out after {0:?}")]
    FetchTimeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_names_count() {
        let err = StoreError::Batch {
            unapplied: vec!["c1".into(), "c2".into()],
            source: Box::new(StoreError::Unavailable("closed".into())),
        };
        assert_eq!(
            err.to_string(),
            "Batch write failed for 2 cube(s): Store unavailable: closed"
        );
    }

    #[test]
    fn restore_error_display() {
        let err = RestoreError::FetchTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Backup fetch timed out after 30s");

        let err = RestoreError::StoreRead(StoreError::NotFound("c1".into()));
        assert_eq!(
            err.to_string(),
            "Failed to read local store: Cube not found: c1"
        );
    }
}
