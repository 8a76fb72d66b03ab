//! Error types for the backend module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error reported by the Redis client or server.
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The call did not finish within the request timeout.
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("backend lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking task could not be joined.
    #[error("blocking task failed: {0}")]
    Task(String),

    /// Unexpected reply shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
