use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store refused the operation (used by the in-memory store
    /// to simulate outages).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No session could be acquired before the deadline.
    #[error("Timed out waiting for a database session")]
    SessionTimeout,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
