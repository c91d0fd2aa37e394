use thiserror::Error;

/// Errors that can occur within the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A JSON column failed to encode or decode.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No row exists for the given id where one was required.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
