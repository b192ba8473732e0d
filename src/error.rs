//! Error taxonomy surfaced by the user store

use thiserror::Error;

/// Errors returned by every store operation.
///
/// All variants are terminal for the attempted operation. Nothing is retried
/// internally; callers decide how to recover.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required input was empty
    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    /// The avatar identifier is not part of the avatar set
    #[error("unknown avatar: {0}")]
    InvalidAvatar(String),

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// No record matches the given username
    #[error("user not found: {0}")]
    NotFound(String),

    /// A write was acknowledged but re-reading the row returned something else
    #[error("write not persisted: expected {expected}, found {actual}")]
    PersistenceVerification { expected: String, actual: String },

    /// The database was written by a newer schema than this build knows
    #[error("unsupported schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: i64, supported: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage actor has shut down
    #[error("store is not running")]
    Unavailable,
}

impl StoreError {
    /// True for errors caused by the caller's input rather than the storage layer
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::Validation { .. }
                | StoreError::InvalidAvatar(_)
                | StoreError::DuplicateUsername(_)
                | StoreError::DuplicateEmail(_)
                | StoreError::NotFound(_)
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
