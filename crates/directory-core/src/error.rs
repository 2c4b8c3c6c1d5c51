//! Error types for directory operations

use thiserror::Error;

/// Result alias for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the directory store and its validation
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique field already holds this value
    #[error("{entity} already exists: {value}")]
    AlreadyExists { entity: &'static str, value: String },

    /// Lookup by key found nothing
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Request rejected before touching the database
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bad store configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid-input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Map a unique-constraint violation to [`Error::AlreadyExists`], pass anything else through
    pub(crate) fn from_insert(err: sqlx::Error, entity: &'static str, value: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::AlreadyExists { entity, value: value.to_string() };
            }
        }
        Self::Database(err)
    }
}
