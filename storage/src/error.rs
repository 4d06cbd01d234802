//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use promobot_core::BotError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<StorageError> for BotError {
    fn from(err: StorageError) -> Self {
        BotError::Storage(err.to_string())
    }
}
