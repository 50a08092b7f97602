//! Common error types for the recipe catalog

use thiserror::Error;

/// Common result type for recipe catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the storage core
///
/// "Recipe not found" is not an error here: lookups return `Option` and the
/// HTTP layer decides what absence means.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (field length, range, or null where a value is required)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Concurrent writers could not converge on a single row
    #[error("Conflict: {0}")]
    Conflict(String),
}
