//! Common error types for HDI

use thiserror::Error;

/// Common result type for HDI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the HDI crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error while reading a source feed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input data or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
