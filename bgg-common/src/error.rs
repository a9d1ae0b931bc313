//! Common error types for the BGG data fetcher

use thiserror::Error;

/// Common result type for fetcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the fetcher crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested file or entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Candidate data dump could not be read
    #[error("Data dump error: {0}")]
    DataDump(String),
}
