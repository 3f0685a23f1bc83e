//! Error types for mbx-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the mbx-player crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Duration registry errors (validation or persistence)
    #[error("Duration registry error: {0}")]
    Durations(String),

    /// Unit collection store errors
    #[error("Unit store error: {0}")]
    Store(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from mbx-common
    #[error(transparent)]
    Common(#[from] mbx_common::Error),

    /// Invalid command or event input
    #[error("Bad request: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience Result type using mbx-player Error
pub type Result<T> = std::result::Result<T, Error>;
