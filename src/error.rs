//! Error types for the pose stabilization library.
//!
//! The per-frame pipeline never fails; these errors only surface from the
//! outer edges of the crate (configuration, replay files, numeric casts).

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Replay recording could not be used
    #[error("Replay error: {0}")]
    ReplayError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
