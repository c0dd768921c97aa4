//! Error types for Autocoder
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Autocoder
#[derive(Debug, Error)]
pub enum AutocoderError {
    /// Model response did not contain the code sentinels
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Model backend call failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// The shim could not spawn or manage the child process
    #[error("Execution error: {0}")]
    Execution(String),

    /// An iteration's artifact could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid or incomplete run configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl AutocoderError {
    /// Persistence failures abort a run; everything else is recovered locally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AutocoderError::Persistence(_))
    }
}

/// Result type alias for Autocoder operations
pub type Result<T> = std::result::Result<T, AutocoderError>;
