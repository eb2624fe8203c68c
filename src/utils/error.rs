//! Error types for the compressor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;

use serde::Serialize;
use thiserror::Error;

/// Validation errors raised before any engine interaction.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// Declared MIME type does not belong to the controller's media category
    #[error("Unsupported file type '{found}', expected {expected}/*")]
    WrongMediaType { expected: String, found: String },
    /// File exceeds the size limit for its media kind
    #[error("File is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    /// `start` called without a selected file
    #[error("No file selected")]
    NoFileSelected,
}

/// Errors raised by the media engine binding.
#[derive(Error, Debug, Clone, Serialize)]
pub enum EngineError {
    /// Engine could not be initialised
    #[error("Engine failed to load: {0}")]
    Load(String),
    /// Operation requires a loaded engine
    #[error("Engine is not loaded")]
    NotLoaded,
    /// Virtual filesystem operation failed
    #[error("Virtual filesystem error on '{name}': {message}")]
    Fs { name: String, message: String },
    /// The codec command line exited unsuccessfully
    #[error("Engine run failed: {0}")]
    Run(String),
    /// The run was aborted through its cancellation token or `exit`
    #[error("Engine run aborted")]
    Aborted,
}

/// Main error type for the compressor.
#[derive(Error, Debug, Clone, Serialize)]
pub enum CompressorError {
    /// Input validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Engine load or run failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// A task is already loading or running on this controller
    #[error("A compression is already running")]
    Busy,

    /// Operation does not apply to this media kind
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

/// Result type for engine binding operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl CompressorError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        Self::Unsupported(msg.into())
    }
}

impl EngineError {
    pub fn fs(name: impl Into<String>, err: impl ToString) -> Self {
        Self::Fs { name: name.into(), message: err.to_string() }
    }

    pub fn run<T: Into<String>>(msg: T) -> Self {
        Self::Run(msg.into())
    }
}

impl From<io::Error> for CompressorError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<serde_json::Error> for CompressorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
