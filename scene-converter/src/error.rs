//! Error handling for conversion sessions

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a [`ConverterSession`](crate::ConverterSession)
#[derive(Error, Debug)]
pub enum Error {
    /// The session was disposed and refuses further operations
    #[error("Converter session has been disposed")]
    Disposed,

    /// The source file does not exist or is not a regular file
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The source is unusable (empty format hint, unreadable stream, bad path)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The engine produced no scene, or the scene is incomplete
    #[error("Import failed: {message}")]
    ImportFailed { message: String },

    /// The engine failed while writing the scene
    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    /// One or more configuration options could not be materialized
    #[error("Invalid property: {message}")]
    InvalidProperty { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    IoError { message: String },
}

impl Error {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new import error
    pub fn import_failed<S: Into<String>>(message: S) -> Self {
        Self::ImportFailed {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export_failed<S: Into<String>>(message: S) -> Self {
        Self::ExportFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid property error
    pub fn invalid_property<S: Into<String>>(message: S) -> Self {
        Self::InvalidProperty {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// True for errors raised by source validation, before any engine call
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::InvalidInput { .. })
    }
}

/// Diagnostic returned by a failing [`SceneEngine`](crate::engine::SceneEngine) call.
///
/// Carries the engine's own error text (Assimp's `aiGetErrorString`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFailure {
    /// Engine diagnostic text
    pub message: String,
}

impl EngineFailure {
    /// Create a failure from the engine's diagnostic text
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
