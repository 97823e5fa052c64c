//! Error types shared by the loaders, pipeline stages and exporters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vizkit operations.
pub type VizResult<T> = Result<T, VizError>;

/// Errors that terminate a visualization run.
///
/// There is no recovery path: every variant propagates to the caller and
/// ends the run.
#[derive(Debug, Error)]
pub enum VizError {
    /// Input path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input exists but cannot be read as geometry or a volume.
    #[error("unsupported format: {message}")]
    UnsupportedFormat {
        /// What was wrong with the input.
        message: String,
    },

    /// Reading or writing failed at the OS level.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required parameter is missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Which parameter was missing or invalid.
        message: String,
    },
}

impl VizError {
    /// Create an `UnsupportedFormat` error with the given message.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Create a `Configuration` error with the given message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Map an `std::io::Error` on `path`, turning `NotFound` into [`VizError::NotFound`].
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path: path.into() }
        } else {
            Self::Io(err)
        }
    }
}
