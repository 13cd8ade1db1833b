//! Error types shared across difftrail crates.

use std::path::PathBuf;

/// Top-level error type for difftrail operations.
#[derive(Debug, thiserror::Error)]
pub enum DifftrailError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Ingest error: {message}")]
    Ingest { message: String },

    #[error("Blend error: {message}")]
    Blend { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DifftrailError.
pub type DifftrailResult<T> = Result<T, DifftrailError>;

impl DifftrailError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest {
            message: msg.into(),
        }
    }

    pub fn blend(msg: impl Into<String>) -> Self {
        Self::Blend {
            message: msg.into(),
        }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
