//! Error types shared across Reelkit crates.

use std::path::PathBuf;

/// Top-level error type for Reelkit operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelkitError {
    #[error("Timeline error: {message}")]
    Timeline { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ReelkitError.
pub type ReelkitResult<T> = Result<T, ReelkitError>;

impl ReelkitError {
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
