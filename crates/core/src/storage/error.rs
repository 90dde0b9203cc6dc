//! Storage error types.

use sitebook_shared::AppError;
use thiserror::Error;

use crate::document::DocumentError;

/// Persistence gateway errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Invalid sync id for use as a storage key.
    #[error("invalid sync id: {0:?}")]
    InvalidKey(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Remote endpoint could not be reached.
    #[error("remote unreachable: {0}")]
    Transport(String),

    /// Remote endpoint answered with an error status.
    #[error("remote rejected request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Stored payload is not a valid snapshot document.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "STORAGE_CONFIG",
            Self::InvalidKey(_) => "INVALID_SYNC_ID",
            Self::Operation(_) => "STORAGE_OPERATION",
            Self::Transport(_) => "REMOTE_UNREACHABLE",
            Self::Rejected { .. } => "REMOTE_REJECTED",
            Self::Document(e) => e.error_code(),
        }
    }

    /// Returns true if the same request may succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Operation(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Configuration(_) | Self::InvalidKey(_) | Self::Document(_) => false,
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Configuration(_) | StorageError::InvalidKey(_) => {
                Self::Config(err.to_string())
            }
            StorageError::Document(doc) => doc.into(),
            _ => Self::Storage(err.to_string()),
        }
    }
}
