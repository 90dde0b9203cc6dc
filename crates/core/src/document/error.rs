//! Document error types.

use sitebook_shared::AppError;
use thiserror::Error;

/// Errors reading a snapshot document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Not parseable as JSON.
    #[error("document is not valid JSON: {0}")]
    Malformed(String),

    /// Top level is not an object.
    #[error("document must be a JSON object")]
    NotAnObject,

    /// A required collection is absent or not an array.
    #[error("document has no `{0}` array")]
    MissingCollection(&'static str),

    /// Written by a newer format.
    #[error("document format version {found} is newer than supported {supported}")]
    UnsupportedVersion {
        /// Version in the document.
        found: u64,
        /// Highest version understood.
        supported: u64,
    },

    /// JSON is well formed but a record does not fit the schema.
    #[error("document does not match the ledger schema: {0}")]
    Schema(String),
}

impl DocumentError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) | Self::NotAnObject => "MALFORMED_DOCUMENT",
            Self::MissingCollection(_) | Self::Schema(_) => "INVALID_DOCUMENT",
            Self::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        Self::Validation(err.to_string())
    }
}
