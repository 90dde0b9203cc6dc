//! Report error types.

use sitebook_shared::types::{MaterialId, ProjectId};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Project not found.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Material not found.
    #[error("Material not found: {0}")]
    MaterialNotFound(MaterialId),
}
