//! Ledger error types for validation and state errors.
//!
//! Every error except `DataIntegrity` is raised before a new snapshot is
//! built, so the caller's state is untouched and the user can correct the
//! input and retry.

use rust_decimal::Decimal;
use sitebook_shared::AppError;
use sitebook_shared::types::StockEntryId;
use thiserror::Error;

/// What an overpayment was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementTarget {
    /// Remaining bill value of a purchase batch.
    Batch,
    /// Outstanding vendor balance.
    Vendor,
    /// Remaining receivable on an invoice.
    Invoice,
}

impl std::fmt::Display for SettlementTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Vendor => write!(f, "vendor balance"),
            Self::Invoice => write!(f, "invoice"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Malformed or out-of-range input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A command referenced an entity that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The missing id.
        id: String,
    },

    // ========== Stock Errors ==========
    /// A usage or transfer asked for more than a batch holds.
    #[error("Insufficient stock in batch {batch_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The batch drawn from.
        batch_id: StockEntryId,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity still available.
        available: Decimal,
    },

    // ========== Settlement Errors ==========
    /// A payment or collection exceeds its headroom.
    #[error("Amount {requested} exceeds remaining {target} of {headroom}")]
    Overpayment {
        /// What the amount was checked against.
        target: SettlementTarget,
        /// Amount requested.
        requested: Decimal,
        /// Headroom left before the request.
        headroom: Decimal,
    },

    // ========== Integrity Errors ==========
    /// Stored data violates a ledger invariant.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
}

impl LedgerError {
    /// Shorthand for a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::DataIntegrity(_) => "DATA_INTEGRITY",
        }
    }

    /// Returns true if the user can fix the input and retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DataIntegrity(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_) => Self::Validation(message),
            LedgerError::NotFound { .. } => Self::NotFound(message),
            LedgerError::InsufficientStock { .. } | LedgerError::Overpayment { .. } => {
                Self::BusinessRule(message)
            }
            LedgerError::DataIntegrity(_) => Self::Integrity(message),
        }
    }
}
