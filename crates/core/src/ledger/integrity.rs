//! Strict audit of a snapshot.
//!
//! The read path clamps bad values for display; the audit lists every place
//! where it had to.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use sitebook_shared::types::{
    BatchId, InvoiceId, MaterialId, PaymentId, StockEntryId, VendorId,
};

use super::error::LedgerError;
use crate::batch::{BatchQuery, BatchTracker};
use crate::settlement::SettlementCalculator;
use crate::store::{LedgerState, StockHistoryEntry};

/// One invariant violation found in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// More drawn from a batch than it received.
    OverdrawnBatch {
        /// Material.
        material_id: MaterialId,
        /// The batch.
        batch_id: BatchId,
        /// Quantity drawn beyond the original.
        deficit: Decimal,
    },
    /// Deduction pointing at a batch that does not exist.
    OrphanDeduction {
        /// Material.
        material_id: MaterialId,
        /// The deduction.
        entry_id: StockEntryId,
        /// Missing batch.
        parent_id: StockEntryId,
    },
    /// Payments linked to a batch exceed its bill.
    OverpaidBatch {
        /// The batch.
        batch_id: BatchId,
        /// Paid beyond the bill value.
        excess: Decimal,
    },
    /// Payment linked to a batch that does not exist.
    UnknownPaymentBatch {
        /// The payment.
        payment_id: PaymentId,
        /// Missing batch.
        batch_id: BatchId,
    },
    /// Incomes linked to an invoice exceed its amount.
    OvercollectedInvoice {
        /// The invoice.
        invoice_id: InvoiceId,
        /// Collected beyond the amount.
        excess: Decimal,
    },
    /// Payments to a vendor exceed what was owed.
    NegativeVendorBalance {
        /// The vendor.
        vendor_id: VendorId,
        /// Paid beyond the payable.
        excess: Decimal,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverdrawnBatch {
                batch_id, deficit, ..
            } => write!(f, "batch {batch_id} overdrawn by {deficit}"),
            Self::OrphanDeduction {
                entry_id,
                parent_id,
                ..
            } => write!(f, "entry {entry_id} draws from unknown batch {parent_id}"),
            Self::OverpaidBatch { batch_id, excess } => {
                write!(f, "batch {batch_id} overpaid by {excess}")
            }
            Self::UnknownPaymentBatch {
                payment_id,
                batch_id,
            } => write!(f, "payment {payment_id} settles unknown batch {batch_id}"),
            Self::OvercollectedInvoice { invoice_id, excess } => {
                write!(f, "invoice {invoice_id} overcollected by {excess}")
            }
            Self::NegativeVendorBalance { vendor_id, excess } => {
                write!(f, "vendor {vendor_id} overpaid by {excess}")
            }
        }
    }
}

impl From<&IntegrityIssue> for LedgerError {
    fn from(issue: &IntegrityIssue) -> Self {
        Self::DataIntegrity(issue.to_string())
    }
}

/// Lists every invariant violation in `state`.
#[must_use]
pub fn audit(state: &LedgerState) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    for material in &state.materials {
        for batch in BatchTracker::inward_batches(material, BatchQuery::all()) {
            if batch.deficit > Decimal::ZERO {
                issues.push(IntegrityIssue::OverdrawnBatch {
                    material_id: material.id,
                    batch_id: batch.batch_id,
                    deficit: batch.deficit,
                });
            }
            let settlement = SettlementCalculator::batch(&batch, &state.payments, None);
            if settlement.overpaid {
                issues.push(IntegrityIssue::OverpaidBatch {
                    batch_id: batch.batch_id,
                    excess: settlement.total_paid - settlement.bill_value,
                });
            }
        }

        for entry in material.history.iter().filter(|e| e.is_outward()) {
            if let Some(parent_id) = entry.parent_purchase_id {
                if !material.entry(parent_id).is_some_and(StockHistoryEntry::is_inward) {
                    issues.push(IntegrityIssue::OrphanDeduction {
                        material_id: material.id,
                        entry_id: entry.id,
                        parent_id,
                    });
                }
            }
        }
    }

    for payment in &state.payments {
        if let Some(batch_id) = payment.material_batch_id {
            if state.stock_entry(batch_id).is_none() {
                issues.push(IntegrityIssue::UnknownPaymentBatch {
                    payment_id: payment.id,
                    batch_id,
                });
            }
        }
    }

    for settlement in SettlementCalculator::invoices(state) {
        if settlement.overcollected {
            issues.push(IntegrityIssue::OvercollectedInvoice {
                invoice_id: settlement.invoice_id,
                excess: settlement.collected - settlement.amount,
            });
        }
    }

    for settlement in SettlementCalculator::vendors(state) {
        if settlement.overpaid {
            issues.push(IntegrityIssue::NegativeVendorBalance {
                vendor_id: settlement.vendor_id,
                excess: settlement.paid - settlement.opening_balance - settlement.purchased,
            });
        }
    }

    issues
}

/// Strict form of [`audit`].
///
/// # Errors
///
/// Returns the first issue as `LedgerError::DataIntegrity`.
pub fn verify(state: &LedgerState) -> Result<(), LedgerError> {
    match audit(state).first() {
        Some(issue) => Err(issue.into()),
        None => Ok(()),
    }
}
