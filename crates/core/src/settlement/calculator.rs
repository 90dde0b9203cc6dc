//! Settlement projections for batches, invoices, and vendors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sitebook_shared::types::money::{floor_zero, is_below_zero, is_settled};
use sitebook_shared::types::{BatchId, IncomeId, InvoiceId, PaymentId, VendorId};
use tracing::error;

use crate::batch::{Batch, BatchTracker};
use crate::store::{Income, Invoice, LedgerState, Payment};

/// How much of a purchase batch's bill has been paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSettlement {
    /// The batch.
    pub batch_id: BatchId,
    /// Quantity × unit price.
    pub bill_value: Decimal,
    /// Sum of payments linked to the batch.
    pub total_paid: Decimal,
    /// Bill value left to pay, never below zero.
    pub remaining: Decimal,
    /// Remaining is within the epsilon.
    pub is_fully_paid: bool,
    /// Payments exceed the bill beyond the epsilon.
    pub overpaid: bool,
}

/// Derived settlement state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    /// Nothing collected yet.
    Unpaid,
    /// Some, not all, collected.
    PartiallyPaid,
    /// Fully collected.
    Paid,
    /// Not fully collected and past its due date.
    Overdue,
}

/// How much of an invoice has been collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSettlement {
    /// The invoice.
    pub invoice_id: InvoiceId,
    /// Billed amount.
    pub amount: Decimal,
    /// Sum of incomes linked to the invoice.
    pub collected: Decimal,
    /// Receivable left, never below zero.
    pub remaining: Decimal,
    /// Remaining is within the epsilon.
    pub is_paid: bool,
    /// Collections exceed the invoice beyond the epsilon.
    pub overcollected: bool,
    /// Due date copied from the invoice.
    pub due_date: Option<NaiveDate>,
}

impl InvoiceSettlement {
    /// Settlement state as of `today`.
    #[must_use]
    pub fn state_on(&self, today: NaiveDate) -> InvoiceState {
        if self.is_paid {
            InvoiceState::Paid
        } else if self.due_date.is_some_and(|due| today > due) {
            InvoiceState::Overdue
        } else if self.collected > Decimal::ZERO {
            InvoiceState::PartiallyPaid
        } else {
            InvoiceState::Unpaid
        }
    }
}

/// What the firm owes a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorSettlement {
    /// The vendor.
    pub vendor_id: VendorId,
    /// Payable carried in when the vendor was added.
    pub opening_balance: Decimal,
    /// Sum of purchase expenses booked to the vendor.
    pub purchased: Decimal,
    /// Sum of payments to the vendor.
    pub paid: Decimal,
    /// Outstanding payable, never below zero.
    pub balance: Decimal,
    /// Payments exceed purchases beyond the epsilon.
    pub overpaid: bool,
}

/// Stateless settlement projections.
///
/// Every figure is recomputed from the snapshot on each call; nothing is
/// cached or maintained incrementally. `excluding` leaves out the record
/// being edited so its old amount becomes headroom.
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Settlement of a batch against `payments`.
    #[must_use]
    pub fn batch(
        batch: &Batch,
        payments: &[Payment],
        excluding: Option<PaymentId>,
    ) -> BatchSettlement {
        let bill_value = batch.bill_value();
        let total_paid: Decimal = payments
            .iter()
            .filter(|p| p.material_batch_id == Some(batch.batch_id) && Some(p.id) != excluding)
            .map(|p| p.amount)
            .sum();

        let raw = bill_value - total_paid;
        let overpaid = is_below_zero(raw);
        if overpaid {
            error!(
                batch_id = %batch.batch_id,
                bill_value = %bill_value,
                total_paid = %total_paid,
                "batch payments exceed bill value"
            );
        }
        let remaining = floor_zero(raw);

        BatchSettlement {
            batch_id: batch.batch_id,
            bill_value,
            total_paid,
            remaining,
            is_fully_paid: is_settled(remaining),
            overpaid,
        }
    }

    /// Settlement of a batch found anywhere in the snapshot.
    #[must_use]
    pub fn batch_in(
        state: &LedgerState,
        batch_id: BatchId,
        excluding: Option<PaymentId>,
    ) -> Option<BatchSettlement> {
        let (material, _) = state.stock_entry(batch_id)?;
        let batch = BatchTracker::find(material, batch_id)?;
        Some(Self::batch(&batch, &state.payments, excluding))
    }

    /// Settlement of an invoice against `incomes`.
    #[must_use]
    pub fn invoice(
        invoice: &Invoice,
        incomes: &[Income],
        excluding: Option<IncomeId>,
    ) -> InvoiceSettlement {
        let collected: Decimal = incomes
            .iter()
            .filter(|i| i.invoice_id == Some(invoice.id) && Some(i.id) != excluding)
            .map(|i| i.amount)
            .sum();

        let raw = invoice.amount - collected;
        let overcollected = is_below_zero(raw);
        if overcollected {
            error!(
                invoice_id = %invoice.id,
                amount = %invoice.amount,
                collected = %collected,
                "invoice collections exceed invoice amount"
            );
        }
        let remaining = floor_zero(raw);

        InvoiceSettlement {
            invoice_id: invoice.id,
            amount: invoice.amount,
            collected,
            remaining,
            is_paid: is_settled(remaining),
            overcollected,
            due_date: invoice.due_date,
        }
    }

    /// Payable owed to a vendor.
    ///
    /// `opening balance + purchases - payments`, floored at zero.
    #[must_use]
    pub fn vendor(
        state: &LedgerState,
        vendor_id: VendorId,
        excluding: Option<PaymentId>,
    ) -> VendorSettlement {
        let opening_balance = state
            .vendor(vendor_id)
            .map_or(Decimal::ZERO, |v| v.opening_balance);
        let purchased: Decimal = state
            .expenses
            .iter()
            .filter(|e| e.accrues_to(vendor_id))
            .map(|e| e.amount)
            .sum();
        let paid: Decimal = state
            .payments
            .iter()
            .filter(|p| p.vendor_id == vendor_id && Some(p.id) != excluding)
            .map(|p| p.amount)
            .sum();

        let raw = opening_balance + purchased - paid;
        let overpaid = is_below_zero(raw);
        if overpaid {
            error!(
                vendor_id = %vendor_id,
                purchased = %purchased,
                paid = %paid,
                "vendor payments exceed purchases"
            );
        }

        VendorSettlement {
            vendor_id,
            opening_balance,
            purchased,
            paid,
            balance: floor_zero(raw),
            overpaid,
        }
    }

    /// Payables of every vendor, in store order.
    #[must_use]
    pub fn vendors(state: &LedgerState) -> Vec<VendorSettlement> {
        state
            .vendors
            .iter()
            .map(|v| Self::vendor(state, v.id, None))
            .collect()
    }

    /// Settlements of every invoice, in store order.
    #[must_use]
    pub fn invoices(state: &LedgerState) -> Vec<InvoiceSettlement> {
        state
            .invoices
            .iter()
            .map(|i| Self::invoice(i, &state.incomes, None))
            .collect()
    }
}
