//! Settlement calculation.
//!
//! Read-only projections of what has been paid against a purchase batch,
//! collected against an invoice, and what is still owed to a vendor.

pub mod calculator;

#[cfg(test)]
mod calculator_props;

pub use calculator::{
    BatchSettlement, InvoiceSettlement, InvoiceState, SettlementCalculator, VendorSettlement,
};
