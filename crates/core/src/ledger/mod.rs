//! Mutation engine.
//!
//! This module implements the only path by which a snapshot changes:
//! - Commands and their inputs
//! - The reducer validating and applying them
//! - The store publishing each accepted snapshot
//! - A strict integrity audit
//! - Error types for ledger operations

pub mod command;
pub mod engine;
pub mod error;
pub mod integrity;
pub mod store;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod engine_tests;
#[cfg(test)]
pub(crate) mod fixtures;

pub use command::{
    Command, ConfigChange, EntityRef, ExpenseInput, IncomeInput, InvoiceInput, MaterialInput,
    PaymentInput, ProjectInput, PurchaseInput, TransferInput, UsageInput, VendorInput,
};
pub use engine::{LedgerEngine, MATERIAL_CATEGORY, Transition};
pub use error::{LedgerError, SettlementTarget};
pub use integrity::{IntegrityIssue, audit, verify};
pub use store::LedgerStore;
