//! Ledger engine for Sitebook.
//!
//! Bookkeeping for a construction firm: projects and godowns, vendors,
//! materials tracked in batches, expenses, payments, invoices and incomes.
//! Every mutation goes through [`ledger::LedgerEngine`], which validates a
//! command against the current snapshot and returns the next one.
//!
//! # Modules
//!
//! - `store` - Entity collections and the snapshot type
//! - `batch` - Batch derivation over material stock history
//! - `settlement` - Batch, invoice and vendor settlement figures
//! - `ledger` - Commands, the mutation engine and integrity audit
//! - `reports` - Project, stock and dashboard summaries
//! - `document` - Snapshot import and export
//! - `storage` - Persistence gateways (object storage, REST table)
//! - `sync` - Debounced background sync

pub mod batch;
pub mod document;
pub mod ledger;
pub mod reports;
pub mod settlement;
pub mod storage;
pub mod store;
pub mod sync;
