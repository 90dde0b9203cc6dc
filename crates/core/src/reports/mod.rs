//! Aggregate reports over a ledger snapshot.
//!
//! Pure read-side projections:
//! - Project summary (spend against budget, invoicing, collection)
//! - Stock summary per material
//! - Dashboard totals

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
