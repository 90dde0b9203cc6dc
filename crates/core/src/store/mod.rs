//! Entity store: the normalized collections that make up a ledger snapshot.
//!
//! References between entities are plain typed ids. They are never enforced
//! as foreign keys; a missing target resolves to a fallback label through
//! the lookups on [`LedgerState`].

pub mod entities;
pub mod state;

pub use entities::{
    Expense, Income, InventoryAction, Invoice, Material, Payment, Project, StockHistoryEntry,
    StockMovement, Vendor,
};
pub use state::{ConfigList, ConfigLists, GENERAL_LABEL, LedgerState, UNKNOWN_LABEL, UserProfile};
