//! Debounced sync of snapshots to the persistence gateway.
//!
//! Every new snapshot restarts a quiet period; only the latest snapshot is
//! written once the period elapses. The local snapshot stays authoritative
//! when a write fails.

mod scheduler;

pub use scheduler::{SyncHandle, SyncScheduler, SyncStatus};
