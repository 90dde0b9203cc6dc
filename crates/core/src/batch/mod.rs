//! Batch tracking over material stock history.
//!
//! A batch is an inward (purchase or transfer) stock entry treated as a
//! depletable pool, identified by its own entry id. Outward entries draw a
//! batch down through their `parent_purchase_id`.

pub mod tracker;

#[cfg(test)]
mod tracker_props;

pub use tracker::{Batch, BatchQuery, BatchTracker};
