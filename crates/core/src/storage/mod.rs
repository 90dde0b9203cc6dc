//! Persistence gateway for ledger snapshots.
//!
//! Snapshots are stored whole, as snapshot documents, under a sync id:
//! - Object storage through Apache OpenDAL: S3-compatible (Cloudflare R2,
//!   Supabase Storage, AWS S3), Azure Blob Storage, local filesystem, memory
//! - A PostgREST-style key-value table over HTTPS
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  PersistenceGateway                      │
//! │   load_state(sync_id)        save_state(sync_id, state)  │
//! ├─────────────────────────────┬────────────────────────────┤
//! │ ObjectStoreGateway          │ RestGateway                │
//! │ snapshots/{sync_id}.json    │ GET/POST /rest/v1/{table}  │
//! └─────────────────────────────┴────────────────────────────┘
//! ```

mod error;
mod gateway;
mod object_store;
mod rest;

pub use error::StorageError;
pub use gateway::{PersistenceGateway, check_sync_id, open_gateway};
pub use object_store::{ObjectStoreGateway, snapshot_key};
pub use rest::RestGateway;
