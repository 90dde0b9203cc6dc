//! Snapshot document: the export file format and the sync payload.
//!
//! The document is the camelCase JSON form of
//! [`LedgerState`](crate::store::LedgerState) with two header
//! fields added at the top level, `formatVersion` and `exportedAt`.

mod codec;
mod error;

pub use codec::{
    FORMAT_VERSION, decode, decode_value, encode, encode_value, export, import,
};
pub use error::DocumentError;
