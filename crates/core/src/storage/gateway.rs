//! The persistence gateway seam.

use std::sync::Arc;

use async_trait::async_trait;
use sitebook_shared::StorageProvider;

use super::error::StorageError;
use super::object_store::ObjectStoreGateway;
use super::rest::RestGateway;
use crate::store::LedgerState;

/// Durable home of full ledger snapshots, keyed by sync id.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Loads the snapshot stored under `sync_id`; `None` if there is none.
    async fn load_state(&self, sync_id: &str) -> Result<Option<LedgerState>, StorageError>;

    /// Stores `state` under `sync_id`, replacing what was there.
    async fn save_state(&self, sync_id: &str, state: &LedgerState) -> Result<(), StorageError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Builds the gateway for a configured provider.
///
/// # Errors
///
/// Returns `StorageError::Configuration` if the provider cannot be set up.
pub fn open_gateway(provider: &StorageProvider) -> Result<Arc<dyn PersistenceGateway>, StorageError> {
    match provider {
        StorageProvider::Rest {
            url,
            api_key,
            table,
        } => Ok(Arc::new(RestGateway::new(url, api_key, table)?)),
        other => Ok(Arc::new(ObjectStoreGateway::from_provider(other)?)),
    }
}

/// Validates a sync id for use as a key or row id.
///
/// Only ASCII alphanumerics, dots, hyphens, and underscores are allowed.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` for anything else.
pub fn check_sync_id(sync_id: &str) -> Result<&str, StorageError> {
    let valid = !sync_id.is_empty()
        && !sync_id.starts_with('.')
        && sync_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if valid {
        Ok(sync_id)
    } else {
        Err(StorageError::InvalidKey(sync_id.to_string()))
    }
}
