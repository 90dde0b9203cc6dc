//! Snapshot persistence on object storage using Apache OpenDAL.

use async_trait::async_trait;
use opendal::{Builder, ErrorKind, Operator, services};
use sitebook_shared::StorageProvider;
use tracing::debug;

use super::error::StorageError;
use super::gateway::{PersistenceGateway, check_sync_id};
use crate::document;
use crate::store::LedgerState;

/// Stores each snapshot as `snapshots/{sync_id}.json`.
pub struct ObjectStoreGateway {
    operator: Operator,
    provider: &'static str,
}

impl ObjectStoreGateway {
    /// Create a gateway from provider config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not an object store or cannot be
    /// initialized.
    pub fn from_provider(provider: &StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            provider: provider.name(),
        })
    }

    /// In-memory gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn memory() -> Result<Self, StorageError> {
        Self::from_provider(&StorageProvider::Memory)
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => finish(
                services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region),
            ),
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => finish(
                services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container),
            ),
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("local root is not valid UTF-8"))?;
                finish(services::Fs::default().root(root))
            }
            StorageProvider::Memory => finish(services::Memory::default()),
            StorageProvider::Rest { .. } => Err(StorageError::configuration(
                "rest provider is not an object store",
            )),
        }
    }
}

fn finish(builder: impl Builder) -> Result<Operator, StorageError> {
    Operator::new(builder)
        .map(|b| b.finish())
        .map_err(|e| StorageError::configuration(e.to_string()))
}

/// Object key for a sync id.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` if the sync id is unusable.
pub fn snapshot_key(sync_id: &str) -> Result<String, StorageError> {
    Ok(format!("snapshots/{}.json", check_sync_id(sync_id)?))
}

#[async_trait]
impl PersistenceGateway for ObjectStoreGateway {
    async fn load_state(&self, sync_id: &str) -> Result<Option<LedgerState>, StorageError> {
        let key = snapshot_key(sync_id)?;
        let bytes = match self.operator.read(&key).await {
            Ok(buffer) => buffer.to_vec(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "no stored snapshot");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let text = String::from_utf8(bytes)
            .map_err(|e| document::DocumentError::Malformed(e.to_string()))?;
        Ok(Some(document::decode(&text)?))
    }

    async fn save_state(&self, sync_id: &str, state: &LedgerState) -> Result<(), StorageError> {
        let key = snapshot_key(sync_id)?;
        let text = document::export(state)?;
        self.operator.write(&key, text.into_bytes()).await?;
        debug!(key = %key, revision = state.revision, "snapshot written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.provider
    }
}
