//! Leadership Status Storage
//!
//! This crate provides the durable bucket abstraction the signaller publishes
//! into, together with its Google Cloud Storage, Sled and in-memory backends.
//!
//! Objects are written through an [`ObjectWriter`]: bytes are staged by
//! `write` and only become visible to readers once `close` succeeds, so a
//! reader sees either the previous value or the new one, never a mix.

pub mod config;
pub mod embedded;
pub mod error;
pub mod gcs;
pub mod memory;

pub use config::StorageBackendConfig;
pub use embedded::SledStore;
pub use error::{Result, StoreError};
pub use gcs::{GcsStore, TokenSource};
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Key-value store scoped to a single bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open a create-or-overwrite stream for the object named `key`
    async fn open_writer(&self, key: &str) -> Result<Box<dyn ObjectWriter>>;

    /// Read back the current value of `key`
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Name of the bucket this store writes into
    fn bucket(&self) -> &str;
}

/// Pending write to a single object
#[async_trait]
pub trait ObjectWriter: Send {
    /// Stage bytes for the object
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Commit the staged bytes, replacing any previous value
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Create storage backend based on configuration.
///
/// `request_timeout` caps each remote request a backend issues; callers pass
/// the deadline they enforce around a whole write.
pub fn create_object_store(
    config: &StorageBackendConfig,
    bucket: &str,
    request_timeout: Duration,
) -> Result<Arc<dyn ObjectStore>> {
    match config {
        StorageBackendConfig::Gcs {
            endpoint,
            token,
            metadata_token_url,
        } => {
            let token_source = match token {
                Some(token) => TokenSource::Static(token.clone()),
                None => TokenSource::Metadata {
                    url: metadata_token_url.clone(),
                },
            };
            Ok(Arc::new(GcsStore::new(
                endpoint,
                bucket,
                token_source,
                request_timeout,
            )?))
        }
        StorageBackendConfig::Sled { path } => Ok(Arc::new(SledStore::open(path, bucket)?)),
        StorageBackendConfig::Memory => Ok(Arc::new(MemoryStore::new(bucket))),
    }
}

/// Object keys must be non-empty and free of control characters
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::invalid_key("key cannot be empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(StoreError::invalid_key(format!(
            "key {:?} contains control characters",
            key
        )));
    }
    Ok(())
}
