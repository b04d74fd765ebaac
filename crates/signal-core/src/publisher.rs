//! Publishing the leadership flag into the bucket

use crate::error::PublishError;
use crate::types::{HostIdentity, LeadershipFlag};
use signal_store::ObjectStore;
use std::sync::Arc;
use std::time::Duration;

/// Reference deadline for a single publish
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Writes this host's leadership flag under its own key
pub struct StatusPublisher {
    store: Arc<dyn ObjectStore>,
    deadline: Duration,
}

impl StatusPublisher {
    pub fn new(store: Arc<dyn ObjectStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Overwrite the record for `identity` with `"true"` or `"false"`.
    ///
    /// Opening, writing and finalizing all share one deadline. A timeout that
    /// fires before the backend commits leaves the previous value in place.
    /// Backends commit at different points inside `close` (sled on insert,
    /// ahead of its durability flush), so a `Timeout` or `Finalize` error
    /// raised after that point does not roll the new value back; the next
    /// cycle overwrites the record either way.
    pub async fn publish(
        &self,
        flag: LeadershipFlag,
        identity: &HostIdentity,
    ) -> Result<(), PublishError> {
        let key = identity.as_str();
        let result = tokio::time::timeout(self.deadline, self.write_record(flag, key)).await;

        match result {
            Ok(Ok(())) => {
                tracing::info!(
                    "Published leadership status {} for {} to bucket {}",
                    flag,
                    key,
                    self.store.bucket()
                );
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PublishError::Timeout {
                key: key.to_string(),
                deadline: self.deadline,
            }),
        }
    }

    async fn write_record(&self, flag: LeadershipFlag, key: &str) -> Result<(), PublishError> {
        let mut writer = self
            .store
            .open_writer(key)
            .await
            .map_err(|source| PublishError::Open {
                key: key.to_string(),
                source,
            })?;

        writer
            .write(flag.as_payload().as_bytes())
            .await
            .map_err(|source| PublishError::Write {
                key: key.to_string(),
                source,
            })?;

        writer.close().await.map_err(|source| PublishError::Finalize {
            key: key.to_string(),
            source,
        })
    }
}
