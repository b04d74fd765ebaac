//! Sled-based storage implementation
//!
//! Each bucket maps to its own sled tree inside a single database, so several
//! signallers sharing a host can publish into distinct buckets.

use crate::error::{Result, StoreError};
use crate::{validate_key, ObjectStore, ObjectWriter};
use async_trait::async_trait;
use std::path::Path;

pub struct SledStore {
    bucket: String,
    tree: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P, bucket: &str) -> Result<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StoreError::client(format!(
                "failed to open sled database at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::with_db(&db, bucket)
    }

    /// Open `bucket` inside an already opened database
    pub fn with_db(db: &sled::Db, bucket: &str) -> Result<Self> {
        let tree = if bucket.is_empty() {
            (**db).clone()
        } else {
            db.open_tree(bucket)
                .map_err(|e| StoreError::client(format!("failed to open tree {}: {}", bucket, e)))?
        };

        tracing::debug!("Opened sled bucket {:?}", bucket);

        Ok(Self {
            bucket: bucket.to_string(),
            tree,
        })
    }
}

#[async_trait]
impl ObjectStore for SledStore {
    async fn open_writer(&self, key: &str) -> Result<Box<dyn ObjectWriter>> {
        validate_key(key)?;
        Ok(Box::new(SledWriter {
            key: key.to_string(),
            buffer: Vec::new(),
            tree: self.tree.clone(),
        }))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree
            .get(key)
            .map_err(|e| StoreError::read(format!("Sled error: {}", e)))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

struct SledWriter {
    key: String,
    buffer: Vec<u8>,
    tree: sled::Tree,
}

#[async_trait]
impl ObjectWriter for SledWriter {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let SledWriter { key, buffer, tree } = *self;
        // Readers see the value from here on; the flush only adds durability.
        tree.insert(key.as_bytes(), buffer)?;
        tree.flush_async()
            .await
            .map_err(|e| StoreError::finalize(format!("failed to flush {}: {}", key, e)))?;
        Ok(())
    }
}
