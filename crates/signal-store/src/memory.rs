//! In-memory storage implementation (for development and testing)

use crate::error::Result;
use crate::{validate_key, ObjectStore, ObjectWriter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryStore {
    bucket: String,
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new<T: Into<String>>(bucket: T) -> Self {
        Self {
            bucket: bucket.into(),
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of objects currently stored
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn open_writer(&self, key: &str) -> Result<Box<dyn ObjectWriter>> {
        validate_key(key)?;
        Ok(Box::new(MemoryWriter {
            key: key.to_string(),
            buffer: Vec::new(),
            data: self.data.clone(),
        }))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

struct MemoryWriter {
    key: String,
    buffer: Vec<u8>,
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

#[async_trait]
impl ObjectWriter for MemoryWriter {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let MemoryWriter { key, buffer, data } = *self;
        data.write().await.insert(key, buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_write_is_invisible_until_close() {
        let store = MemoryStore::new("leaders");

        let mut writer = store.open_writer("host-a").await.unwrap();
        writer.write(b"true").await.unwrap();
        assert_eq!(store.read("host-a").await.unwrap(), None);

        writer.close().await.unwrap();
        assert_eq!(store.read("host-a").await.unwrap(), Some(b"true".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = MemoryStore::new("leaders");

        for payload in [&b"true"[..], &b"false"[..]] {
            let mut writer = store.open_writer("host-a").await.unwrap();
            writer.write(payload).await.unwrap();
            writer.close().await.unwrap();
        }

        assert_eq!(store.read("host-a").await.unwrap(), Some(b"false".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_dropped_writer_leaves_no_record() {
        let store = MemoryStore::new("leaders");
        {
            let mut writer = store.open_writer("host-a").await.unwrap();
            writer.write(b"true").await.unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryStore::new("leaders");
        assert!(matches!(
            store.open_writer("").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
