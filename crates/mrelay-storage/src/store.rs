//! The object store seam.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Information about a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp (milliseconds since epoch)
    pub last_modified: Option<u64>,
}

/// Minimal operations the server needs from a bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Stream a local file to `key`.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// List every object whose key starts with `prefix`.
    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>>;

    /// Delete one object by exact key. Deleting a missing key is not an error.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Check the bucket is reachable with the configured credentials.
    async fn check_connectivity(&self) -> StorageResult<()>;
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    last_modified: u64,
}

/// In-process store backed by a sorted map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit modification time.
    pub fn insert_at(&self, key: &str, data: impl Into<Vec<u8>>, last_modified: u64) {
        let data = data.into();
        let content_type = crate::content_type::content_type_for(key).to_string();
        self.lock().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type,
                last_modified,
            },
        );
    }

    /// Bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).map(|o| o.data.clone())
    }

    /// Content type stored with `key`.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.lock().get(key).map(|o| o.content_type.clone())
    }

    /// All stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A poisoned map is still structurally valid
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::invalid_key("empty key"));
        }
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.lock().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: now,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.store(key, data, content_type)
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let data = tokio::fs::read(path).await?;
        self.store(key, data, content_type)
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        Ok(self
            .lock()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectInfo {
                key: key.clone(),
                size: obj.data.len() as u64,
                last_modified: Some(obj.last_modified),
            })
            .collect())
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }
}
