//! Publishing objects under public URLs.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::content_type::content_type_for;
use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// A publicly reachable URL for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl(String);

impl PublicUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PublicUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-encode each `/`-separated segment of a key independently.
pub fn encode_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Uploads objects and derives their public URLs.
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            store,
            public_base_url,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Public URL for `key`.
    pub fn public_url(&self, key: &str) -> PublicUrl {
        PublicUrl(format!("{}/{}", self.public_base_url, encode_key_path(key)))
    }

    /// Upload bytes under `key`.
    pub async fn publish(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<PublicUrl> {
        validate_key(key)?;
        let size = data.len();
        let started = Instant::now();

        self.store.put_object(key, data, content_type).await?;

        info!(
            key = %key,
            bytes = size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Published object"
        );
        Ok(self.public_url(key))
    }

    /// Upload a local file under `key`, inferring its content type from the key.
    pub async fn publish_file(&self, path: &Path, key: &str) -> StorageResult<PublicUrl> {
        validate_key(key)?;
        let content_type = content_type_for(key);
        let started = Instant::now();

        self.store.put_file(key, path, content_type).await?;

        info!(
            key = %key,
            content_type,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Published file"
        );
        Ok(self.public_url(key))
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s.is_empty()) {
        return Err(StorageError::invalid_key(key));
    }
    Ok(())
}
