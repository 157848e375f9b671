//! R2 (S3-compatible) object store.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectInfo, ObjectStore};

const DEFAULT_REGION: &str = "auto";

/// Connection settings for the results bucket.
#[derive(Debug, Clone)]
pub struct R2Config {
    /// S3 API endpoint of the account
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// R2 accepts "auto"; other S3 providers need a real region
    pub region: String,
    /// Origin that serves the bucket publicly, without a trailing slash
    pub public_base_url: String,
}

impl R2Config {
    /// Read settings from `R2_*` environment variables.
    ///
    /// Everything except `R2_REGION` is required.
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StorageResult<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StorageError::config_error(format!("{} not set", name)))
        };

        Ok(Self {
            endpoint_url: required("R2_ENDPOINT_URL")?,
            access_key_id: required("R2_ACCESS_KEY_ID")?,
            secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
            bucket_name: required("R2_BUCKET_NAME")?,
            region: lookup("R2_REGION")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            public_base_url: required("R2_PUBLIC_BASE_URL")?,
        })
    }
}

/// Object store backed by a single R2 bucket.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
}

impl R2Client {
    /// Build the SDK client. No network traffic happens here.
    pub fn new(config: &R2Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "mrelay-r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name.clone(),
        }
    }

    async fn put(&self, key: &str, body: ByteStream, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(key, e))?;
        Ok(())
    }
}

fn to_object_info(obj: &aws_sdk_s3::types::Object) -> ObjectInfo {
    ObjectInfo {
        key: obj.key().unwrap_or_default().to_string(),
        size: obj.size().unwrap_or(0).max(0) as u64,
        last_modified: obj
            .last_modified()
            .and_then(|t| t.to_millis().ok())
            .map(|ms| ms.max(0) as u64),
    }
}

#[async_trait]
impl ObjectStore for R2Client {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let bytes = data.len();
        self.put(key, ByteStream::from(data), content_type).await?;
        debug!(bucket = %self.bucket, key, bytes, "Stored object");
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(key, e))?;
        self.put(key, body, content_type).await?;
        info!(bucket = %self.bucket, key, content_type, "Uploaded {}", path.display());
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::list_failed(prefix, e))?;

            objects.extend(response.contents().iter().map(to_object_info));

            continuation = response
                .next_continuation_token()
                .filter(|_| response.is_truncated() == Some(true))
                .map(str::to_string);
            if continuation.is_none() {
                break;
            }
        }

        debug!(bucket = %self.bucket, prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(key, e))?;

        info!(bucket = %self.bucket, key, "Deleted object");
        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Unreachable(format!("{}: {}", self.bucket, e)))?;
        Ok(())
    }
}
