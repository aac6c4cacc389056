//! Object storage interface for pipeline artifacts (S3 compatible).

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, memory::InMemory, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use etl_common::{EtlError, EtlResult};

/// Configuration for object storage connection.
///
/// Unset credentials fall back to the standard AWS environment and
/// instance credentials resolved by the S3 builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// Custom endpoint URL (MinIO, LocalStack); `None` for AWS
    pub endpoint: Option<String>,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: Option<String>,
    /// Secret access key
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    /// AWS region
    pub region: String,
    /// Allow plain HTTP endpoints
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: "silicon-plate-data".to_string(),
            access_key_id: None,
            secret_access_key: None,
            region: "us-east-1".to_string(),
            allow_http: false,
        }
    }
}

/// Object storage client for the cleaned artifact.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> EtlResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(key_id) = &config.access_key_id {
            builder = builder.with_access_key_id(key_id);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| EtlError::StorageError(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// An in-process store, used for dry runs and tests.
    pub fn in_memory(bucket: &str) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `s3://bucket/path` form of a key, for reports.
    pub fn uri(&self, path: &str) -> String {
        format!("s3://{}/{}", self.bucket, path)
    }

    /// Write bytes to a path in the bucket.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    pub async fn put(&self, path: &str, data: Bytes) -> EtlResult<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| EtlError::StorageError(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }

    /// Read bytes from a path.
    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    pub async fn get(&self, path: &str) -> EtlResult<Bytes> {
        let location = Path::from(path);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| EtlError::StorageError(format!("Failed to read {}: {}", path, e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| EtlError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Size of an object, or `None` if it does not exist.
    pub async fn size(&self, path: &str) -> EtlResult<Option<u64>> {
        let location = Path::from(path);

        match self.store.head(&location).await {
            Ok(meta) => Ok(Some(meta.size as u64)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(EtlError::StorageError(format!(
                "Failed to check {}: {}",
                path, e
            ))),
        }
    }
}
