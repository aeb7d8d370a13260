//! Google Cloud Storage sink
//!
//! Backed by object_store::gcp::GoogleCloudStorage, authenticated with the
//! service-account key JSON the user uploads at session start. The key is
//! handed to the builder directly; nothing is written to disk or exported
//! through the process environment.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::ObjectStore;

use crate::credentials::{CredentialError, ServiceAccountKey};
use crate::metrics::STORAGE_OPERATION_DURATION;
use crate::storage::StorageSink;

/// Google Cloud Storage sink for one bucket
pub struct GcsSink {
    bucket: String,
    store: GoogleCloudStorage,
}

impl GcsSink {
    /// Build a sink from an uploaded service-account key.
    ///
    /// The key's recognized fields are checked before the builder runs, so
    /// an incomplete document is reported as a credential problem rather
    /// than a backend rejection.
    pub fn new(bucket: &str, key: &ServiceAccountKey) -> Result<Self, CredentialError> {
        if bucket.is_empty() {
            return Err(CredentialError::EmptyBucket);
        }
        key.validate()?;

        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(bucket)
            .with_service_account_key(key.as_json()?)
            .build()?;

        Ok(Self {
            bucket: bucket.to_string(),
            store,
        })
    }
}

#[async_trait]
impl StorageSink for GcsSink {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &str) -> Result<bool, object_store::Error> {
        let timer = STORAGE_OPERATION_DURATION.start_timer();
        let result = match self.store.head(&Path::from(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        };
        timer.observe_duration();
        result
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), object_store::Error> {
        let timer = STORAGE_OPERATION_DURATION.start_timer();
        let result = self.store.put(&Path::from(key), data.into()).await;
        timer.observe_duration();
        result?;
        Ok(())
    }
}
