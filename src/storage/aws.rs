//! Amazon S3 sink
//!
//! Backed by object_store::aws::AmazonS3, authenticated with the access-key
//! pair the user supplies at session start. A custom endpoint can be given
//! for S3-compatible services (MinIO and friends), in which case plain HTTP
//! is also accepted.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::ObjectStore;

use crate::credentials::CredentialError;
use crate::metrics::STORAGE_OPERATION_DURATION;
use crate::storage::StorageSink;

const DEFAULT_REGION: &str = "us-east-1";

/// Amazon S3 sink for one bucket
pub struct S3Sink {
    bucket: String,
    store: AmazonS3,
}

impl S3Sink {
    pub fn new(
        bucket: &str,
        access_key_id: &str,
        secret_access_key: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<Self, CredentialError> {
        if bucket.is_empty() {
            return Err(CredentialError::EmptyBucket);
        }
        if access_key_id.is_empty() {
            return Err(CredentialError::Incomplete("access_key_id"));
        }
        if secret_access_key.is_empty() {
            return Err(CredentialError::Incomplete("secret_access_key"));
        }

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(region.unwrap_or(DEFAULT_REGION))
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key);

        if let Some(endpoint) = endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        let store = builder.build()?;

        Ok(Self {
            bucket: bucket.to_string(),
            store,
        })
    }
}

#[async_trait]
impl StorageSink for S3Sink {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_are_incomplete() {
        assert!(matches!(
            S3Sink::new("trips", "", "secret", None, None),
            Err(CredentialError::Incomplete("access_key_id"))
        ));
        assert!(matches!(
            S3Sink::new("trips", "AKIAEXAMPLE", "", None, None),
            Err(CredentialError::Incomplete("secret_access_key"))
        ));
    }

    #[test]
    fn builds_with_custom_endpoint() {
        let sink = S3Sink::new(
            "trips",
            "AKIAEXAMPLE",
            "secret",
            Some("eu-west-1"),
            Some("http://localhost:9000"),
        );
        assert!(sink.is_ok());
    }
}
