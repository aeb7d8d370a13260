//! Storage sink abstraction
//!
//! Provides a unified interface over the object-storage backends (Google
//! Cloud Storage, Amazon S3) using the object_store crate. The upload flow
//! only ever needs two operations: an existence probe on the destination
//! key and a (possibly overwriting) write.

mod aws;
mod gcp;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::credentials::{CredentialError, CredentialRequest};

pub use aws::S3Sink;
pub use gcp::GcsSink;

/// Remote object-storage backend for one destination bucket.
///
/// Implementations are bucket-scoped: the bucket is fixed when the sink is
/// built from user credentials, and keys are relative to it. `put` always
/// overwrites; the caller decides whether that is allowed via the
/// existence probe and the confirmation flow.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// The destination bucket this sink writes to
    fn bucket(&self) -> &str;

    /// Whether an object with the given key already exists
    async fn exists(&self, key: &str) -> Result<bool, object_store::Error>;

    /// Write an object, overwriting any existing one with the same key
    async fn put(&self, key: &str, data: Bytes) -> Result<(), object_store::Error>;
}

/// Build the sink matching the loaded credentials.
///
/// The backend choice is explicit in the request's `backend` tag and is
/// fixed for the session until credentials are loaded again.
pub fn create_sink(request: CredentialRequest) -> Result<Arc<dyn StorageSink>, CredentialError> {
    match request {
        CredentialRequest::Gcs { bucket, key } => {
            let sink = GcsSink::new(&bucket, &key)?;
            Ok(Arc::new(sink))
        }
        CredentialRequest::S3 {
            bucket,
            access_key_id,
            secret_access_key,
            region,
            endpoint,
        } => {
            let sink = S3Sink::new(
                &bucket,
                &access_key_id,
                &secret_access_key,
                region.as_deref(),
                endpoint.as_deref(),
            )?;
            Ok(Arc::new(sink))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s3_request(bucket: &str) -> CredentialRequest {
        serde_json::from_value(json!({
            "backend": "s3",
            "bucket": bucket,
            "access_key_id": "AKIAEXAMPLE",
            "secret_access_key": "secret",
        }))
        .unwrap()
    }

    #[test]
    fn s3_credentials_build_a_bucket_scoped_sink() {
        let sink = create_sink(s3_request("trips")).unwrap();
        assert_eq!(sink.bucket(), "trips");
    }

    #[test]
    fn empty_bucket_is_rejected_before_any_build() {
        let err = create_sink(s3_request("")).err().unwrap();
        assert!(matches!(err, CredentialError::EmptyBucket));
    }

    #[test]
    fn recording_sink_probe_distinguishes_presence() {
        let sink = testing::RecordingSink::new("trips");
        tokio_test::block_on(async {
            assert!(!sink.exists("a.csv").await.unwrap());
            sink.seed("a.csv", b"x").await;
            assert!(sink.exists("a.csv").await.unwrap());
        });
        assert_eq!(sink.probe_count(), 2);
        assert_eq!(sink.put_count(), 0);
    }

    #[test]
    fn incomplete_gcs_key_is_rejected_before_any_build() {
        let request: CredentialRequest = serde_json::from_value(json!({
            "backend": "gcs",
            "bucket": "trips",
            "key": {"project_id": "demo", "client_email": "svc@demo.iam.gserviceaccount.com"},
        }))
        .unwrap();
        let err = create_sink(request).err().unwrap();
        assert!(matches!(err, CredentialError::Incomplete("private_key")));
    }
}
