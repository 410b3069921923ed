//! S3-compatible object store backed by `aws-sdk-s3`.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::Runtime;
use tracing::debug;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::ProbeError;

pub(crate) const STORAGE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const STORAGE_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct S3ObjectStore {
    runtime: Runtime,
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the client from explicit credentials. Loading the SDK config
    /// reads no ambient credentials and makes no requests.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the storage I/O runtime")?;

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.expose().to_string(),
            None,
            None,
            "linkverify-env",
        );
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(STORAGE_CONNECT_TIMEOUT)
            .operation_timeout(STORAGE_OPERATION_TIMEOUT)
            .build();

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .credentials_provider(credentials)
                .timeout_config(timeouts)
                .load(),
        );

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            debug!(%endpoint, "using custom S3 endpoint with path-style addressing");
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            runtime,
            client: Client::from_conf(s3_config.build()),
            bucket: config.bucket.clone(),
        })
    }

    fn block_on<T, E, F>(&self, operation: &'static str, future: F) -> Result<T, ProbeError>
    where
        F: Future<Output = Result<T, SdkError<E, HttpResponse>>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.runtime
            .block_on(future)
            .map_err(|err| classify(operation, err))
    }
}

impl ObjectStore for S3ObjectStore {
    fn put_object(&mut self, key: &str, body: &[u8], content_type: &str) -> Result<(), ProbeError> {
        debug!(bucket = %self.bucket, key, bytes = body.len(), "uploading object");
        self.block_on(
            "upload",
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(ByteStream::from(body.to_vec()))
                .content_type(content_type)
                .send(),
        )?;
        Ok(())
    }

    fn presign_get(&mut self, key: &str, expires_in: Duration) -> Result<String, ProbeError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| ProbeError::Unexpected(format!("invalid presign expiry: {e}")))?;

        let request = self.block_on(
            "presign",
            self.client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .presigned(presigning),
        )?;
        debug!(key, expires_in_secs = expires_in.as_secs(), "presigned GET generated");
        Ok(request.uri().to_string())
    }

    fn delete_object(&mut self, key: &str) -> Result<(), ProbeError> {
        debug!(bucket = %self.bucket, key, "deleting object");
        self.block_on(
            "delete",
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send(),
        )?;
        Ok(())
    }
}

fn classify<E>(operation: &'static str, err: SdkError<E, HttpResponse>) -> ProbeError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let detail = DisplayErrorContext(&err).to_string();

    match err {
        SdkError::TimeoutError(_) => ProbeError::timeout(operation, STORAGE_OPERATION_TIMEOUT),
        SdkError::DispatchFailure(_) => ProbeError::Connectivity(detail),
        SdkError::ConstructionFailure(_) => ProbeError::Unexpected(detail),
        _ => match status {
            Some(401 | 403) => ProbeError::Authentication(detail),
            _ => ProbeError::Rejected(detail),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    fn config(endpoint: Option<&str>) -> StorageConfig {
        StorageConfig {
            bucket: "p2p-attachments".to_string(),
            region: "ap-southeast-1".to_string(),
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: Secret::new("secret"),
            endpoint_url: endpoint.map(str::to_string),
            presigned_url_expiry: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_presign_is_offline_and_embeds_signature() {
        let mut store = S3ObjectStore::new(&config(Some("http://localhost:9000"))).unwrap();
        let url = store
            .presign_get(".tmp/link-verify-abc.txt", Duration::from_secs(60))
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/p2p-attachments/"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=60"));
    }

    #[test]
    fn test_presign_rejects_expiry_over_one_week() {
        let mut store = S3ObjectStore::new(&config(None)).unwrap();
        let err = store
            .presign_get("key", Duration::from_secs(8 * 24 * 60 * 60))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Unexpected(_)));
    }
}
