//! Object storage link verification through a presigned URL round trip.
//!
//! Upload is fatal: nothing else can run without the object. The presigned
//! fetch is not fatal, so cleanup still happens, but it decides the verdict.
//! Cleanup never affects the verdict.

use anyhow::Result;
use tracing::warn;
use uuid::Uuid;

use super::probe_failure;
use crate::check::{Check, CheckContext, CheckResult, DependencyKind, Profile};
use crate::config::{storage, EnvSource, StorageConfig};
use crate::error::ProbeError;
use crate::probes::{HttpFetcher, ObjectStore, ReqwestFetcher, S3ObjectStore};

pub const TEST_CONTENT: &[u8] =
    b"P2P Procurement System - storage link verification test file. Safe to delete.";

pub const TEST_CONTENT_TYPE: &str = "text/plain";

/// Test objects live under this prefix so stray ones are easy to find.
pub const TEST_KEY_PREFIX: &str = ".tmp/link-verify-";

const ENDPOINT_VARS: &str = "STORAGE_ENDPOINT_URL and STORAGE_REGION";
const CREDENTIAL_VARS: &str = "STORAGE_ACCESS_KEY and STORAGE_SECRET_KEY";

/// A fresh, collision-resistant key such as `.tmp/link-verify-1a2b3c4d.txt`.
pub fn test_object_key() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{TEST_KEY_PREFIX}{}.txt", &id[..8])
}

/// The clients a storage run needs.
pub struct StorageClients {
    pub store: Box<dyn ObjectStore>,
    pub fetcher: Box<dyn HttpFetcher>,
}

pub type StorageClientFactory = fn(&StorageConfig) -> Result<StorageClients>;

pub struct StorageProfile<F = StorageClientFactory> {
    open: F,
}

impl<F> StorageProfile<F>
where
    F: Fn(&StorageConfig) -> Result<StorageClients>,
{
    pub fn with_clients(open: F) -> Self {
        Self { open }
    }
}

impl StorageProfile {
    pub fn live() -> Self {
        Self { open: open_s3 }
    }
}

fn open_s3(config: &StorageConfig) -> Result<StorageClients> {
    Ok(StorageClients {
        store: Box::new(S3ObjectStore::new(config)?),
        fetcher: Box::new(ReqwestFetcher::new()?),
    })
}

pub struct StorageContext {
    pub config: StorageConfig,
    pub key: String,
    store: Box<dyn ObjectStore>,
    fetcher: Box<dyn HttpFetcher>,
    uploaded: bool,
    cleanup_attempted: bool,
}

impl CheckContext for StorageContext {
    /// Delete the object if the run ended before the cleanup check got to it.
    fn release(&mut self) {
        if self.uploaded && !self.cleanup_attempted {
            self.cleanup_attempted = true;
            if let Err(err) = self.store.delete_object(&self.key) {
                warn!(
                    object = %self.config.object_uri(&self.key),
                    error = %err,
                    "test object left behind; delete it manually"
                );
            }
        }
    }
}

impl Drop for StorageContext {
    fn drop(&mut self) {
        self.release();
    }
}

impl<F> Profile for StorageProfile<F>
where
    F: Fn(&StorageConfig) -> Result<StorageClients>,
{
    type Context = StorageContext;

    fn kind(&self) -> DependencyKind {
        DependencyKind::Storage
    }

    fn required_vars(&self) -> &'static [&'static str] {
        storage::REQUIRED_VARS
    }

    fn prepare(&self, env: &dyn EnvSource) -> Result<StorageContext> {
        let config = StorageConfig::from_env(env)?;
        let StorageClients { store, fetcher } = (self.open)(&config)?;
        Ok(StorageContext {
            config,
            key: test_object_key(),
            store,
            fetcher,
            uploaded: false,
            cleanup_attempted: false,
        })
    }

    fn checks(&self) -> Vec<Check<StorageContext>> {
        vec![
            Check::fatal("upload", check_upload),
            Check::gating("presigned read", check_presigned_read),
            Check::advisory("cleanup", check_cleanup),
        ]
    }
}

fn check_upload(ctx: &mut StorageContext) -> CheckResult {
    let uri = ctx.config.object_uri(&ctx.key);
    match ctx
        .store
        .put_object(&ctx.key, TEST_CONTENT, TEST_CONTENT_TYPE)
    {
        Ok(()) => {
            ctx.uploaded = true;
            CheckResult::ok(format!("Uploaded test object: {uri}"))
        }
        Err(ProbeError::Rejected(detail)) => {
            CheckResult::fail(format!("Upload failed: {detail}")).with_hint(format!(
                "Check that bucket '{}' exists and the access key may write to it.",
                ctx.config.bucket
            ))
        }
        Err(err) => {
            let result = probe_failure(
                "object storage",
                &storage_target(&ctx.config),
                ENDPOINT_VARS,
                CREDENTIAL_VARS,
                &err,
            );
            // The server may have stored the object before the reply was lost.
            if matches!(err, ProbeError::Timeout { .. } | ProbeError::Connectivity(_)) {
                result.with_hint(format!("If the upload reached the bucket, remove {uri} by hand."))
            } else {
                result
            }
        }
    }
}

fn check_presigned_read(ctx: &mut StorageContext) -> CheckResult {
    let url = match ctx
        .store
        .presign_get(&ctx.key, ctx.config.presigned_url_expiry)
    {
        Ok(url) => url,
        Err(err) => {
            return CheckResult::fail(format!("Presigned URL error: {err}"))
                .with_hint("Check STORAGE_PRESIGNED_URL_EXPIRY and the credentials.")
        }
    };

    match ctx.fetcher.get(&url) {
        Ok(reply) if reply.status == 200 && reply.body == TEST_CONTENT => CheckResult::ok(
            format!("Presigned URL fetch: HTTP {}, content verified.", reply.status),
        ),
        Ok(reply) if reply.status == 200 => CheckResult::warn(format!(
            "Presigned URL fetch: HTTP 200, but the body ({} bytes) differs from the uploaded content.",
            reply.body.len()
        ))
        .with_hint("A proxy or CDN in front of the bucket may be rewriting responses."),
        Ok(reply) => CheckResult::fail(format!("Presigned URL returned HTTP {}", reply.status))
            .with_hint(
                "Check STORAGE_REGION and STORAGE_ENDPOINT_URL; a skewed system clock also invalidates signatures.",
            ),
        Err(err) => CheckResult::fail(format!("Presigned URL fetch failed: {err}")).with_hint(
            "The presigned host must be reachable from here without credentials; check STORAGE_ENDPOINT_URL.",
        ),
    }
}

fn check_cleanup(ctx: &mut StorageContext) -> CheckResult {
    ctx.cleanup_attempted = true;
    match ctx.store.delete_object(&ctx.key) {
        Ok(()) => CheckResult::ok(format!("Test object deleted: {}", ctx.key)),
        Err(err) => CheckResult::warn(format!("Delete failed (manual cleanup needed): {err}"))
            .with_hint(format!(
                "Remove {} by hand.",
                ctx.config.object_uri(&ctx.key)
            )),
    }
}

fn storage_target(config: &StorageConfig) -> String {
    match &config.endpoint_url {
        Some(endpoint) => format!("{endpoint} (bucket {})", config.bucket),
        None => format!("s3://{} in {}", config.bucket, config.region),
    }
}
