use std::time::Duration;

use super::{optional, required, required_secret, EnvSource, Secret};
use crate::error::ConfigError;

pub const REQUIRED_VARS: &[&str] = &["STORAGE_BUCKET", "STORAGE_ACCESS_KEY", "STORAGE_SECRET_KEY"];

pub const DEFAULT_REGION: &str = "ap-southeast-1";

pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Longest validity SigV4 allows for a presigned request (7 days).
pub const MAX_PRESIGNED_URL_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: Secret,
    /// Custom S3-compatible endpoint; `None` uses AWS.
    pub endpoint_url: Option<String>,
    pub presigned_url_expiry: Duration,
}

impl StorageConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let expiry_secs = match optional(env, "STORAGE_PRESIGNED_URL_EXPIRY")? {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if (1..=MAX_PRESIGNED_URL_EXPIRY_SECS).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::invalid(
                        "STORAGE_PRESIGNED_URL_EXPIRY",
                        raw,
                        format!("expected seconds between 1 and {MAX_PRESIGNED_URL_EXPIRY_SECS}"),
                    ))
                }
            },
            None => DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
        };

        Ok(Self {
            bucket: required(env, "STORAGE_BUCKET")?,
            region: optional(env, "STORAGE_REGION")?
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key: required(env, "STORAGE_ACCESS_KEY")?,
            secret_key: required_secret(env, "STORAGE_SECRET_KEY")?,
            endpoint_url: optional(env, "STORAGE_ENDPOINT_URL")?,
            presigned_url_expiry: Duration::from_secs(expiry_secs),
        })
    }

    /// `s3://bucket/key`, for messages.
    pub fn object_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
