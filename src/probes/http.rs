//! Plain HTTP fetches of presigned URLs.
//!
//! The request deliberately carries no credentials: a presigned URL must work
//! on its own.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

use super::{HttpFetcher, HttpReply};
use crate::error::ProbeError;

pub(crate) const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The verification object is a single sentence; anything larger is not ours.
pub(crate) const MAX_BODY_SIZE: u64 = 1024 * 1024;

/// Create an HTTP client with bounded connect and total request time.
pub(crate) fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .user_agent(concat!("linkverify/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Blocking `reqwest` implementation of [`HttpFetcher`].
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
        })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str) -> Result<HttpReply, ProbeError> {
        debug!("fetching presigned URL");
        let response = self.client.get(url).send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = read_with_limit(response, MAX_BODY_SIZE)?;
        debug!(status, bytes = body.len(), "presigned fetch finished");
        Ok(HttpReply { status, body })
    }
}

fn classify(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::timeout("presigned URL fetch", HTTP_REQUEST_TIMEOUT)
    } else if err.is_connect() {
        ProbeError::Connectivity(err.to_string())
    } else {
        ProbeError::Unexpected(err.to_string())
    }
}

/// Read the body, refusing anything over `max_size` bytes.
fn read_with_limit(response: Response, max_size: u64) -> Result<Vec<u8>, ProbeError> {
    if let Some(content_length) = response.content_length() {
        if content_length > max_size {
            return Err(ProbeError::Unexpected(format!(
                "response of {content_length} bytes exceeds the {max_size} byte limit"
            )));
        }
    }

    let mut bytes = Vec::new();
    response
        .take(max_size + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| ProbeError::Connectivity(format!("failed to read response body: {e}")))?;

    if bytes.len() as u64 > max_size {
        return Err(ProbeError::Unexpected(format!(
            "response exceeds the {max_size} byte limit"
        )));
    }
    Ok(bytes)
}
