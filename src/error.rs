//! Error taxonomy shared by configuration loading and the network probes.

use std::time::Duration;
use thiserror::Error;

/// A required setting is missing or cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid value for {0}: not valid UTF-8")]
    NotUnicode(String),
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single network operation against an external dependency.
///
/// Adapters classify their driver errors into these variants so checks can
/// pick a message and remediation hint without knowing the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Host unreachable, connection refused or dropped.
    #[error("connection failed: {0}")]
    Connectivity(String),

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Transport encryption could not be negotiated.
    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    /// The server reached us and refused the credentials.
    #[error("credentials rejected: {0}")]
    Authentication(String),

    /// The server understood the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("operation attempted before a session was established")]
    NotConnected,

    #[error("{0}")]
    Unexpected(String),
}

impl ProbeError {
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        ProbeError::Timeout { operation, after }
    }

    /// True for failures that mean the endpoint could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ProbeError::Connectivity(_) | ProbeError::Timeout { .. } | ProbeError::Tls(_)
        )
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ProbeError::Authentication(_))
    }
}
