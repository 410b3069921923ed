//! Immutable run configuration built from environment variables.
//!
//! Each profile reads its settings once, at start, through an [`EnvSource`].
//! The resulting structs are passed into the checks explicitly, so tests can
//! inject a map instead of mutating the process environment.

pub mod database;
pub mod email;
pub mod storage;


use std::collections::{BTreeMap, HashMap};
use std::env::VarError;
use std::fmt;

use crate::error::ConfigError;

pub use database::DatabaseConfig;
pub use email::{EmailConfig, TransportSecurity};
pub use storage::StorageConfig;

/// Lookup of configuration variables by name.
pub trait EnvSource {
    /// Raw value of `key`, if set.
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Value of `key` when it is set and not blank.
    ///
    /// Whitespace only decides blankness; the value comes back untouched so
    /// credentials reach the drivers exactly as configured.
    fn present(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.var(key)?.filter(|v| !v.trim().is_empty()))
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key.to_string())),
        }
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(key).cloned())
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(key).cloned())
    }
}

/// Names from `required` that are unset or blank, in declaration order.
///
/// A variable that is set but unreadable is not missing; parsing reports it.
pub fn missing_vars(required: &[&str], env: &dyn EnvSource) -> Vec<String> {
    required
        .iter()
        .filter(|key| matches!(env.present(key), Ok(None)))
        .map(|key| key.to_string())
        .collect()
}

/// Trimmed value of an optional plain setting.
pub(crate) fn optional(env: &dyn EnvSource, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(env.present(key)?.map(|v| v.trim().to_string()))
}

/// Trimmed value of a variable that [`missing_vars`] already confirmed is present.
pub(crate) fn required(env: &dyn EnvSource, key: &'static str) -> Result<String, ConfigError> {
    optional(env, key)?.ok_or_else(|| ConfigError::Missing(vec![key.to_string()]))
}

/// A required credential, kept byte for byte.
pub(crate) fn required_secret(env: &dyn EnvSource, key: &'static str) -> Result<Secret, ConfigError> {
    env.present(key)?
        .map(Secret::new)
        .ok_or_else(|| ConfigError::Missing(vec![key.to_string()]))
}

pub(crate) fn parse_port(
    env: &dyn EnvSource,
    key: &'static str,
    default: Option<u16>,
) -> Result<u16, ConfigError> {
    let raw = match (optional(env, key)?, default) {
        (Some(raw), _) => raw,
        (None, Some(default)) => return Ok(default),
        (None, None) => return Err(ConfigError::Missing(vec![key.to_string()])),
    };

    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::invalid(
            key,
            raw,
            "expected a port number between 1 and 65535",
        )),
        Ok(port) => Ok(port),
    }
}

pub(crate) fn parse_bool(
    env: &dyn EnvSource,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = optional(env, key)? else {
        return Ok(default);
    };

    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected true or false")),
    }
}

/// A credential that must never show up in logs or `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}
