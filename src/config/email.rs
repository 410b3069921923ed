use super::{optional, parse_bool, parse_port, required, required_secret, EnvSource, Secret};
use crate::error::ConfigError;

pub const REQUIRED_VARS: &[&str] = &["SMTP_HOST", "SMTP_USER", "SMTP_PASSWORD", "SMTP_FROM_EMAIL"];

/// Mail submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Port on which TLS is negotiated before any SMTP traffic.
pub const IMPLICIT_TLS_PORT: u16 = 465;

pub const DEFAULT_FROM_NAME: &str = "P2P Procurement System";

/// How the SMTP session is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Plain connection upgraded with STARTTLS before authenticating
    StartTls,
    /// TLS from the first byte (SMTPS)
    Implicit,
    /// No encryption
    None,
}

impl TransportSecurity {
    pub fn describe(&self) -> &'static str {
        match self {
            TransportSecurity::StartTls => "STARTTLS",
            TransportSecurity::Implicit => "implicit TLS",
            TransportSecurity::None => "no encryption",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub security: TransportSecurity,
    pub username: String,
    pub password: Secret,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let port = parse_port(env, "SMTP_PORT", Some(DEFAULT_SMTP_PORT))?;
        let use_tls = parse_bool(env, "SMTP_USE_TLS", true)?;

        let security = match (use_tls, port) {
            (false, _) => TransportSecurity::None,
            (true, IMPLICIT_TLS_PORT) => TransportSecurity::Implicit,
            (true, _) => TransportSecurity::StartTls,
        };

        Ok(Self {
            host: required(env, "SMTP_HOST")?,
            port,
            security,
            username: required(env, "SMTP_USER")?,
            password: required_secret(env, "SMTP_PASSWORD")?,
            from_email: required(env, "SMTP_FROM_EMAIL")?,
            from_name: optional(env, "SMTP_FROM_NAME")?
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
