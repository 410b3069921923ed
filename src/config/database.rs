use super::{optional, parse_port, required, required_secret, EnvSource, Secret};
use crate::error::ConfigError;

/// Variables that must be set before the database profile can run.
pub const REQUIRED_VARS: &[&str] = &[
    "DB_HOST",
    "DB_PORT",
    "DB_DATABASE",
    "DB_USERNAME",
    "DB_PASSWORD",
];

/// Tables created by the backend migrations that the application cannot run without.
pub const DEFAULT_EXPECTED_TABLES: &[&str] = &[
    "users",
    "departments",
    "vendors",
    "requisitions",
    "requisition_line_items",
    "vendor_quotes",
    "quote_line_items",
    "approval_steps",
    "attachments",
    "audit_logs",
    "purchase_orders",
    "po_line_items",
    "notices_to_award",
    "personal_access_tokens",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Secret,
    /// Overridable with a comma-separated `DB_EXPECTED_TABLES`.
    pub expected_tables: Vec<String>,
}

impl DatabaseConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let expected_tables = match optional(env, "DB_EXPECTED_TABLES")? {
            Some(list) => {
                let tables: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                if tables.is_empty() {
                    return Err(ConfigError::invalid(
                        "DB_EXPECTED_TABLES",
                        list,
                        "expected a comma-separated list of table names",
                    ));
                }
                tables
            }
            None => DEFAULT_EXPECTED_TABLES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        };

        Ok(Self {
            host: required(env, "DB_HOST")?,
            port: parse_port(env, "DB_PORT", None)?,
            database: required(env, "DB_DATABASE")?,
            username: required(env, "DB_USERNAME")?,
            password: required_secret(env, "DB_PASSWORD")?,
            expected_tables,
        })
    }

    /// `host:port`, for messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
