//! MySQL link verification.
//!
//! Connection is the only fatal step. Encoding, decimal fidelity and schema
//! presence are reported as warnings: a fresh database legitimately has no
//! tables until the migrations run.

use std::collections::HashSet;

use anyhow::Result;

use super::probe_failure;
use crate::check::{Check, CheckContext, CheckResult, DependencyKind, Profile};
use crate::config::{database, DatabaseConfig, EnvSource};
use crate::error::ProbeError;
use crate::probes::{DatabaseProbe, MySqlProbe};

/// Value cast through `DECIMAL(15,4)`, the type used for money columns.
pub const DECIMAL_LITERAL: &str = "1234567890.1234";
pub const DECIMAL_PRECISION: u8 = 15;
pub const DECIMAL_SCALE: u8 = 4;

const ENDPOINT_VARS: &str = "DB_HOST and DB_PORT";
const CREDENTIAL_VARS: &str = "DB_USERNAME and DB_PASSWORD";

pub type DatabaseProbeFactory = fn(&DatabaseConfig) -> Result<Box<dyn DatabaseProbe>>;

pub struct DatabaseProfile<F = DatabaseProbeFactory> {
    open: F,
}

impl<F> DatabaseProfile<F>
where
    F: Fn(&DatabaseConfig) -> Result<Box<dyn DatabaseProbe>>,
{
    pub fn with_probe(open: F) -> Self {
        Self { open }
    }
}

impl DatabaseProfile {
    /// Profile backed by a real MySQL connection.
    pub fn live() -> Self {
        Self {
            open: open_mysql,
        }
    }
}

fn open_mysql(config: &DatabaseConfig) -> Result<Box<dyn DatabaseProbe>> {
    Ok(Box::new(MySqlProbe::new(config)?))
}

pub struct DatabaseContext {
    pub config: DatabaseConfig,
    probe: Box<dyn DatabaseProbe>,
}

impl CheckContext for DatabaseContext {
    fn release(&mut self) {
        self.probe.close();
    }
}

impl<F> Profile for DatabaseProfile<F>
where
    F: Fn(&DatabaseConfig) -> Result<Box<dyn DatabaseProbe>>,
{
    type Context = DatabaseContext;

    fn kind(&self) -> DependencyKind {
        DependencyKind::Database
    }

    fn required_vars(&self) -> &'static [&'static str] {
        database::REQUIRED_VARS
    }

    fn env_hints(&self) -> &'static [&'static str] {
        &["Note: the backend uses DB_DATABASE and DB_USERNAME (not DB_NAME/DB_USER)."]
    }

    fn next_steps(&self) -> &'static [&'static str] {
        &["php artisan migrate (from the backend/ directory)"]
    }

    fn prepare(&self, env: &dyn EnvSource) -> Result<DatabaseContext> {
        let config = DatabaseConfig::from_env(env)?;
        let probe = (self.open)(&config)?;
        Ok(DatabaseContext { config, probe })
    }

    fn checks(&self) -> Vec<Check<DatabaseContext>> {
        vec![
            Check::fatal("connection", check_connection),
            Check::advisory("charset", check_charset),
            Check::advisory("decimal", check_decimal),
            Check::advisory("tables", check_tables),
        ]
    }
}

fn check_connection(ctx: &mut DatabaseContext) -> CheckResult {
    match ctx.probe.connect() {
        Ok(version) => CheckResult::ok(format!("Connected to MySQL: {version}")),
        Err(ProbeError::Rejected(detail)) => {
            CheckResult::fail(format!("MySQL refused the session: {detail}")).with_hint(format!(
                "Check that database '{}' exists and DB_USERNAME may use it.",
                ctx.config.database
            ))
        }
        Err(err) => probe_failure(
            "MySQL",
            &ctx.config.address(),
            ENDPOINT_VARS,
            CREDENTIAL_VARS,
            &err,
        ),
    }
}

fn check_charset(ctx: &mut DatabaseContext) -> CheckResult {
    match ctx.probe.charset() {
        Ok(charset) if charset.character_set.to_lowercase().starts_with("utf8mb4") => {
            CheckResult::ok(format!(
                "DB charset: {} / collation: {}",
                charset.character_set, charset.collation
            ))
        }
        Ok(charset) => CheckResult::warn(format!(
            "Database charset is {} (collation {}), not utf8mb4.",
            charset.character_set, charset.collation
        ))
        .with_hint("Recreate the database with:")
        .with_hint(format!(
            "CREATE DATABASE {} CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;",
            ctx.config.database
        )),
        Err(err) => CheckResult::warn(format!("Could not read the database charset: {err}"))
            .with_hint("Verify manually with: SELECT @@character_set_database;"),
    }
}

fn check_decimal(ctx: &mut DatabaseContext) -> CheckResult {
    let label = format!("DECIMAL({DECIMAL_PRECISION},{DECIMAL_SCALE})");
    match ctx
        .probe
        .decimal_roundtrip(DECIMAL_LITERAL, DECIMAL_PRECISION, DECIMAL_SCALE)
    {
        Ok(value) if value == DECIMAL_LITERAL => {
            CheckResult::ok(format!("{label} round-trip verified: {value}"))
        }
        Ok(value) => CheckResult::warn(format!(
            "{label} result mismatch: got {value}, expected {DECIMAL_LITERAL}"
        ))
        .with_hint("Financial amounts may lose precision; check the server's sql_mode and driver."),
        Err(err) => CheckResult::warn(format!("{label} check skipped: {err}"))
            .with_hint("Re-run once the connection is stable to confirm decimal precision."),
    }
}

fn check_tables(ctx: &mut DatabaseContext) -> CheckResult {
    let existing: HashSet<String> = match ctx.probe.table_names() {
        Ok(names) => names.into_iter().map(|n| n.to_lowercase()).collect(),
        Err(err) => {
            return CheckResult::warn(format!("Table check error: {err}"))
                .with_hint("Verify the schema manually with: SHOW TABLES;")
        }
    };

    let expected = &ctx.config.expected_tables;
    let missing: Vec<&str> = expected
        .iter()
        .filter(|t| !existing.contains(&t.to_lowercase()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return CheckResult::ok(format!(
            "All {} core tables verified present.",
            expected.len()
        ));
    }

    CheckResult::warn(format!("Tables not yet created: {}", missing.join(", ")))
        .with_hint("Run the migrations: php artisan migrate (from the backend/ directory)")
}
