//! MySQL probe backed by a single `sqlx` connection.
//!
//! `sqlx` is async; the probe owns a current-thread runtime and blocks on it
//! for each call, so callers stay synchronous.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use sqlx::Connection;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use super::{Charset, DatabaseProbe};
use crate::config::DatabaseConfig;
use crate::error::ProbeError;

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// ER_DBACCESS_DENIED_ERROR, ER_ACCESS_DENIED_ERROR, ER_ACCESS_DENIED_NO_PASSWORD_ERROR
const ACCESS_DENIED_ERRORS: &[u16] = &[1044, 1045, 1698];

pub struct MySqlProbe {
    runtime: Runtime,
    options: MySqlConnectOptions,
    database: String,
    connection: Option<MySqlConnection>,
}

impl MySqlProbe {
    /// Prepare connection options. No network traffic happens until `connect`.
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the database I/O runtime")?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(config.password.expose())
            .charset("utf8mb4");

        Ok(Self {
            runtime,
            options,
            database: config.database.clone(),
            connection: None,
        })
    }
}

impl DatabaseProbe for MySqlProbe {
    fn connect(&mut self) -> Result<String, ProbeError> {
        debug!(database = %self.database, "connecting to MySQL");
        let connection = block_on(
            &self.runtime,
            "connect",
            CONNECT_TIMEOUT,
            MySqlConnection::connect_with(&self.options),
        )?;
        let connection = self.connection.insert(connection);

        block_on(
            &self.runtime,
            "version query",
            QUERY_TIMEOUT,
            sqlx::query_scalar::<_, String>("SELECT CAST(VERSION() AS CHAR)")
                .fetch_one(&mut *connection),
        )
    }

    fn charset(&mut self) -> Result<Charset, ProbeError> {
        let connection = self.connection.as_mut().ok_or(ProbeError::NotConnected)?;
        let (character_set, collation) = block_on(
            &self.runtime,
            "charset query",
            QUERY_TIMEOUT,
            sqlx::query_as::<_, (String, String)>(
                "SELECT CAST(@@character_set_database AS CHAR), CAST(@@collation_database AS CHAR)",
            )
            .fetch_one(&mut *connection),
        )?;
        Ok(Charset {
            character_set,
            collation,
        })
    }

    fn decimal_roundtrip(
        &mut self,
        literal: &str,
        precision: u8,
        scale: u8,
    ) -> Result<String, ProbeError> {
        // The literal is spliced into SQL, so it must be a plain number.
        literal
            .parse::<Decimal>()
            .map_err(|e| ProbeError::Unexpected(format!("'{literal}' is not a decimal: {e}")))?;

        let connection = self.connection.as_mut().ok_or(ProbeError::NotConnected)?;
        let sql = format!("SELECT CAST({literal} AS DECIMAL({precision},{scale}))");
        let value = block_on(
            &self.runtime,
            "decimal query",
            QUERY_TIMEOUT,
            sqlx::query_scalar::<_, Decimal>(&sql).fetch_one(&mut *connection),
        )?;
        Ok(value.to_string())
    }

    fn table_names(&mut self) -> Result<Vec<String>, ProbeError> {
        let connection = self.connection.as_mut().ok_or(ProbeError::NotConnected)?;
        block_on(
            &self.runtime,
            "schema catalog query",
            QUERY_TIMEOUT,
            sqlx::query_scalar::<_, String>(
                "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
            )
            .bind(&self.database)
            .fetch_all(&mut *connection),
        )
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("closing MySQL connection");
            if let Err(err) = block_on(&self.runtime, "disconnect", QUERY_TIMEOUT, connection.close())
            {
                warn!(error = %err, "MySQL connection did not close cleanly");
            }
        }
    }
}

impl Drop for MySqlProbe {
    fn drop(&mut self) {
        self.close();
    }
}

fn block_on<T, F>(
    runtime: &Runtime,
    operation: &'static str,
    after: Duration,
    future: F,
) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    runtime
        .block_on(async { tokio::time::timeout(after, future).await })
        .map_err(|_| ProbeError::timeout(operation, after))?
        .map_err(classify)
}

fn classify(err: sqlx::Error) -> ProbeError {
    match err {
        sqlx::Error::Io(e) => ProbeError::Connectivity(e.to_string()),
        sqlx::Error::Tls(e) => ProbeError::Tls(e.to_string()),
        sqlx::Error::Database(db) => {
            let number = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number);
            match number {
                Some(n) if ACCESS_DENIED_ERRORS.contains(&n) => {
                    ProbeError::Authentication(db.message().to_string())
                }
                _ => ProbeError::Rejected(db.message().to_string()),
            }
        }
        other => ProbeError::Unexpected(other.to_string()),
    }
}
