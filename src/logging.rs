//! Diagnostic logging on stderr.
//!
//! Report lines go to stdout through [`crate::check::Reporter`]; tracing output
//! stays on stderr so it never interleaves with the report when piped.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a `-v` count: warn, info, then debug.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over `-v`.
pub fn init_tracing(verbosity: u8, color: bool) -> Result<()> {
    let level = default_level(verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(level, "tracing initialized");
    Ok(())
}
