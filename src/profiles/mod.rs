//! The three dependency profiles: ordered checklists over a probe context.

pub mod database;
pub mod email;
pub mod storage;

#[cfg(test)]
pub(crate) mod fakes;

pub use database::{DatabaseContext, DatabaseProfile};
pub use email::{EmailContext, EmailProfile};
pub use storage::{StorageContext, StorageProfile};

use crate::check::CheckResult;
use crate::error::ProbeError;

/// Shared wording for a probe failure that prevents a check from completing.
///
/// `what` names the dependency ("MySQL", "SMTP server", ...), `target` the
/// endpoint, and `credential_vars` the variables to revisit when the server
/// refused the credentials.
pub(crate) fn probe_failure(
    what: &str,
    target: &str,
    endpoint_vars: &str,
    credential_vars: &str,
    err: &ProbeError,
) -> CheckResult {
    match err {
        ProbeError::Authentication(detail) => {
            CheckResult::fail(format!("{what} authentication failed: {detail}"))
                .with_hint(format!("Check {credential_vars} in .env."))
        }
        ProbeError::Timeout { .. } => {
            CheckResult::fail(format!("Timed out reaching {what} at {target}: {err}"))
                .with_hint(format!(
                    "Check {endpoint_vars} and that no firewall blocks the port."
                ))
        }
        ProbeError::Tls(detail) => CheckResult::fail(format!(
            "Could not negotiate TLS with {what} at {target}: {detail}"
        ))
        .with_hint(format!("Check {endpoint_vars} and the server's TLS setup.")),
        ProbeError::Connectivity(detail) => {
            CheckResult::fail(format!("Cannot connect to {what} at {target}: {detail}"))
                .with_hint(format!(
                    "Check {endpoint_vars} and that the server is running."
                ))
        }
        other => CheckResult::fail(format!("Unexpected {what} error: {other}"))
            .with_hint("Re-run with -vv for details."),
    }
}
