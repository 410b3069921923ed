//! Environment validation, the first step of every profile

use super::CheckResult;
use crate::config::{missing_vars, EnvSource};

/// Check that every name in `required` is set to a non-blank value.
///
/// `label` names the variable family in messages, e.g. "DB" or "SMTP".
pub fn validate_env(label: &str, required: &[&str], env: &dyn EnvSource) -> CheckResult {
    let missing = missing_vars(required, env);

    if missing.is_empty() {
        return CheckResult::ok(format!("All {label} environment variables present."));
    }

    CheckResult::fail(format!(
        "Missing {label} environment variables: {}",
        missing.join(", ")
    ))
    .with_hint(format!(
        "Fill in the {label} values in .env (or export them) before running this check."
    ))
}
