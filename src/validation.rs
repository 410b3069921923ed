//! Validation for user-supplied command-line values.

use anyhow::{bail, Result};
use lettre::Address;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validates a recipient address for the test email.
///
/// ```
/// use linkverify::validation::validate_email_address;
///
/// assert!(validate_email_address("ops@example.com").is_ok());
/// assert!(validate_email_address("not-an-address").is_err());
/// ```
pub fn validate_email_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        bail!("Email address cannot be empty");
    }

    if address.len() > MAX_EMAIL_LENGTH {
        bail!(
            "Email address too long: {} characters (max {})",
            address.len(),
            MAX_EMAIL_LENGTH
        );
    }

    if let Err(err) = address.parse::<Address>() {
        bail!("'{address}' is not a valid email address: {err}");
    }

    Ok(())
}

/// Clap value parser for `--to`.
///
/// ```ignore
/// #[arg(long, value_parser = clap_email_validator)]
/// to: Option<String>,
/// ```
pub fn clap_email_validator(s: &str) -> Result<String, String> {
    validate_email_address(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
