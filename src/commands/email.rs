use std::process::ExitCode;

use anyhow::Result;

use super::run_on_stdout;
use crate::profiles::EmailProfile;

/// Verify the SMTP link, sending the test message to `to` or the configured sender
pub fn execute(to: Option<String>, color: bool) -> Result<ExitCode> {
    run_on_stdout(&EmailProfile::live(to), color)
}
