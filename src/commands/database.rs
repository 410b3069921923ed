use std::process::ExitCode;

use anyhow::Result;

use super::run_on_stdout;
use crate::profiles::DatabaseProfile;

/// Verify the MySQL link
pub fn execute(color: bool) -> Result<ExitCode> {
    run_on_stdout(&DatabaseProfile::live(), color)
}
