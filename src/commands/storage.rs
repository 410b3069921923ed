use std::process::ExitCode;

use anyhow::Result;

use super::run_on_stdout;
use crate::profiles::StorageProfile;

/// Verify the object storage link
pub fn execute(color: bool) -> Result<ExitCode> {
    run_on_stdout(&StorageProfile::live(), color)
}
