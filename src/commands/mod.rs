//! Subcommand entry points. Each one runs a profile against the process
//! environment and turns the verdict into an exit code.

pub mod database;
pub mod email;
pub mod storage;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::check::{run_profile, Profile, Reporter};
use crate::config::ProcessEnv;

/// Whether report tags should be coloured on stdout.
pub fn stdout_color(no_color: bool) -> bool {
    !no_color && io::stdout().is_terminal()
}

fn run_on_stdout<P: Profile>(profile: &P, color: bool) -> Result<ExitCode> {
    let stdout = io::stdout().lock();
    let mut reporter = Reporter::new(stdout, color);
    let report = run_profile(profile, &ProcessEnv, &mut reporter)
        .with_context(|| format!("failed to write the {} report", profile.kind().name()))?;
    Ok(ExitCode::from(report.exit_code()))
}
