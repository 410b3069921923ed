//! Helpers for running the linkverify binary

use std::process::{Command, Output};

/// Run `linkverify` with only the given environment variables set.
pub fn run_linkverify(args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_linkverify"));
    cmd.env_clear().args(args);
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to run linkverify")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
