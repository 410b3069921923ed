//! Argument handling and completions

use super::helpers::{run_linkverify, stderr_of, stdout_of};

#[test]
fn test_invalid_recipient_is_a_usage_error() {
    let output = run_linkverify(&["email", "--to", "not-an-address"], &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("not a valid email address"));
    assert!(stdout_of(&output).is_empty());
}

#[test]
fn test_missing_subcommand_is_a_usage_error() {
    let output = run_linkverify(&[], &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bash_completions() {
    let output = run_linkverify(&["completions", "bash"], &[]);
    let script = stdout_of(&output);

    assert!(output.status.success());
    assert!(script.contains("linkverify"));
    assert!(script.contains("storage"));
}

#[test]
fn test_unsupported_shell() {
    let output = run_linkverify(&["completions", "powershell"], &[]);
    let stderr = stderr_of(&output);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("invalid value 'powershell'"));
    assert!(stderr.contains("bash"));
}
