//! An empty environment fails every profile before any client is built

use super::helpers::{run_linkverify, stdout_of};

#[test]
fn test_database_without_env_fails() {
    let output = run_linkverify(&["database"], &[]);
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("=== P2P Database (MySQL) Link Verification ==="));
    assert!(stdout.contains(
        "[FAIL] Missing DB environment variables: DB_HOST, DB_PORT, DB_DATABASE, DB_USERNAME, DB_PASSWORD"
    ));
    assert!(stdout.contains("not DB_NAME/DB_USER"));
    assert!(stdout.contains("FAIL  Database link: FAILED"));
}

#[test]
fn test_db_alias_behaves_like_database() {
    let output = run_linkverify(&["db"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("FAIL  Database link: FAILED"));
}

#[test]
fn test_email_without_env_fails() {
    let output = run_linkverify(&["email"], &[]);
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains(
        "[FAIL] Missing SMTP environment variables: SMTP_HOST, SMTP_USER, SMTP_PASSWORD, SMTP_FROM_EMAIL"
    ));
    assert!(stdout.contains("FAIL  Email link: FAILED"));
}

#[test]
fn test_storage_without_env_fails() {
    let output = run_linkverify(&["storage"], &[]);
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains(
        "[FAIL] Missing storage environment variables: STORAGE_BUCKET, STORAGE_ACCESS_KEY, STORAGE_SECRET_KEY"
    ));
    assert!(stdout.contains("FAIL  Storage link: FAILED"));
}

#[test]
fn test_blank_values_count_as_missing() {
    let output = run_linkverify(
        &["storage"],
        &[
            ("STORAGE_BUCKET", "   "),
            ("STORAGE_ACCESS_KEY", "AKIAEXAMPLE"),
            ("STORAGE_SECRET_KEY", "secret"),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("Missing storage environment variables: STORAGE_BUCKET"));
}

#[test]
fn test_report_is_uncoloured_when_piped() {
    let output = run_linkverify(&["database"], &[]);
    assert!(!stdout_of(&output).contains('\u{1b}'));
}
