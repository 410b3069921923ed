//! Malformed optional values abort after the environment check

use super::helpers::{run_linkverify, stdout_of};

#[test]
fn test_non_numeric_db_port_fails() {
    let output = run_linkverify(
        &["database"],
        &[
            ("DB_HOST", "127.0.0.1"),
            ("DB_PORT", "abc"),
            ("DB_DATABASE", "p2p"),
            ("DB_USERNAME", "p2p"),
            ("DB_PASSWORD", "secret"),
        ],
    );
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[OK]   All DB environment variables present."));
    assert!(stdout.contains("[FAIL] Invalid value for DB_PORT: 'abc'"));
    assert!(stdout.contains("FAIL  Database link: FAILED"));
}

#[test]
fn test_unknown_tls_flag_fails() {
    let output = run_linkverify(
        &["email"],
        &[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_FROM_EMAIL", "noreply@example.com"),
            ("SMTP_USE_TLS", "maybe"),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("[FAIL] Invalid value for SMTP_USE_TLS: 'maybe'"));
}

#[test]
fn test_presigned_expiry_out_of_range_fails() {
    let output = run_linkverify(
        &["storage"],
        &[
            ("STORAGE_BUCKET", "p2p-attachments"),
            ("STORAGE_ACCESS_KEY", "AKIAEXAMPLE"),
            ("STORAGE_SECRET_KEY", "secret"),
            ("STORAGE_PRESIGNED_URL_EXPIRY", "0"),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("[FAIL] Invalid value for STORAGE_PRESIGNED_URL_EXPIRY: '0'"));
}

#[test]
fn test_secret_never_printed() {
    let output = run_linkverify(
        &["database", "-vv"],
        &[
            ("DB_HOST", "127.0.0.1"),
            ("DB_PORT", "0"),
            ("DB_DATABASE", "p2p"),
            ("DB_USERNAME", "p2p"),
            ("DB_PASSWORD", "hunter2-do-not-print"),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout_of(&output).contains("hunter2-do-not-print"));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("hunter2-do-not-print"));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_value_is_reported_as_invalid() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::process::Command;

    let output = Command::new(env!("CARGO_BIN_EXE_linkverify"))
        .env_clear()
        .arg("storage")
        .env("STORAGE_BUCKET", "p2p-attachments")
        .env("STORAGE_ACCESS_KEY", "AKIAEXAMPLE")
        .env("STORAGE_SECRET_KEY", OsStr::from_bytes(b"se\xffcret"))
        .output()
        .expect("Failed to run linkverify");
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[FAIL] Invalid value for STORAGE_SECRET_KEY: not valid UTF-8"));
    assert!(!stdout.contains("Missing storage environment variables"));
}
