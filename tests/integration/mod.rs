//! Integration tests for the linkverify binary
//!
//! Every test runs the compiled binary with a cleared environment, so only
//! failures that happen before any network access are exercised here.

pub mod cli;
pub mod helpers;
pub mod invalid_config;
pub mod missing_env;
