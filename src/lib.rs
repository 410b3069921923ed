pub mod check;
pub mod commands;
pub mod completions;
pub mod config;
pub mod error;
pub mod logging;
pub mod probes;
pub mod profiles;
pub mod validation;
