use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use linkverify::commands::{self, database, email, storage};
use linkverify::completions::{generate_completions, Shell};
use linkverify::logging::init_tracing;
use linkverify::validation::clap_email_validator;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "linkverify")]
#[command(about = "Verify connectivity to the P2P system's database, SMTP and object storage", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase diagnostic logging on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the MySQL database link (connection, charset, DECIMAL precision, tables)
    #[command(visible_alias = "db")]
    Database,

    /// Verify the SMTP link by authenticating and sending one test email
    Email {
        /// Recipient of the test email (defaults to SMTP_FROM_EMAIL)
        #[arg(long, value_parser = clap_email_validator)]
        to: Option<String>,
    },

    /// Verify the object storage link with an upload, presigned fetch and delete
    Storage,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum, ignore_case = true)]
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_color = !cli.no_color && io::stderr().is_terminal();
    init_tracing(cli.verbose, log_color)?;

    let color = commands::stdout_color(cli.no_color);

    match cli.command {
        Commands::Database => database::execute(color),
        Commands::Email { to } => email::execute(to, color),
        Commands::Storage => storage::execute(color),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate_completions(&mut cmd, shell, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_db_alias_and_verbosity() {
        let cli = Cli::try_parse_from(["linkverify", "-vv", "db"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Database));
    }

    #[test]
    fn test_email_recipient_is_validated() {
        let cli = Cli::try_parse_from(["linkverify", "email", "--to", "ops@example.com"]).unwrap();
        match cli.command {
            Commands::Email { to } => assert_eq!(to.as_deref(), Some("ops@example.com")),
            _ => panic!("expected email subcommand"),
        }
        assert!(Cli::try_parse_from(["linkverify", "email", "--to", "nope"]).is_err());
    }

    #[test]
    fn test_completions_shell_is_validated_by_clap() {
        let cli = Cli::try_parse_from(["linkverify", "completions", "Zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));

        let err = Cli::try_parse_from(["linkverify", "completions", "powershell"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_no_color_is_global() {
        let cli = Cli::try_parse_from(["linkverify", "storage", "--no-color"]).unwrap();
        assert!(cli.no_color);
    }
}
