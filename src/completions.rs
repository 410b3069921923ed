use clap::{Command, ValueEnum};
use clap_complete::{generate, shells};
use std::io::Write;

/// Shells a completion script can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

/// Write the completion script for `shell` to `out`.
///
/// ```no_run
/// use clap::Command;
/// use linkverify::completions::{generate_completions, Shell};
///
/// let mut cmd = Command::new("linkverify");
/// generate_completions(&mut cmd, Shell::Bash, &mut std::io::stdout());
/// ```
pub fn generate_completions(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, cmd, bin_name, out),
        Shell::Zsh => generate(shells::Zsh, cmd, bin_name, out),
        Shell::Fish => generate(shells::Fish, cmd, bin_name, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Arg;

    fn sample_command() -> Command {
        Command::new("linkverify")
            .subcommand(Command::new("database").alias("db"))
            .subcommand(Command::new("email").arg(Arg::new("to").long("to")))
            .subcommand(Command::new("storage"))
    }

    #[test]
    fn test_shell_parses_case_insensitively() {
        assert_eq!(Shell::from_str("bash", true).unwrap(), Shell::Bash);
        assert_eq!(Shell::from_str("ZSH", true).unwrap(), Shell::Zsh);
        assert_eq!(Shell::from_str("Fish", true).unwrap(), Shell::Fish);
    }

    #[test]
    fn test_unsupported_shell_is_rejected() {
        assert!(Shell::from_str("powershell", true).is_err());
        let names: Vec<String> = Shell::value_variants()
            .iter()
            .filter_map(|s| s.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["bash", "zsh", "fish"]);
    }

    #[test]
    fn test_generated_script_mentions_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut out = Vec::new();
            generate_completions(&mut sample_command(), shell, &mut out);
            let script = String::from_utf8(out).unwrap();
            assert!(script.contains("storage"), "{shell:?} script lacks subcommands");
            assert!(script.contains("linkverify"));
        }
    }
}
