//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// timetable - check calendar feed credentials
#[derive(Debug, Parser)]
#[command(name = "timetable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TIMETABLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check credentials against the calendar server
    Auth(AuthArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `timetable auth`.
#[derive(Debug, Clone, Default, Args)]
pub struct AuthArgs {
    /// Username (overrides the configured account)
    #[arg(long, short, env = "TIMETABLE_USERNAME")]
    pub username: Option<String>,

    /// Password (overrides the configured account; accepts `env::` and `pass::`)
    #[arg(long, short, env = "TIMETABLE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Server base URL (overrides calendar.server)
    #[arg(long)]
    pub server: Option<String>,

    /// Calendar name (overrides calendar.name)
    #[arg(long)]
    pub calendar: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_auth_with_overrides() {
        let cli = Cli::try_parse_from([
            "timetable",
            "auth",
            "--username",
            "alice",
            "--password",
            "env::PW",
            "--calendar",
            "Work",
            "--json",
        ])
        .unwrap();

        let Command::Auth(args) = cli.command else {
            panic!("expected auth command");
        };
        assert_eq!(args.username.as_deref(), Some("alice"));
        assert_eq!(args.password.as_deref(), Some("env::PW"));
        assert_eq!(args.calendar.as_deref(), Some("Work"));
        assert!(args.server.is_none());
        assert!(args.json);
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["timetable", "-v", "--config", "/tmp/t.toml", "config", "path"])
            .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["timetable"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
