//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::BASE_URL_ENV;

/// Trip Planner - build and optimize an itinerary with a planning backend
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Build, reorder and optimize a trip itinerary against a planning backend",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to the shell)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive planning shell
    Shell,

    /// Inspect or drop the persisted session id
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Resolve an address to coordinates
    Geocode {
        /// Address to look up
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
    },
}

/// Session id subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Print the stored session id
    Show,

    /// Delete the stored session id so the next chat starts fresh
    Forget,
}

/// Log file written by `tp`
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log")
}

/// Trailer for `--help` with file locations
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();
    help.push_str("Files:\n");
    help.push_str(&format!("  Logs:    {}\n", get_log_path().display()));
    help.push_str(&format!(
        "  Session: {}\n",
        crate::session::default_session_path().display()
    ));
    help.push('\n');
    help.push_str("Environment:\n");
    help.push_str(&format!("  {}  overrides backend.base-url\n", BASE_URL_ENV));
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_geocode_joins_words() {
        let cli = Cli::try_parse_from(["tp", "geocode", "Shaniwar", "Wada,", "Pune"]).unwrap();
        match cli.command {
            Some(Command::Geocode { address }) => assert_eq!(address.join(" "), "Shaniwar Wada, Pune"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tp", "session", "show", "--log-level", "debug", "-c", "tp.yml"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("tp.yml")));
        assert!(matches!(
            cli.command,
            Some(Command::Session {
                command: SessionCommand::Show
            })
        ));
    }

    #[test]
    fn test_after_help_mentions_env() {
        assert!(generate_after_help().contains(BASE_URL_ENV));
    }
}
