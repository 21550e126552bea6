//! Trip Planner - interactive itinerary client
//!
//! CLI entry point for the planning shell and session utilities.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use tripplanner::cli::{Cli, Command, SessionCommand, generate_after_help};
use tripplanner::config::Config;
use tripplanner::session::SessionIdFile;
use tripplanner::{PlacesBackend, create_backend, repl};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("tripplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Trip Planner loaded config: backend={}", config.backend.base_url);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Shell) => repl::run_interactive(&config).await,
        Some(Command::Session { command }) => cmd_session(&config, command),
        Some(Command::Geocode { address }) => cmd_geocode(&config, &address.join(" ")).await,
    }
}

fn cmd_session(config: &Config, command: SessionCommand) -> Result<()> {
    debug!(?command, "cmd_session: called");
    let file = SessionIdFile::new(config.session.id_file.clone());
    match command {
        SessionCommand::Show => match file.load()? {
            Some(id) => println!("{}", id),
            None => println!("{}", "No session".dimmed()),
        },
        SessionCommand::Forget => {
            file.forget()?;
            println!("Session forgotten ({})", file.path().display());
        }
    }
    Ok(())
}

async fn cmd_geocode(config: &Config, address: &str) -> Result<()> {
    debug!(%address, "cmd_geocode: called");
    let backend = create_backend(&config.backend).context("Failed to create backend client")?;
    let point = backend
        .geocode(address)
        .await
        .map_err(|e| eyre::eyre!("Geocoding failed: {}", e))?;
    println!("{}, {}", point.latitude, point.longitude);
    Ok(())
}
