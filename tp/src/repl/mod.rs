//! Interactive shell for the trip planner
//!
//! Chat messages and slash commands become planner intents; every change is
//! rendered from a fresh store snapshot.

mod commands;
mod render;
mod shell;

pub use commands::{Command, parse};
pub use shell::ReplSession;

use eyre::{Context, Result};
use tracing::info;

use crate::backend::create_backend;
use crate::config::Config;
use crate::planner::Planner;
use crate::session::SessionIdFile;
use crate::state::SessionStore;

/// Build a planner from config, resuming the persisted session if any
pub fn build_planner(config: &Config) -> Result<Planner> {
    let backend = create_backend(&config.backend).context("Failed to create backend client")?;
    let id_file = SessionIdFile::new(config.session.id_file.clone());
    let session_id = id_file.load()?;
    if let Some(id) = &session_id {
        info!(%id, "Resuming session");
    }

    Ok(Planner::new(SessionStore::spawn(), backend)
        .with_session_id(session_id)
        .with_session_file(id_file))
}

/// Run the interactive shell
///
/// This is the main entry point for `tp shell`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let planner = build_planner(config)?;
    let mut session = ReplSession::new(planner, config.planner.clone());
    session.run().await
}
