//! Persisted backend session identifier
//!
//! A single id string kept in a plain text file so a later run rejoins the
//! same backend session.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

/// Default location: `<data_local_dir>/tripplanner/session_id`
pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("session_id")
}

/// File holding the session id
#[derive(Debug, Clone)]
pub struct SessionIdFile {
    path: PathBuf,
}

impl SessionIdFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored id, or `None` when no session has been started yet
    pub fn load(&self) -> Result<Option<String>> {
        debug!(path = %self.path.display(), "load: called");
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session id from {}", self.path.display()))?;
        let id = content.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    pub fn save(&self, id: &str) -> Result<()> {
        debug!(path = %self.path.display(), %id, "save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        fs::write(&self.path, id).with_context(|| format!("Failed to write session id to {}", self.path.display()))?;
        info!(%id, "Session initialized");
        Ok(())
    }

    /// Remove the stored id; a missing file is not an error
    pub fn forget(&self) -> Result<()> {
        debug!(path = %self.path.display(), "forget: called");
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to remove session id file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_is_none() {
        let temp = tempdir().unwrap();
        let file = SessionIdFile::new(temp.path().join("session_id"));
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_forget() {
        let temp = tempdir().unwrap();
        let file = SessionIdFile::new(temp.path().join("nested").join("session_id"));

        file.save("abc-123").unwrap();
        assert_eq!(file.load().unwrap(), Some("abc-123".to_string()));

        file.forget().unwrap();
        assert_eq!(file.load().unwrap(), None);
        file.forget().unwrap();
    }

    #[test]
    fn test_blank_file_is_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("session_id");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(SessionIdFile::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_default_path_ends_with_session_id() {
        assert!(default_session_path().ends_with("tripplanner/session_id"));
    }
}
