//! Durable storage for session state: one JSON document per install.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::session::SessionState;

/// Handle on the persisted state file. Missing files are not an error: the
/// console boots with a default (unauthenticated) state and writes on the
/// first mutation.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rehydrate state from disk. A corrupt file is logged and replaced with
    /// the default state rather than failing boot.
    pub fn load(&self) -> SessionState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return SessionState::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read state file: {}", e);
                return SessionState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "discarding corrupt state file: {}", e);
                SessionState::default()
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
