//! File-backed session store.
//!
//! One pretty-printed JSON document per working directory, human-inspectable
//! while a run is in flight. Writes are atomic: the record is written to a
//! temporary sibling and renamed over the published path, so a reader (or a
//! crash) never observes a half-written session.
//!
//! On load the record must deserialize and satisfy the session invariants;
//! anything else is `SessionCorrupt` and resume is refused until the
//! operator resets explicitly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::Session;
use crate::domain::ports::SessionStore;

/// Session store persisting to a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store over the given session path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The published session path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> OrchestratorResult<Session> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(OrchestratorError::SessionNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        let session: Session = serde_json::from_str(&raw).map_err(|e| {
            OrchestratorError::session_corrupt(format!("{}: {e}", self.path.display()))
        })?;

        session.check_invariants().map_err(|reason| {
            OrchestratorError::session_corrupt(format!("{}: {reason}", self.path.display()))
        })?;

        Ok(session)
    }

    async fn save(&self, session: &Session) -> OrchestratorResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session)?;

        // Write-then-publish: the published path only ever holds a fully
        // written record.
        let staging = self.staging_path();
        fs::write(&staging, json).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), attempts = session.attempts.len(), "session persisted");
        Ok(())
    }

    async fn exists(&self) -> OrchestratorResult<bool> {
        Ok(fs::try_exists(&self.path).await?)
    }

    async fn delete(&self) -> OrchestratorResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
