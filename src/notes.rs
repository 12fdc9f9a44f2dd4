use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::StorageConfig;
use crate::error::ToolError;

/// Append-only plain-text note log, one note per line.
pub struct NoteStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl NoteStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self::at(storage.notes_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create an empty log if none exists yet. Idempotent.
    pub fn ensure_exists(&self) -> Result<(), ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()
    }

    fn ensure_exists_locked(&self) -> Result<(), ToolError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ToolError::storage(parent, e))?;
        }
        fs::write(&self.path, "").map_err(|e| ToolError::storage(&self.path, e))?;
        log::debug!("NoteStore: created {}", self.path.display());
        Ok(())
    }

    /// Append `message` as-is, followed by a newline.
    pub fn add(&self, message: &str) -> Result<(), ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| ToolError::storage(&self.path, e))?;
        writeln!(file, "{}", message).map_err(|e| ToolError::storage(&self.path, e))?;
        Ok(())
    }

    /// Full trimmed contents of the log; `None` when there are no notes.
    pub fn read_all(&self) -> Result<Option<String>, ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()?;

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ToolError::storage(&self.path, e))?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}
