//! JSON file storage adapter for the task graph
//!
//! The whole graph lives in one JSON document. Each write first copies the
//! previous document to a `.bak` sibling so `recover` can roll back one save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use firstthings_core::{Persistence, TaskStore};
use tracing::{debug, info};

use crate::error::{CliError, Result};

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    /// Copy the current document aside. Nothing to do before the first save.
    pub fn backup(&self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        fs::copy(&self.path, self.backup_path())?;
        debug!(path = %self.backup_path().display(), "backup written");
        Ok(())
    }

    pub fn backup_exists(&self) -> bool {
        self.backup_path().exists()
    }

    /// Parse the backup strictly; a corrupt backup is an error, not an empty graph
    pub fn recover(&self) -> Result<TaskStore> {
        let backup_path = self.backup_path();
        if !backup_path.exists() {
            return Err(CliError::storage("Backup file not found"));
        }

        let blob = fs::read_to_string(&backup_path)
            .map_err(|e| CliError::io(format!("reading {}", backup_path.display()), e))?;
        Ok(TaskStore::from_blob(&blob)?)
    }
}

impl Persistence for JsonFileStorage {
    fn read_blob(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_blob(&mut self, blob: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        self.backup()?;
        fs::write(&self.path, blob)?;
        info!(path = %self.path.display(), bytes = blob.len(), "data saved");
        Ok(())
    }
}
