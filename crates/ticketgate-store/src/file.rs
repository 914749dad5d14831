//! JSON file implementation of `Store`.
//!
//! The whole directory is one JSON document. Every committed write replaces
//! the file atomically: the new document goes to a sibling temp file which is
//! then renamed over the old file. The in-memory copy is swapped only after
//! the rename succeeds, so memory and disk never disagree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use ticketgate_contracts::error::{GateError, GateResult};
use ticketgate_core::{directory::Directory, traits::Store};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<Directory>,
}

impl JsonFileStore {
    /// Load the directory at `path`, or create an empty one there if the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> GateResult<Self> {
        let path = path.into();
        let dir = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| storage(&path, "read", e))?;
            let dir: Directory = serde_json::from_slice(&bytes).map_err(|e| GateError::Storage {
                reason: format!("failed to parse '{}': {}", path.display(), e),
            })?;
            debug!(path = %path.display(), "directory loaded");
            dir
        } else {
            let dir = Directory::new();
            persist(&path, &dir)?;
            info!(path = %path.display(), "empty directory created");
            dir
        };
        Ok(Self {
            path,
            state: Mutex::new(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> GateResult<MutexGuard<'_, Directory>> {
        self.state.lock().map_err(|e| GateError::Storage {
            reason: format!("directory lock poisoned: {}", e),
        })
    }
}

impl Store for JsonFileStore {
    fn read<R>(&self, f: impl FnOnce(&Directory) -> R) -> GateResult<R> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Directory) -> GateResult<R>) -> GateResult<R> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        persist(&self.path, &staged)?;
        *guard = staged;
        Ok(out)
    }
}

/// Write `dir` to `path` via a temp file and rename.
fn persist(path: &Path, dir: &Directory) -> GateResult<()> {
    let json = serde_json::to_vec_pretty(dir).map_err(|e| GateError::Storage {
        reason: format!("failed to serialize directory: {}", e),
    })?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| storage(&tmp, "write", e))?;
    fs::rename(&tmp, path).map_err(|e| storage(path, "replace", e))?;
    debug!(path = %path.display(), "directory persisted");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn storage(path: &Path, op: &str, e: std::io::Error) -> GateError {
    GateError::Storage {
        reason: format!("failed to {} '{}': {}", op, path.display(), e),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
