//! In-memory implementation of `Store`.
//!
//! `MemoryStore` keeps the directory behind an `Arc<Mutex<_>>`. Clones share
//! the same directory, so a scenario can hand one clone to the desk and keep
//! another to inspect the state afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use ticketgate_contracts::error::{GateError, GateResult};
use ticketgate_core::{directory::Directory, traits::Store};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<Directory>>,
}

impl MemoryStore {
    /// A store holding `dir`.
    pub fn new(dir: Directory) -> Self {
        Self {
            state: Arc::new(Mutex::new(dir)),
        }
    }

    /// A copy of the current directory.
    pub fn snapshot(&self) -> GateResult<Directory> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> GateResult<MutexGuard<'_, Directory>> {
        self.state.lock().map_err(|e| GateError::Storage {
            reason: format!("directory lock poisoned: {}", e),
        })
    }
}

impl Store for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&Directory) -> R) -> GateResult<R> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    /// Stage on a clone, commit only on `Ok`.
    fn write<R>(&self, f: impl FnOnce(&mut Directory) -> GateResult<R>) -> GateResult<R> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        match f(&mut staged) {
            Ok(out) => {
                *guard = staged;
                Ok(out)
            }
            Err(e) => {
                debug!(error = %e, "write rolled back");
                Err(e)
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
