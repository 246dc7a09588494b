//! Non-owning index of live modules by identity path.
//!
//! The table holds `Weak` references only. Entries are added explicitly and
//! removed when the module reports its own termination, which happens from
//! inside the module's `Drop`. Removal therefore compares addresses and never
//! upgrades or dereferences the reference it is removing.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, error};

use crate::plugin_system::module::{ModuleHandle, ModuleIdentity, PluginModule};
use crate::plugin_system::traits::ModuleLifetime;

#[derive(Debug, Default)]
pub struct LiveModuleTable {
    modules: Mutex<HashMap<PathBuf, Weak<PluginModule>>>,
}

impl LiveModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Weak<PluginModule>>> {
        self.modules.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `module` under `path`.
    ///
    /// # Panics
    ///
    /// If `path` is already registered. Two live modules cannot share one
    /// identity.
    pub fn insert(&self, path: &Path, module: &ModuleHandle) {
        let mut entries = self.entries();
        if entries.contains_key(path) {
            drop(entries);
            panic!("Live module already registered for path '{}'", path.display());
        }
        entries.insert(path.to_path_buf(), Arc::downgrade(module));
        debug!("Registered live module '{}'", path.display());
    }

    /// Returns the live module registered under `path`.
    ///
    /// `None` when nothing is registered or the module is already being torn
    /// down.
    pub fn lookup(&self, path: &Path) -> Option<ModuleHandle> {
        self.entries().get(path).and_then(Weak::upgrade)
    }

    /// Removes the entry that refers to `dead_module`.
    ///
    /// # Panics
    ///
    /// If no entry refers to it, unless the thread is already unwinding.
    /// Every registered module is removed exactly once.
    pub fn remove_by_identity(&self, dead_module: ModuleIdentity) {
        let mut entries = self.entries();
        // Modules are few and rarely destroyed; a linear scan is enough.
        let found = entries
            .iter()
            .find(|(_, module)| ModuleIdentity::of_weak(module) == dead_module)
            .map(|(path, _)| path.clone());
        match found {
            Some(path) => {
                let removed = entries.remove(&path);
                drop(entries);
                drop(removed);
                debug!("Removed live module '{}'", path.display());
            }
            None => {
                drop(entries);
                // A module dropped while unwinding from a failed `insert` was
                // never registered; a second panic here would abort.
                if std::thread::panicking() {
                    error!("Terminated module {:?} was never registered as live", dead_module);
                    return;
                }
                panic!("Terminated module {:?} was never registered as live", dead_module);
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl ModuleLifetime for LiveModuleTable {
    fn module_dead(&self, dead_module: ModuleIdentity) {
        self.remove_by_identity(dead_module);
    }
}
