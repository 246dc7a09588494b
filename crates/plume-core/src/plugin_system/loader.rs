use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use log::{debug, error, info};

use crate::kernel::constants::{GET_INTERFACE_SYMBOL, INITIALIZE_MODULE_SYMBOL, SHUTDOWN_MODULE_SYMBOL};
use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::host::PluginHost;
use crate::plugin_system::live_table::LiveModuleTable;
use crate::plugin_system::module::{ModuleHandle, PluginModule};
use crate::plugin_system::traits::{
    EntryPoints, GetInterfaceFn, InitializeModuleFn, NativeLibrary, ShutdownModuleFn,
};

/// Strongly-owned modules keyed by identity path, released in path order
pub type PreloadedModules = BTreeMap<PathBuf, ModuleHandle>;

// --- Dynamic libraries ---

/// A dynamic library opened with `libloading`
pub struct DynamicLibrary {
    path: PathBuf,
    library: Library,
}

impl DynamicLibrary {
    /// Maps the library at `path` into the process.
    pub fn open(path: &Path) -> Result<Self, PluginSystemError> {
        let library = unsafe { Library::new(path) }.map_err(|e| PluginSystemError::loading(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            library,
        })
    }

    /// Resolves an exported function pointer.
    ///
    /// # Safety
    /// `T` must match the actual type of the exported symbol.
    unsafe fn function<T: Copy>(&self, symbol: &[u8]) -> Result<T, PluginSystemError> {
        let symbol_name = String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol)).into_owned();
        let resolved: Symbol<T> = unsafe { self.library.get(symbol) }.map_err(|e| {
            PluginSystemError::loading(&self.path, format!("missing symbol {}: {}", symbol_name, e))
        })?;
        Ok(*resolved)
    }
}

impl fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLibrary").field("path", &self.path).finish()
    }
}

impl NativeLibrary for DynamicLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry_points(&self) -> Result<EntryPoints, PluginSystemError> {
        // The function pointers stay valid for as long as `self` keeps the
        // library mapped.
        unsafe {
            Ok(EntryPoints {
                get_interface: self.function::<GetInterfaceFn>(GET_INTERFACE_SYMBOL)?,
                initialize_module: self.function::<InitializeModuleFn>(INITIALIZE_MODULE_SYMBOL)?,
                shutdown_module: self.function::<ShutdownModuleFn>(SHUTDOWN_MODULE_SYMBOL)?,
            })
        }
    }
}

// --- Module loading ---

/// Instantiates the in-process candidates and records them as live.
pub struct ModuleLoader<'a> {
    host: &'a dyn PluginHost,
    live_modules: &'a Arc<LiveModuleTable>,
}

impl<'a> ModuleLoader<'a> {
    pub fn new(host: &'a dyn PluginHost, live_modules: &'a Arc<LiveModuleTable>) -> Self {
        Self { host, live_modules }
    }

    /// Loads one candidate.
    ///
    /// The module is registered as live before it is initialized. If
    /// initialization fails the handle is dropped here and its teardown
    /// removes that registration again.
    ///
    /// # Panics
    ///
    /// If a live module is already registered under the candidate's path.
    pub fn load(&self, descriptor: &PluginDescriptor) -> Option<ModuleHandle> {
        if descriptor.is_out_of_process() {
            debug!("Skipping out-of-process module '{}'", descriptor.path.display());
            return None;
        }

        let lifetime: Arc<LiveModuleTable> = Arc::clone(self.live_modules);
        let module = PluginModule::new(&descriptor.name, descriptor.path.clone(), lifetime);
        self.live_modules.insert(&descriptor.path, &module);

        let result = match descriptor.entry_points() {
            Some(entry_points) => module.init_as_internal(entry_points, self.host),
            None => module.init_as_library(self.host),
        };

        match result {
            Ok(()) => Some(module),
            Err(e) => {
                error!("Failed to load module '{}': {}", descriptor.path.display(), e);
                None
            }
        }
    }

    /// Loads every in-process candidate, keeping the ones that initialize.
    pub fn preload(&self, candidates: &[PluginDescriptor]) -> PreloadedModules {
        let mut preloaded = PreloadedModules::new();
        for descriptor in candidates {
            if let Some(module) = self.load(descriptor) {
                preloaded.insert(descriptor.path.clone(), module);
            }
        }
        info!("Preloaded {} of {} candidate module(s)", preloaded.len(), candidates.len());
        preloaded
    }
}
