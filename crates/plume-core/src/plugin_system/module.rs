use std::ffi::{CString, c_void};
use std::fmt;
use std::panic;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use log::{debug, warn};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::host::PluginHost;
use crate::plugin_system::traits::{
    EntryPoints, HostGetInterfaceFn, ModuleId, ModuleLifetime, NativeLibrary, MODULE_OK,
};

/// Reference-counted handle to a live module
pub type ModuleHandle = Arc<PluginModule>;

/// Address-based identity of a [`PluginModule`].
///
/// Comparable without touching the module, so it can be used while the
/// module is being destroyed. The address cannot be reused while a `Weak`
/// to the module is still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleIdentity(usize);

impl ModuleIdentity {
    pub fn of(module: &PluginModule) -> Self {
        Self(module as *const PluginModule as usize)
    }

    pub fn of_weak(module: &Weak<PluginModule>) -> Self {
        Self(Weak::as_ptr(module) as usize)
    }
}

static NEXT_MODULE_ID: AtomicI32 = AtomicI32::new(1);

/// Renders a panic payload the way the loader reports it.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

/// Entry points of an initialized module, with the library that backs them
#[derive(Debug)]
struct LoadedModule {
    entry_points: EntryPoints,
    // Keeps `entry_points` mapped.
    library: Option<Box<dyn NativeLibrary>>,
}

/// A module instance.
///
/// Created uninitialized, then initialized exactly once either from
/// compiled-in entry points or from a dynamic library. On drop it shuts the
/// module down, unloads the library and notifies its lifetime delegate.
pub struct PluginModule {
    name: String,
    path: PathBuf,
    module_id: ModuleId,
    loaded: OnceLock<LoadedModule>,
    lifetime: Arc<dyn ModuleLifetime>,
}

impl PluginModule {
    /// Creates an uninitialized module whose termination is reported to `lifetime`.
    pub fn new(name: &str, path: impl Into<PathBuf>, lifetime: Arc<dyn ModuleLifetime>) -> ModuleHandle {
        Arc::new(Self {
            name: name.to_string(),
            path: path.into(),
            module_id: NEXT_MODULE_ID.fetch_add(1, Ordering::SeqCst),
            loaded: OnceLock::new(),
            lifetime,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    pub fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::of(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn plugin_id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Initializes the module from compiled-in entry points.
    pub fn init_as_internal(&self, entry_points: EntryPoints, host: &dyn PluginHost) -> Result<(), PluginSystemError> {
        self.initialize(entry_points, None, host.interface_getter())
    }

    /// Loads the library at the module's path and initializes it.
    pub fn init_as_library(&self, host: &dyn PluginHost) -> Result<(), PluginSystemError> {
        self.ensure_uninitialized()?;
        let library = host.load_library(&self.path)?;
        let entry_points = library.entry_points()?;
        self.initialize(entry_points, Some(library), host.interface_getter())
    }

    fn ensure_uninitialized(&self) -> Result<(), PluginSystemError> {
        if self.is_initialized() {
            return Err(PluginSystemError::InitializationError {
                plugin_id: self.plugin_id(),
                message: "Module is already initialized".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    fn initialize(
        &self,
        entry_points: EntryPoints,
        library: Option<Box<dyn NativeLibrary>>,
        host_get_interface: HostGetInterfaceFn,
    ) -> Result<(), PluginSystemError> {
        self.ensure_uninitialized()?;

        let initialize_module = entry_points.initialize_module;
        let module_id = self.module_id;
        let result = panic::catch_unwind(move || unsafe { initialize_module(module_id, host_get_interface) });
        match result {
            Ok(MODULE_OK) => {}
            Ok(code) => {
                return Err(PluginSystemError::InitializationError {
                    plugin_id: self.plugin_id(),
                    message: format!("initialize_module returned {}", code),
                    source: None,
                });
            }
            Err(payload) => {
                return Err(PluginSystemError::FfiError {
                    plugin_id: self.plugin_id(),
                    operation: "initialize_module".to_string(),
                    message: format!("panic: {}", panic_message(payload)),
                });
            }
        }

        self.loaded
            .set(LoadedModule { entry_points, library })
            .map_err(|_| PluginSystemError::InternalError(format!(
                "Module '{}' was initialized concurrently",
                self.plugin_id()
            )))?;
        debug!("Initialized module '{}' (id {})", self.name, self.module_id);
        Ok(())
    }

    /// Resolves an interface exported by the module.
    ///
    /// `None` when the module is not initialized, the name contains a NUL
    /// byte, or the module does not provide the interface.
    pub fn get_plugin_interface(&self, interface_name: &str) -> Option<NonNull<c_void>> {
        let loaded = self.loaded.get()?;
        let name = CString::new(interface_name).ok()?;
        let get_interface = loaded.entry_points.get_interface;
        let name_ptr = name.as_ptr();
        let result = panic::catch_unwind(move || unsafe { get_interface(name_ptr) });
        match result {
            Ok(ptr) => NonNull::new(ptr as *mut c_void),
            Err(payload) => {
                warn!(
                    "Module '{}' panicked resolving interface '{}': {}",
                    self.name,
                    interface_name,
                    panic_message(payload)
                );
                None
            }
        }
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("module_id", &self.module_id)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Drop for PluginModule {
    fn drop(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            let shutdown_module = loaded.entry_points.shutdown_module;
            if let Err(payload) = panic::catch_unwind(move || unsafe { shutdown_module() }) {
                warn!("Module '{}' panicked during shutdown: {}", self.name, panic_message(payload));
            }
            drop(loaded);
        }
        // Only the identity leaves this object from here on.
        self.lifetime.module_dead(ModuleIdentity::of(self));
    }
}
