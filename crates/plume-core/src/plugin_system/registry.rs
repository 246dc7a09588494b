use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::plugin_system::candidates::{self, AvailabilityCache};
use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::host::{PluginHost, SystemHost};
use crate::plugin_system::live_table::LiveModuleTable;
use crate::plugin_system::loader::{ModuleLoader, PreloadedModules};
use crate::plugin_system::module::{ModuleHandle, ModuleIdentity, PluginModule};
use crate::plugin_system::traits::NativeLibrary;

/// Everything a registry is built from
#[derive(Clone)]
pub struct RegistryContext {
    pub config: RegistryConfig,
    pub host: Arc<dyn PluginHost>,
    /// Availability cache for built-in modules; `None` uses
    /// [`AvailabilityCache::global`].
    pub cache: Option<Arc<AvailabilityCache>>,
}

impl RegistryContext {
    pub fn new(config: RegistryConfig, host: Arc<dyn PluginHost>) -> Self {
        Self {
            config,
            host,
            cache: None,
        }
    }

    /// Builds the registry with its own availability cache.
    pub fn with_cache(mut self, cache: Arc<AvailabilityCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl Default for RegistryContext {
    fn default() -> Self {
        Self::new(RegistryConfig::default(), Arc::new(SystemHost::default()))
    }
}

/// Context the process-wide registry will be built from
static GLOBAL_CONTEXT: Mutex<Option<RegistryContext>> = Mutex::new(None);

/// The process-wide registry. Statics are never dropped, so neither is it.
static INSTANCE: OnceLock<PluginRegistry> = OnceLock::new();

/// Libraries loaded by [`PluginRegistry::preload_all`], mapped for the rest
/// of the process
static PRELOADED_LIBRARIES: Mutex<Vec<Box<dyn NativeLibrary>>> = Mutex::new(Vec::new());

/// Sets the context used to build the process-wide registry.
///
/// Must be called before the first [`PluginRegistry::get_instance`]. Fails if
/// the registry already exists or a context was already installed.
pub fn install_global_context(context: RegistryContext) -> Result<(), PluginSystemError> {
    if INSTANCE.get().is_some() {
        return Err(PluginSystemError::InternalError(
            "Plugin registry already created; context can no longer change".to_string(),
        ));
    }
    let mut slot = GLOBAL_CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(PluginSystemError::InternalError(
            "Plugin registry context already installed".to_string(),
        ));
    }
    *slot = Some(context);
    Ok(())
}

/// Registry of candidate modules and the modules currently live.
///
/// Owns the candidate list, the preloaded modules (their only strong owner)
/// and the table of live modules (weak, for lookup).
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
    preloaded: PreloadedModules,
    live_modules: Arc<LiveModuleTable>,
}

impl PluginRegistry {
    /// Computes the candidate list and loads every in-process candidate.
    pub fn new(context: RegistryContext) -> Self {
        let RegistryContext { config, host, cache } = context;
        let cache = match &cache {
            Some(cache) => cache.as_ref(),
            None => AvailabilityCache::global(),
        };
        let plugins = candidates::compute_candidate_list_with(&config, host.as_ref(), cache);
        let live_modules = Arc::new(LiveModuleTable::new());
        let preloaded = ModuleLoader::new(host.as_ref(), &live_modules).preload(&plugins);
        info!(
            "Plugin registry ready: {} candidate(s), {} preloaded",
            plugins.len(),
            preloaded.len()
        );
        Self {
            plugins,
            preloaded,
            live_modules,
        }
    }

    /// Returns the process-wide registry, creating it on first call.
    ///
    /// Built from the context set with [`install_global_context`], or from
    /// [`RegistryContext::default`]. First use must happen on the control
    /// thread; concurrent first calls are not supported.
    pub fn get_instance() -> &'static PluginRegistry {
        INSTANCE.get_or_init(|| {
            let context = GLOBAL_CONTEXT
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .unwrap_or_default();
            PluginRegistry::new(context)
        })
    }

    /// Computes the candidate list without building a registry.
    pub fn compute_candidate_list(config: &RegistryConfig, host: &dyn PluginHost) -> Vec<PluginDescriptor> {
        candidates::compute_candidate_list(config, host)
    }

    /// Maps every external in-process candidate's library into the process.
    ///
    /// Best effort: failures are logged and skipped. Loaded libraries stay
    /// mapped until the process exits; a path already mapped this way is not
    /// loaded again. Returns how many were newly loaded.
    pub fn preload_all(config: &RegistryConfig, host: &dyn PluginHost) -> usize {
        let mut libraries = PRELOADED_LIBRARIES.lock().unwrap_or_else(PoisonError::into_inner);
        let mut loaded = 0;
        for plugin in candidates::compute_candidate_list(config, host) {
            if plugin.is_internal() || plugin.is_out_of_process() {
                continue;
            }
            if libraries.iter().any(|library| library.path() == plugin.path.as_path()) {
                debug!("Plugin library {} already preloaded", plugin.path.display());
                continue;
            }
            match host.load_library(&plugin.path) {
                Ok(library) => {
                    libraries.push(library);
                    loaded += 1;
                }
                Err(e) => warn!("Unable to load plugin {}: {}", plugin.path.display(), e),
            }
        }
        loaded
    }

    /// All candidates, in candidate order
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    /// Descriptor of the first candidate whose path is `path`
    pub fn find_descriptor(&self, path: &Path) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.path == path)
    }

    /// Live module registered under `path`
    pub fn find_live_module(&self, path: &Path) -> Option<ModuleHandle> {
        self.live_modules.lookup(path)
    }

    /// Records a module instantiated outside the registry as live.
    ///
    /// # Panics
    ///
    /// If a live module is already registered under `path`.
    pub fn register_live_module(&self, path: &Path, module: &ModuleHandle) {
        self.live_modules.insert(path, module);
    }

    /// Forgets a terminated module. Safe to call from the module's teardown.
    ///
    /// # Panics
    ///
    /// If the module was never registered.
    pub fn notify_module_terminated(&self, dead_module: ModuleIdentity) {
        self.live_modules.remove_by_identity(dead_module);
    }

    /// Creates an uninitialized module whose termination is reported to this
    /// registry. Register it with [`register_live_module`](Self::register_live_module)
    /// before it can be dropped.
    pub fn new_module(&self, name: &str, path: &Path) -> ModuleHandle {
        let lifetime: Arc<LiveModuleTable> = Arc::clone(&self.live_modules);
        PluginModule::new(name, path, lifetime)
    }

    /// Modules the registry loaded at construction and owns, ordered by path
    pub fn preloaded_modules(&self) -> impl Iterator<Item = (&Path, &ModuleHandle)> {
        self.preloaded.iter().map(|(path, module)| (path.as_path(), module))
    }

    pub fn live_module_count(&self) -> usize {
        self.live_modules.len()
    }

    #[cfg(test)]
    pub(crate) fn live_module_table(&self) -> Arc<LiveModuleTable> {
        Arc::clone(&self.live_modules)
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        // Release the preloaded modules first, in path order; their teardown
        // removes them from the live table.
        self.preloaded.clear();

        if !std::thread::panicking() {
            assert!(
                self.live_modules.is_empty(),
                "Live modules outlived the plugin registry: {:?}",
                self.live_modules.paths()
            );
        }
    }
}
