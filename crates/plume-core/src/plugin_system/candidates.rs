//! Builds the ordered list of candidate modules.
//!
//! Order: built-in modules found on disk, feature-gated internal modules, the
//! extra runtime module, then the general plugin list. Nothing is
//! deduplicated here.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use log::debug;

use crate::config::RegistryConfig;
use crate::kernel::constants::{
    DOCUMENT_VIEWER_DESCRIPTION, DOCUMENT_VIEWER_EXTENSION, DOCUMENT_VIEWER_MIME_TYPE,
    DOCUMENT_VIEWER_NAME, LOOPBACK_FEATURE, NATIVE_CLIENT_DESCRIPTION, NATIVE_CLIENT_EXTENSION,
    NATIVE_CLIENT_MIME_TYPE, NATIVE_CLIENT_NAME,
};
use crate::plugin_system::descriptor::{MimeEntry, PluginDescriptor};
use crate::plugin_system::host::{BuiltinModule, PluginHost};
use crate::plugin_system::internal::loopback_descriptor;
use crate::plugin_system::parser::{parse_extra_module, parse_plugin_list};

/// Remembers built-in module files already confirmed present.
///
/// Confirmation is per module and path: once a file has been seen its check
/// is skipped for the lifetime of the cache, so later computations still list
/// it when the filesystem can no longer be probed. A different path for the
/// same module, and any absent file, is checked every time.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    confirmed: Mutex<HashSet<(BuiltinModule, PathBuf)>>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache
    pub fn global() -> &'static AvailabilityCache {
        static GLOBAL: OnceLock<AvailabilityCache> = OnceLock::new();
        GLOBAL.get_or_init(AvailabilityCache::new)
    }

    pub fn is_confirmed(&self, module: BuiltinModule, path: &Path) -> bool {
        self.confirmed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(module, path.to_path_buf()))
    }

    fn confirm(&self, module: BuiltinModule, path: &Path) {
        self.confirmed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((module, path.to_path_buf()));
    }
}

fn builtin_descriptor(module: BuiltinModule, path: PathBuf) -> PluginDescriptor {
    let (name, mime_entry) = match module {
        BuiltinModule::DocumentViewer => (
            DOCUMENT_VIEWER_NAME,
            MimeEntry::new(DOCUMENT_VIEWER_MIME_TYPE, DOCUMENT_VIEWER_EXTENSION, DOCUMENT_VIEWER_DESCRIPTION),
        ),
        BuiltinModule::NativeClient => (
            NATIVE_CLIENT_NAME,
            MimeEntry::new(NATIVE_CLIENT_MIME_TYPE, NATIVE_CLIENT_EXTENSION, NATIVE_CLIENT_DESCRIPTION),
        ),
    };
    PluginDescriptor::new(path).with_name(name).with_mime_entry(mime_entry)
}

/// Appends the built-in and compiled-in candidates.
pub fn compute_builtin_candidates(
    host: &dyn PluginHost,
    cache: &AvailabilityCache,
    candidates: &mut Vec<PluginDescriptor>,
) {
    for module in BuiltinModule::ALL {
        let Some(path) = host.builtin_module_path(module) else {
            debug!("No path known for built-in module {}", module);
            continue;
        };
        if cache.is_confirmed(module, &path) || host.path_exists(&path) {
            cache.confirm(module, &path);
            candidates.push(builtin_descriptor(module, path));
        } else {
            debug!("Built-in module {} not found at {}", module, path.display());
        }
    }

    if host.is_feature_enabled(LOOPBACK_FEATURE) {
        candidates.push(loopback_descriptor());
    }
}

/// Appends the extra runtime module and the general plugin list.
pub fn compute_configured_candidates(config: &RegistryConfig, candidates: &mut Vec<PluginDescriptor>) {
    if let Some(extra) = parse_extra_module(
        &config.extra_module_path,
        &config.extra_module_version,
        config.out_of_process,
    ) {
        candidates.push(extra);
    }
    candidates.extend(parse_plugin_list(&config.register_plugins, config.out_of_process));
}

/// Computes the full candidate list with the process-wide availability cache.
pub fn compute_candidate_list(config: &RegistryConfig, host: &dyn PluginHost) -> Vec<PluginDescriptor> {
    compute_candidate_list_with(config, host, AvailabilityCache::global())
}

/// Computes the full candidate list with an explicit availability cache.
pub fn compute_candidate_list_with(
    config: &RegistryConfig,
    host: &dyn PluginHost,
    cache: &AvailabilityCache,
) -> Vec<PluginDescriptor> {
    let mut candidates = Vec::new();
    compute_builtin_candidates(host, cache, &mut candidates);
    compute_configured_candidates(config, &mut candidates);
    candidates
}
