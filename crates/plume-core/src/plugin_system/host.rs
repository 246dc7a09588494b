//! The host collaborator: everything the registry needs from the process it
//! runs in, behind one trait.
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::HostConfig;
use crate::kernel::constants::{DOCUMENT_VIEWER_LIBRARY, NATIVE_CLIENT_LIBRARY};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::DynamicLibrary;
use crate::plugin_system::traits::{no_host_interfaces, HostGetInterfaceFn, NativeLibrary};

/// Modules distributed alongside the host binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModule {
    DocumentViewer,
    NativeClient,
}

impl BuiltinModule {
    /// All built-in modules, in candidate order
    pub const ALL: [BuiltinModule; 2] = [BuiltinModule::DocumentViewer, BuiltinModule::NativeClient];

    /// Library stem used when the path is derived from a module directory
    pub fn library_stem(&self) -> &'static str {
        match self {
            BuiltinModule::DocumentViewer => DOCUMENT_VIEWER_LIBRARY,
            BuiltinModule::NativeClient => NATIVE_CLIENT_LIBRARY,
        }
    }
}

impl fmt::Display for BuiltinModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinModule::DocumentViewer => write!(f, "document-viewer"),
            BuiltinModule::NativeClient => write!(f, "native-client"),
        }
    }
}

/// Services the registry consumes from its host process
pub trait PluginHost: Send + Sync {
    /// Where the given built-in module would live, if the host knows.
    fn builtin_module_path(&self, module: BuiltinModule) -> Option<PathBuf>;

    /// Whether a file exists at `path`.
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether the named feature flag is enabled.
    fn is_feature_enabled(&self, feature: &str) -> bool;

    /// Loads the code unit at `path` into the process.
    fn load_library(&self, path: &Path) -> Result<Box<dyn NativeLibrary>, PluginSystemError>;

    /// Interface lookup handed to modules while they initialize.
    fn interface_getter(&self) -> HostGetInterfaceFn {
        no_host_interfaces
    }
}

/// [`PluginHost`] backed by the real filesystem and the dynamic loader
#[derive(Debug, Clone, Default)]
pub struct SystemHost {
    module_dir: Option<PathBuf>,
    document_viewer_path: Option<PathBuf>,
    native_client_path: Option<PathBuf>,
    enabled_features: HashSet<String>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self {
            module_dir: config.module_dir.clone(),
            document_viewer_path: config.document_viewer_path.clone(),
            native_client_path: config.native_client_path.clone(),
            enabled_features: config.enabled_features.iter().cloned().collect(),
        }
    }

    pub fn enable_feature(&mut self, feature: impl Into<String>) {
        self.enabled_features.insert(feature.into());
    }
}

impl PluginHost for SystemHost {
    fn builtin_module_path(&self, module: BuiltinModule) -> Option<PathBuf> {
        let explicit = match module {
            BuiltinModule::DocumentViewer => &self.document_viewer_path,
            BuiltinModule::NativeClient => &self.native_client_path,
        };
        explicit.clone().or_else(|| {
            self.module_dir
                .as_ref()
                .map(|dir| dir.join(libloading::library_filename(module.library_stem())))
        })
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_feature_enabled(&self, feature: &str) -> bool {
        self.enabled_features.contains(feature)
    }

    fn load_library(&self, path: &Path) -> Result<Box<dyn NativeLibrary>, PluginSystemError> {
        Ok(Box::new(DynamicLibrary::open(path)?))
    }
}
