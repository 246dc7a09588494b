//! # Plume Plugin System Errors
//!
//! Defines error types specific to the plugin system.
//!
//! [`PluginSystemError`] covers the recoverable failures of the registry:
//! rejected descriptor entries, libraries that fail to load or lack an entry
//! point, and modules whose initialization reports failure or panics. None of
//! these abort registry construction; callers log them and move on.
//!
//! Identity errors in the live module table (duplicate registration, removal
//! of an unknown module) are deliberately *not* represented here. They are
//! broken invariants and panic.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin loading failed for '{plugin_id}': {source}")]
    LoadingError {
        plugin_id: String,
        path: Option<PathBuf>,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("FFI error in plugin '{plugin_id}' during operation '{operation}': {message}")]
    FfiError {
        plugin_id: String,
        operation: String,
        message: String,
    },

    #[error("Plugin initialization error for '{plugin_id}': {message}")]
    InitializationError {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<PluginSystemErrorSource>>,
    },

    #[error("Malformed plugin entry '{entry}': {message}")]
    DescriptorError {
        entry: String,
        message: String,
    },

    #[error("Internal plugin system error: {0}")]
    InternalError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error("libloading error: {0}")]
    Library(#[from] libloading::Error),
    #[error("Other: {0}")]
    Other(String),
}

impl PluginSystemError {
    /// Builds a [`PluginSystemError::LoadingError`] for the library at `path`.
    pub fn loading(path: impl Into<PathBuf>, source: impl Into<PluginSystemErrorSource>) -> Self {
        let path = path.into();
        PluginSystemError::LoadingError {
            plugin_id: path.to_string_lossy().into_owned(),
            path: Some(path),
            source: Box::new(source.into()),
        }
    }
}

impl From<String> for PluginSystemErrorSource {
    fn from(msg: String) -> Self {
        PluginSystemErrorSource::Other(msg)
    }
}

impl From<&str> for PluginSystemErrorSource {
    fn from(msg: &str) -> Self {
        PluginSystemErrorSource::Other(msg.to_string())
    }
}
