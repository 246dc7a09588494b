//! # Plume Configuration
//!
//! Configuration read by the registry and its host, loadable from JSON, YAML
//! or TOML files.
//!
//! [`RegistryConfig`] carries the plugin configuration strings exactly as the
//! registry parses them. [`HostConfig`] tells
//! [`SystemHost`](crate::plugin_system::host::SystemHost) where built-in
//! modules live and which feature flags are on.
pub mod error;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }
}

/// Plugin configuration strings handed to the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// General plugin list: `path[#name[#description[#version]]];mime[;mime...]`
    /// entries separated by commas
    pub register_plugins: String,
    /// Path of the extra runtime module; empty when there is none
    pub extra_module_path: String,
    /// Dotted version of the extra runtime module
    pub extra_module_version: String,
    /// Whether configured modules run out of process
    pub out_of_process: bool,
}

/// Where [`SystemHost`](crate::plugin_system::host::SystemHost) looks for
/// things
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory the built-in modules are installed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_viewer_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_client_path: Option<PathBuf>,
    pub enabled_features: Vec<String>,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumeConfig {
    pub registry: RegistryConfig,
    pub host: HostConfig,
}

impl PlumeConfig {
    /// Parses configuration data in the given format.
    pub fn from_str(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| ConfigError::deserialization(format.name(), e))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| ConfigError::deserialization(format.name(), e))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::from_str(data).map_err(|e| ConfigError::deserialization(format.name(), e))
            }
        }
    }

    /// Serializes to a string in the given format.
    pub fn to_string(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| ConfigError::serialization(format.name(), e))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ConfigError::serialization(format.name(), e))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::serialization(format.name(), e))
            }
        }
    }

    /// Loads a configuration file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedConfigFormat(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;
        let data = fs::read_to_string(path).map_err(|e| ConfigError::io(e, "read_config", path.to_path_buf()))?;
        Self::from_str(&data, format)
    }

    /// Writes the configuration to `path` in the format its extension names.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedConfigFormat(path.display().to_string()))?;
        let data = self.to_string(format)?;
        fs::write(path, data).map_err(|e| ConfigError::io(e, "write_config", path.to_path_buf()))
    }
}
