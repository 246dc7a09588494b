//! # Plume Core Errors
//!
//! Defines the crate-level [`Error`] type.
//!
//! Subsystems own their typed errors ([`PluginSystemError`] for descriptor
//! parsing and module loading, [`ConfigError`] for configuration files); this
//! enum wraps them so host code can propagate either with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::plugin_system::error::PluginSystemError;

/// Crate-level error type
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Configuration loading or serialization error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
