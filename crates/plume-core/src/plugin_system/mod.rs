//! # Plume Plugin System
//!
//! Discovers, loads and tracks the modules a Plume host can run.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`parser`]**: Parses the general plugin list and the extra-module
//!   shorthand into [`PluginDescriptor`]s.
//! - **[`candidates`]**: Builds the ordered candidate list from built-in
//!   modules, feature-gated internal modules and configuration.
//! - **[`loader`]**: Instantiates in-process candidates, from compiled-in
//!   entry points or from dynamic libraries opened with `libloading`.
//! - **[`module`]**: The [`PluginModule`] instance and its teardown.
//! - **[`live_table`]**: Weak index of live modules by path.
//! - **[`registry`]**: The [`PluginRegistry`] facade and its process-wide
//!   instance.
//! - **[`host`]**: The [`PluginHost`] trait the registry consumes and the
//!   [`SystemHost`] implementation.
//! - **[`traits`]**: The native module ABI and the seams between components.
//! - **[`error`]**: [`PluginSystemError`].
pub mod candidates;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod internal;
pub mod live_table;
pub mod loader;
pub mod module;
pub mod parser;
pub mod registry;
pub mod traits;

pub use candidates::{compute_candidate_list, AvailabilityCache};
pub use descriptor::{MimeEntry, ModuleKind, PluginDescriptor};
pub use error::PluginSystemError;
pub use host::{BuiltinModule, PluginHost, SystemHost};
pub use live_table::LiveModuleTable;
pub use loader::DynamicLibrary;
pub use module::{ModuleHandle, ModuleIdentity, PluginModule};
pub use registry::{install_global_context, PluginRegistry, RegistryContext};
pub use traits::{EntryPoints, ModuleLifetime, NativeLibrary};

#[cfg(test)]
mod tests;
