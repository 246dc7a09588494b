pub mod config;
pub mod kernel;
pub mod plugin_system;

pub use config::{PlumeConfig, RegistryConfig, HostConfig};
pub use kernel::error::Error as KernelError;
pub use plugin_system::{PluginDescriptor, PluginHost, PluginModule, PluginRegistry, SystemHost};
