/// Application name
pub const APP_NAME: &str = "Plume";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// --- Built-in modules distributed with the host ---

/// Display name of the document viewer module
pub const DOCUMENT_VIEWER_NAME: &str = "Plume Document Viewer";
/// Library stem of the document viewer module
pub const DOCUMENT_VIEWER_LIBRARY: &str = "plume_document_viewer";
pub const DOCUMENT_VIEWER_MIME_TYPE: &str = "application/pdf";
pub const DOCUMENT_VIEWER_EXTENSION: &str = "pdf";
pub const DOCUMENT_VIEWER_DESCRIPTION: &str = "Portable Document Format";

/// Display name of the native client module
pub const NATIVE_CLIENT_NAME: &str = "Plume Native Client";
/// Library stem of the native client module
pub const NATIVE_CLIENT_LIBRARY: &str = "plume_native_client";
pub const NATIVE_CLIENT_MIME_TYPE: &str = "application/x-nacl";
pub const NATIVE_CLIENT_EXTENSION: &str = "nexe";
pub const NATIVE_CLIENT_DESCRIPTION: &str = "Native Client Executable";

// --- Compiled-in internal modules ---

/// Synthetic identity of the loopback module. Never opened as a file.
pub const LOOPBACK_MODULE_PATH: &str = "internal-loopback";
pub const LOOPBACK_MODULE_NAME: &str = "Plume Loopback";
/// Feature flag that gates the loopback module
pub const LOOPBACK_FEATURE: &str = "enable-loopback";
pub const LOOPBACK_MIME_TYPE: &str = "application/x-plume-loopback";
/// Name of the interface the loopback module exposes through `get_interface`
pub const LOOPBACK_INTERFACE: &str = "PlumeLoopback;1.0";

// --- Extra runtime module (configured by path + version) ---

pub const EXTRA_MODULE_NAME: &str = "Shockwave Flash";
pub const EXTRA_MODULE_SWF_MIME_TYPE: &str = "application/x-shockwave-flash";
pub const EXTRA_MODULE_SWF_EXTENSION: &str = "swf";
pub const EXTRA_MODULE_SWF_DESCRIPTION: &str = "Shockwave Flash";
pub const EXTRA_MODULE_SPL_MIME_TYPE: &str = "application/futuresplash";
pub const EXTRA_MODULE_SPL_EXTENSION: &str = "spl";
pub const EXTRA_MODULE_SPL_DESCRIPTION: &str = "FutureSplash Player";

/// Version components used when the configured version string is short.
/// Order: major, minor, build, patch.
pub const EXTRA_MODULE_DEFAULT_VERSION: [&str; 4] = ["10", "2", "999", "999"];

// --- Native module ABI ---

/// Exported symbol resolving a module interface by name
pub const GET_INTERFACE_SYMBOL: &[u8] = b"plume_get_interface\0";
/// Exported symbol initializing a module
pub const INITIALIZE_MODULE_SYMBOL: &[u8] = b"plume_initialize_module\0";
/// Exported symbol shutting a module down
pub const SHUTDOWN_MODULE_SYMBOL: &[u8] = b"plume_shutdown_module\0";
