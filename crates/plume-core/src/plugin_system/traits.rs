use std::ffi::c_void;
use std::fmt;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::module::ModuleIdentity;

// --- Native module ABI ---

/// Identifier the host assigns to a module instance at initialization.
pub type ModuleId = i32;

/// Result code a module returns from `initialize_module` on success.
pub const MODULE_OK: i32 = 0;
/// Generic failure code.
pub const MODULE_ERROR_FAILED: i32 = -2;

/// Resolves an interface by NUL-terminated name. Returns null when unknown.
pub type GetInterfaceFn = unsafe extern "C-unwind" fn(interface_name: *const c_char) -> *const c_void;

/// Host-side interface lookup handed to a module while it initializes.
pub type HostGetInterfaceFn = unsafe extern "C-unwind" fn(interface_name: *const c_char) -> *const c_void;

/// Initializes a module. Returns [`MODULE_OK`] on success.
pub type InitializeModuleFn =
    unsafe extern "C-unwind" fn(module_id: ModuleId, get_host_interface: HostGetInterfaceFn) -> i32;

/// Shuts a previously initialized module down.
pub type ShutdownModuleFn = unsafe extern "C-unwind" fn();

/// The fixed entry-point triple every module exposes, whether compiled into
/// the host or exported from a dynamic library.
#[derive(Clone, Copy)]
pub struct EntryPoints {
    pub get_interface: GetInterfaceFn,
    pub initialize_module: InitializeModuleFn,
    pub shutdown_module: ShutdownModuleFn,
}

impl fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoints")
            .field("get_interface", &(self.get_interface as *const c_void))
            .field("initialize_module", &(self.initialize_module as *const c_void))
            .field("shutdown_module", &(self.shutdown_module as *const c_void))
            .finish()
    }
}

/// Default host interface lookup: the host exposes no interfaces.
pub unsafe extern "C-unwind" fn no_host_interfaces(_interface_name: *const c_char) -> *const c_void {
    ptr::null()
}

// --- Seams ---

/// A code unit loaded into the process address space.
///
/// The library stays mapped for as long as the value lives, so entry points
/// resolved from it must not be called after it is dropped.
pub trait NativeLibrary: Send + Sync + fmt::Debug {
    /// Path the library was loaded from.
    fn path(&self) -> &Path;

    /// Resolves the module entry points exported by the library.
    fn entry_points(&self) -> Result<EntryPoints, PluginSystemError>;
}

/// Receives the termination notice of a module.
///
/// Implementations are called from the module's `Drop`, while the module is
/// being destroyed. They must only compare the identity, never reach back
/// into the module.
pub trait ModuleLifetime: Send + Sync {
    fn module_dead(&self, dead_module: ModuleIdentity);
}
