//! Modules compiled into the host.
//!
//! The loopback module is a minimal in-process module used to exercise the
//! internal initialization path. Once initialized it exposes one interface,
//! [`LoopbackInterface`], under [`LOOPBACK_INTERFACE`].
use std::ffi::{CStr, c_void};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use crate::kernel::constants::{
    LOOPBACK_INTERFACE, LOOPBACK_MIME_TYPE, LOOPBACK_MODULE_NAME, LOOPBACK_MODULE_PATH,
};
use crate::plugin_system::descriptor::{MimeEntry, PluginDescriptor};
use crate::plugin_system::traits::{EntryPoints, HostGetInterfaceFn, ModuleId, MODULE_OK};

/// Interface table of the loopback module
#[repr(C)]
pub struct LoopbackInterface {
    /// Returns its argument unchanged
    pub echo: extern "C" fn(value: i32) -> i32,
    /// Id the host assigned at the most recent initialization
    pub module_id: extern "C" fn() -> ModuleId,
}

/// Number of loopback instances currently initialized
static LIVE_INSTANCES: AtomicUsize = AtomicUsize::new(0);
static LAST_MODULE_ID: AtomicI32 = AtomicI32::new(0);

extern "C" fn loopback_echo(value: i32) -> i32 {
    value
}

extern "C" fn loopback_module_id() -> ModuleId {
    LAST_MODULE_ID.load(Ordering::SeqCst)
}

static LOOPBACK_INTERFACE_TABLE: LoopbackInterface = LoopbackInterface {
    echo: loopback_echo,
    module_id: loopback_module_id,
};

unsafe extern "C-unwind" fn loopback_get_interface(interface_name: *const c_char) -> *const c_void {
    if interface_name.is_null() || LIVE_INSTANCES.load(Ordering::SeqCst) == 0 {
        return ptr::null();
    }
    let name = unsafe { CStr::from_ptr(interface_name) };
    if name.to_bytes() == LOOPBACK_INTERFACE.as_bytes() {
        &LOOPBACK_INTERFACE_TABLE as *const LoopbackInterface as *const c_void
    } else {
        ptr::null()
    }
}

unsafe extern "C-unwind" fn loopback_initialize_module(
    module_id: ModuleId,
    _get_host_interface: HostGetInterfaceFn,
) -> i32 {
    LAST_MODULE_ID.store(module_id, Ordering::SeqCst);
    LIVE_INSTANCES.fetch_add(1, Ordering::SeqCst);
    MODULE_OK
}

unsafe extern "C-unwind" fn loopback_shutdown_module() {
    // Saturating: a shutdown without a matching initialize is a no-op.
    let _ = LIVE_INSTANCES.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}

/// Entry points of the loopback module
pub fn loopback_entry_points() -> EntryPoints {
    EntryPoints {
        get_interface: loopback_get_interface,
        initialize_module: loopback_initialize_module,
        shutdown_module: loopback_shutdown_module,
    }
}

/// Descriptor of the loopback module
pub fn loopback_descriptor() -> PluginDescriptor {
    PluginDescriptor::internal(LOOPBACK_MODULE_PATH, loopback_entry_points())
        .with_name(LOOPBACK_MODULE_NAME)
        .with_mime_entry(MimeEntry::new(LOOPBACK_MIME_TYPE, "", ""))
}

/// Number of loopback instances currently initialized in this process
pub fn loopback_live_instances() -> usize {
    LIVE_INSTANCES.load(Ordering::SeqCst)
}
