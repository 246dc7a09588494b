//! Minimal well-behaved module: initializes, exports one interface and
//! counts its live instances.
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicI32, Ordering};

type HostGetInterfaceFn = unsafe extern "C-unwind" fn(*const c_char) -> *const c_void;

static INSTANCES: AtomicI32 = AtomicI32::new(0);
static LAST_MODULE_ID: AtomicI32 = AtomicI32::new(0);

#[repr(C)]
pub struct EchoInterface {
    pub instances: extern "C-unwind" fn() -> i32,
    pub module_id: extern "C-unwind" fn() -> i32,
}

extern "C-unwind" fn instances() -> i32 {
    INSTANCES.load(Ordering::SeqCst)
}

extern "C-unwind" fn module_id() -> i32 {
    LAST_MODULE_ID.load(Ordering::SeqCst)
}

static ECHO_INTERFACE: EchoInterface = EchoInterface { instances, module_id };

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_get_interface(interface_name: *const c_char) -> *const c_void {
    if interface_name.is_null() {
        return std::ptr::null();
    }
    match CStr::from_ptr(interface_name).to_str() {
        Ok("PlumeEcho;1.0") => &ECHO_INTERFACE as *const EchoInterface as *const c_void,
        _ => std::ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_initialize_module(module_id: i32, _get_interface: HostGetInterfaceFn) -> i32 {
    LAST_MODULE_ID.store(module_id, Ordering::SeqCst);
    INSTANCES.fetch_add(1, Ordering::SeqCst);
    0
}

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_shutdown_module() {
    INSTANCES.fetch_sub(1, Ordering::SeqCst);
}
