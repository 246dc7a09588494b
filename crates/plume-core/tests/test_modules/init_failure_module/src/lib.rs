//! Refuses to initialize.
use std::ffi::c_void;
use std::os::raw::c_char;

type HostGetInterfaceFn = unsafe extern "C-unwind" fn(*const c_char) -> *const c_void;

const MODULE_ERROR_FAILED: i32 = -2;

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_get_interface(_interface_name: *const c_char) -> *const c_void {
    std::ptr::null()
}

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_initialize_module(_module_id: i32, _get_interface: HostGetInterfaceFn) -> i32 {
    MODULE_ERROR_FAILED
}

#[no_mangle]
pub unsafe extern "C-unwind" fn plume_shutdown_module() {}
