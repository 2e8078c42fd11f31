//! FFI bindings for gait-trials
//!
//! Lets a native UI host drive a headless trial selector page. All functions
//! use C strings (null-terminated) and return allocated memory that must be
//! freed by the caller using `gait_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::page::{ControlEvent, ControlTarget, HeadlessPage};
use crate::types::{ClampConfig, Parameters, SubjectMaxTable};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string, naming what was wrong with it
unsafe fn cstr_to_string(ptr: *const c_char) -> Result<String, &'static str> {
    if ptr.is_null() {
        return Err("Null value pointer");
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| "Value is not valid UTF-8")
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Page API
// ============================================================================

/// Opaque handle to a headless page
pub struct GaitPageHandle {
    page: HeadlessPage,
}

/// Create a page with the default subject table. The widget attaches on
/// `gait_page_ready`.
///
/// # Safety
/// - Returns a pointer to a newly allocated page.
/// - Must be freed with `gait_page_free`.
#[no_mangle]
pub unsafe extern "C" fn gait_page_new(
    subject: i64,
    trial: i64,
    resync_on_trial_change: bool,
) -> *mut GaitPageHandle {
    clear_last_error();

    let mut page = HeadlessPage::headless(Parameters::new(subject, trial));
    page.on_ready(
        SubjectMaxTable::default(),
        ClampConfig {
            resync_on_trial_change,
        },
    );
    Box::into_raw(Box::new(GaitPageHandle { page }))
}

/// Free a page.
///
/// # Safety
/// - `page` must be a valid pointer returned by `gait_page_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gait_page_free(page: *mut GaitPageHandle) {
    if !page.is_null() {
        drop(Box::from_raw(page));
    }
}

/// Signal that the page finished loading.
///
/// # Safety
/// - `page` must be a valid pointer returned by `gait_page_new`.
/// - Returns 1 if the widget attached, 0 if it was already attached, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn gait_page_ready(page: *mut GaitPageHandle) -> i32 {
    clear_last_error();

    if page.is_null() {
        set_last_error("Null page pointer");
        return -1;
    }

    let handle = &mut *page;
    match handle.page.ready() {
        Some(_) => 1,
        None => 0,
    }
}

unsafe fn dispatch(page: *mut GaitPageHandle, target: ControlTarget, value: *const c_char) -> i32 {
    clear_last_error();

    if page.is_null() {
        set_last_error("Null page pointer");
        return -1;
    }

    let handle = &mut *page;

    let value_str = match cstr_to_string(value) {
        Ok(s) => s,
        Err(message) => {
            set_last_error(message);
            return -1;
        }
    };

    handle.page.dispatch(&ControlEvent::commit(target, value_str));
    0
}

/// Commit a new subject value typed by the user.
///
/// # Safety
/// - `page` must be a valid pointer returned by `gait_page_new`.
/// - `value` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error; call `gait_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn gait_page_set_subject(
    page: *mut GaitPageHandle,
    value: *const c_char,
) -> i32 {
    dispatch(page, ControlTarget::Subject, value)
}

/// Commit a new trial value typed by the user.
///
/// # Safety
/// - `page` must be a valid pointer returned by `gait_page_new`.
/// - `value` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error; call `gait_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn gait_page_set_trial(page: *mut GaitPageHandle, value: *const c_char) -> i32 {
    dispatch(page, ControlTarget::Trial, value)
}

/// Current page state as JSON.
///
/// # Safety
/// - `page` must be a valid pointer returned by `gait_page_new`.
/// - Returns a newly allocated string that must be freed with `gait_free_string`.
/// - Returns NULL on error; call `gait_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gait_page_snapshot(page: *const GaitPageHandle) -> *mut c_char {
    clear_last_error();

    if page.is_null() {
        set_last_error("Null page pointer");
        return ptr::null_mut();
    }

    let handle = &*page;

    match serde_json::to_string(&handle.page.snapshot()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by gait functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a gait function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gait_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next gait function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn gait_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn gait_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageSnapshot;
    use std::ffi::CString;

    unsafe fn snapshot(page: *const GaitPageHandle) -> PageSnapshot {
        let raw = gait_page_snapshot(page);
        assert!(!raw.is_null());
        let parsed = serde_json::from_str(CStr::from_ptr(raw).to_str().unwrap()).unwrap();
        gait_free_string(raw);
        parsed
    }

    #[test]
    fn test_ffi_page_lifecycle() {
        unsafe {
            let page = gait_page_new(1, 6, false);
            assert!(!page.is_null());

            assert_eq!(gait_page_ready(page), 1);
            assert_eq!(gait_page_ready(page), 0);

            let subject = CString::new("14").unwrap();
            assert_eq!(gait_page_set_subject(page, subject.as_ptr()), 0);

            let state = snapshot(page);
            assert_eq!(state.parameters, Parameters::new(14, 4));
            assert_eq!(state.label, "Max: 4");

            gait_page_free(page);
        }
    }

    #[test]
    fn test_ffi_trial_path_respects_resync_flag() {
        unsafe {
            let trial = CString::new("6").unwrap();

            let page = gait_page_new(14, 1, false);
            gait_page_ready(page);
            gait_page_set_trial(page, trial.as_ptr());
            let state = snapshot(page);
            assert_eq!(state.trial_numeric, "4");
            assert_eq!(state.parameters.trial, 6);
            gait_page_free(page);

            let page = gait_page_new(14, 1, true);
            gait_page_ready(page);
            gait_page_set_trial(page, trial.as_ptr());
            assert_eq!(snapshot(page).parameters.trial, 4);
            gait_page_free(page);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let value = CString::new("3").unwrap();
            assert_eq!(gait_page_set_trial(ptr::null_mut(), value.as_ptr()), -1);

            let error = gait_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert_eq!(error_str, "Null page pointer");

            let page = gait_page_new(1, 1, false);
            assert_eq!(gait_page_set_subject(page, ptr::null()), -1);
            let error_str = CStr::from_ptr(gait_last_error()).to_str().unwrap();
            assert_eq!(error_str, "Null value pointer");
            assert!(gait_page_snapshot(ptr::null()).is_null());
            gait_page_free(page);
        }
    }

    #[test]
    fn test_ffi_rejects_invalid_utf8_value() {
        unsafe {
            let page = gait_page_new(1, 1, false);
            gait_page_ready(page);

            let value = CString::new(vec![0xff_u8, b'3']).unwrap();
            assert_eq!(gait_page_set_trial(page, value.as_ptr()), -1);
            let error_str = CStr::from_ptr(gait_last_error()).to_str().unwrap();
            assert_eq!(error_str, "Value is not valid UTF-8");

            let state = snapshot(page);
            assert_eq!(state.trial_numeric, "1");
            gait_page_free(page);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = gait_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
