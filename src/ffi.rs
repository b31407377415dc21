//! FFI bindings for beats-tier
//!
//! C-compatible functions over an opaque classifier handle. Handles are created
//! with `beats_classifier_new` and must be released with `beats_classifier_free`.

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::classifier::ActivityTierClassifier;
use crate::types::RateSample;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Opaque handle for a classifier
pub struct BeatsClassifierHandle {
    classifier: ActivityTierClassifier,
}

/// Create a classifier from `len` ascending thresholds.
///
/// # Safety
/// - `thresholds` must point to `len` readable doubles, or be NULL when `len` is 0.
/// - Returns NULL on invalid thresholds; call `beats_last_error` for details.
/// - The handle must be freed with `beats_classifier_free`.
#[no_mangle]
pub unsafe extern "C" fn beats_classifier_new(
    thresholds: *const f64,
    len: usize,
) -> *mut BeatsClassifierHandle {
    clear_last_error();

    let values = if len == 0 {
        Vec::new()
    } else if thresholds.is_null() {
        set_last_error("Threshold pointer is NULL");
        return ptr::null_mut();
    } else {
        std::slice::from_raw_parts(thresholds, len).to_vec()
    };

    match ActivityTierClassifier::with_thresholds(&values) {
        Ok(classifier) => Box::into_raw(Box::new(BeatsClassifierHandle { classifier })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a classifier.
///
/// # Safety
/// - `handle` must come from `beats_classifier_new`, or be NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn beats_classifier_free(handle: *mut BeatsClassifierHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Record one keyboard/mouse rate sample. Returns the new tier, or -1 if the
/// handle is NULL.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `beats_classifier_new`.
#[no_mangle]
pub unsafe extern "C" fn beats_classifier_record_sample(
    handle: *mut BeatsClassifierHandle,
    keyboard_rate: f64,
    mouse_rate: f64,
) -> i64 {
    clear_last_error();

    let Some(handle) = handle.as_mut() else {
        set_last_error("Invalid classifier handle");
        return -1;
    };

    handle
        .classifier
        .record_sample(RateSample::new(keyboard_rate, mouse_rate));
    handle.classifier.current_tier() as i64
}

/// Current smoothed combined rate. Returns 0 for a NULL handle and sets the
/// last error, so callers can tell it apart from a real rate of 0.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `beats_classifier_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn beats_classifier_smoothed_rate(handle: *const BeatsClassifierHandle) -> i64 {
    clear_last_error();

    match handle.as_ref() {
        Some(handle) => handle.classifier.current_smoothed_rate(),
        None => {
            set_last_error("Invalid classifier handle");
            0
        }
    }
}

/// Current tier, or -1 for a NULL handle.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `beats_classifier_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn beats_classifier_tier(handle: *const BeatsClassifierHandle) -> i64 {
    clear_last_error();

    match handle.as_ref() {
        Some(handle) => handle.classifier.current_tier() as i64,
        None => {
            set_last_error("Invalid classifier handle");
            -1
        }
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next beats call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn beats_last_error() -> *const c_char {
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
pub unsafe extern "C" fn beats_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_ffi_classifier_lifecycle() {
        let thresholds = [100.0, 200.0, 500.0, 1000.0, 2000.0];
        unsafe {
            let handle = beats_classifier_new(thresholds.as_ptr(), thresholds.len());
            assert!(!handle.is_null());
            assert_eq!(beats_classifier_tier(handle), 0);

            assert_eq!(beats_classifier_record_sample(handle, 0.0, 0.0), 0);
            assert_eq!(beats_classifier_record_sample(handle, 1200.0, 900.0), 3);
            assert_eq!(beats_classifier_smoothed_rate(handle), 700);
            assert_eq!(beats_classifier_tier(handle), 3);

            beats_classifier_free(handle);
        }
    }

    #[test]
    fn test_ffi_empty_thresholds() {
        unsafe {
            let handle = beats_classifier_new(ptr::null(), 0);
            assert!(!handle.is_null());
            assert_eq!(beats_classifier_record_sample(handle, 9000.0, 0.0), 0);
            beats_classifier_free(handle);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let descending = [500.0, 100.0];
        unsafe {
            let handle = beats_classifier_new(descending.as_ptr(), descending.len());
            assert!(handle.is_null());

            let error = beats_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("ascending"));

            assert_eq!(beats_classifier_record_sample(ptr::null_mut(), 1.0, 1.0), -1);
            assert_eq!(beats_classifier_tier(ptr::null()), -1);
        }
    }

    #[test]
    fn test_ffi_null_handle_sets_last_error() {
        unsafe {
            assert_eq!(beats_classifier_smoothed_rate(ptr::null()), 0);
            let error = beats_last_error();
            assert!(!error.is_null());
            assert_eq!(
                CStr::from_ptr(error).to_str().unwrap(),
                "Invalid classifier handle"
            );

            // A real zero rate leaves no error behind
            let handle = beats_classifier_new(ptr::null(), 0);
            assert_eq!(beats_classifier_smoothed_rate(handle), 0);
            assert!(beats_last_error().is_null());
            beats_classifier_free(handle);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = beats_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
