//! C entry points for completion-callback hosts (Swift continuations, C++
//! promise wrappers).
//!
//! The host passes an opaque `context` and a completion function. The call
//! returns at once; the completion is invoked exactly once, later, from a
//! worker thread, with either a JSON result or an error message. Both strings
//! are borrowed for the duration of the completion only: copy them before
//! returning from it.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::bridge::buffer::copy_c_str;
use crate::error::{ArkError, ArkResult};

/// `result_json` is non-null on success, `error_message` on failure. Never both.
pub type ArkCompletion =
    unsafe extern "C" fn(context: *mut c_void, result_json: *const c_char, error_message: *const c_char);

/// Host context pointer carried to the worker thread. The host guarantees it
/// stays valid until the completion runs.
struct HostContext(*mut c_void);

unsafe impl Send for HostContext {}

fn to_c(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

fn deliver(completion: ArkCompletion, context: HostContext, result: ArkResult<String>) {
    let (value, error) = match result {
        Ok(json) => (Some(to_c(&json)), None),
        Err(e) => (None, Some(to_c(&e.message))),
    };
    let value_ptr = value.as_ref().map_or(ptr::null(), |s| s.as_ptr());
    let error_ptr = error.as_ref().map_or(ptr::null(), |s| s.as_ptr());
    // Unwinding into the host is undefined behaviour.
    let delivered = catch_unwind(AssertUnwindSafe(|| unsafe { completion(context.0, value_ptr, error_ptr) }));
    if delivered.is_err() {
        tracing::error!("host completion panicked");
    }
}

/// Start `operation` with JSON `args_json` (may be null for no arguments).
///
/// # Arguments
///
/// * `operation` - camelCase operation name, e.g. `"boardAmount"`
/// * `args_json` - JSON object text, or null
/// * `context` - opaque host pointer handed back to `completion`
/// * `completion` - invoked exactly once from a worker thread
///
/// # Safety
///
/// `operation` and `args_json` must be null or valid NUL-terminated strings
/// for the duration of this call. `context` must stay valid until the
/// completion runs.
#[no_mangle]
pub unsafe extern "C" fn ark_host_call(
    operation: *const c_char,
    args_json: *const c_char,
    context: *mut c_void,
    completion: Option<ArkCompletion>,
) {
    let Some(completion) = completion else {
        tracing::error!("ark_host_call without a completion; call dropped");
        return;
    };
    let context = HostContext(context);

    let parsed = (|| -> ArkResult<(String, String)> {
        let op = unsafe { copy_c_str(operation) }
            .map_err(ArkError::from)?
            .ok_or_else(|| ArkError::new("Operation name is required"))?;
        let args = unsafe { copy_c_str(args_json) }.map_err(ArkError::from)?.unwrap_or_default();
        Ok((op, args))
    })();

    let (op, args) = match parsed {
        Ok(v) => v,
        Err(e) => return crate::host::reject_call(e, move |result| deliver(completion, context, result)),
    };

    let started = catch_unwind(AssertUnwindSafe(move || {
        crate::host::call_json(&op, &args, move |result| deliver(completion, context, result));
    }));
    if started.is_err() {
        // The completion was dropped with the panicking frame and has reported the failure.
        tracing::error!("ark_host_call panicked while scheduling");
    }
}

/// Whether a wallet is loaded. Synchronous, never crosses into the engine.
#[no_mangle]
pub extern "C" fn ark_host_is_wallet_loaded() -> bool {
    crate::host::client().map(|c| c.is_wallet_loaded()).unwrap_or(false)
}

/// Install the tracing subscriber and start the engine's logger. Safe to call
/// more than once.
#[no_mangle]
pub extern "C" fn ark_host_init_logging() {
    crate::host::init_logging();
}
