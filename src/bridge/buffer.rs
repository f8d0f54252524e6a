//! Ownership of engine-allocated memory.
//!
//! Every pointer the engine hands back is wrapped in an [`EngineOwned`] the
//! moment the call returns. The guard is the only thing allowed to run the
//! paired release function, and it runs it exactly once.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use crate::abi::{AbiError, EngineAbi};
use crate::error::{BridgeError, BridgeResult};

/// An engine allocation paired with its release function.
pub struct EngineOwned<T> {
    ptr: *mut T,
    release: unsafe extern "C" fn(*mut T),
}

impl<T> EngineOwned<T> {
    /// # Safety
    ///
    /// `ptr` must be null or a live allocation that `release` accepts, and no
    /// other code may release it.
    pub unsafe fn new(ptr: *mut T, release: unsafe extern "C" fn(*mut T)) -> Self {
        Self { ptr, release }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    pub fn get(&self) -> Option<&T> {
        // SAFETY: non-null pointers held by the guard stay live until drop.
        unsafe { self.ptr.as_ref() }
    }
}

impl EngineOwned<c_char> {
    /// Copy the string out, then release the engine buffer.
    pub fn into_string(self) -> BridgeResult<Option<String>> {
        // SAFETY: the guard holds a live NUL-terminated engine string or null.
        unsafe { copy_c_str(self.ptr) }
    }
}

impl<T> Drop for EngineOwned<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: constructed with a matching release fn, and drop runs once.
            unsafe { (self.release)(self.ptr) };
            self.ptr = ptr::null_mut();
        }
    }
}

/// Copy a borrowed C string into an owned `String`. Null maps to `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for the call.
pub unsafe fn copy_c_str(ptr: *const c_char) -> BridgeResult<Option<String>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_owned()))
        .map_err(|e| BridgeError::marshalling(format!("engine string is not UTF-8: {e}")))
}

/// Copy `len` borrowed C strings. A null array is only accepted when empty.
///
/// # Safety
///
/// `ptr` must point to `len` pointers, each valid for [`copy_c_str`].
pub unsafe fn copy_c_str_array(ptr: *const *mut c_char, len: usize) -> BridgeResult<Vec<String>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(BridgeError::marshalling(format!("null array with length {len}")));
    }
    std::slice::from_raw_parts(ptr, len)
        .iter()
        .map(|&p| copy_c_str(p)?.ok_or_else(|| BridgeError::marshalling("null entry in string array")))
        .collect()
}

/// Same as [`copy_c_str_array`] for arrays of `*const` pointers.
///
/// # Safety
///
/// See [`copy_c_str_array`].
pub unsafe fn copy_borrowed_str_array(ptr: *const *const c_char, len: usize) -> BridgeResult<Vec<String>> {
    copy_c_str_array(ptr as *const *mut c_char, len)
}

/// Turn a returned error envelope into a `Result`, releasing the envelope.
pub fn check(abi: &EngineAbi, err: *mut AbiError) -> BridgeResult<()> {
    // SAFETY: the envelope was just returned by the engine and is released only here.
    let envelope = unsafe { EngineOwned::new(err, abi.free_error) };
    match envelope.get() {
        None => Ok(()),
        Some(e) => {
            let message = unsafe { copy_c_str(e.message) }?
                .unwrap_or_else(|| "engine returned an error without a message".to_string());
            Err(BridgeError::Engine(message))
        }
    }
}

/// Run an engine call that writes one allocated value through an out pointer.
///
/// The out slot starts null and is guarded right after the call, so it is
/// released on every path. An error envelope wins over a populated output.
pub fn call_out<T>(
    abi: &EngineAbi,
    op: &str,
    release: unsafe extern "C" fn(*mut T),
    call: impl FnOnce(*mut *mut T) -> *mut AbiError,
) -> BridgeResult<EngineOwned<T>> {
    let mut out: *mut T = ptr::null_mut();
    let err = call(&mut out as *mut *mut T);
    // SAFETY: `out` is either still null or an allocation paired with `release`.
    let out = unsafe { EngineOwned::new(out, release) };

    if let Err(e) = check(abi, err) {
        if !out.is_null() {
            tracing::warn!(op, "engine returned an error and an output; output discarded");
        }
        return Err(e);
    }
    if out.is_null() {
        tracing::error!(op, "engine reported success without an output");
        return Err(BridgeError::marshalling(format!("{op}: success without output")));
    }
    Ok(out)
}

/// [`call_out`] for operations returning a single string.
pub fn call_string(
    abi: &EngineAbi,
    op: &str,
    call: impl FnOnce(*mut *mut c_char) -> *mut AbiError,
) -> BridgeResult<String> {
    call_out(abi, op, abi.free_string, call)?
        .into_string()?
        .ok_or_else(|| BridgeError::marshalling(format!("{op}: success without output")))
}

/// Run an engine call that reports "maybe a value" through `(has, value)` outs.
pub fn call_optional_u32(
    abi: &EngineAbi,
    call: impl FnOnce(*mut bool, *mut u32) -> *mut AbiError,
) -> BridgeResult<Option<u32>> {
    let mut has = false;
    let mut value = 0u32;
    check(abi, call(&mut has as *mut bool, &mut value as *mut u32))?;
    Ok(has.then_some(value))
}
