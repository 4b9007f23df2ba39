use libgeo_sys::va_list;
use std::ffi::{c_char, CStr, CString};
use std::path::Path;

use crate::errors::*;

/// Upper bound for one formatted libtiff message; longer messages are truncated.
const MESSAGE_CAPACITY: usize = 4096;

pub fn _string(raw_ptr: *const c_char) -> String {
    if raw_ptr.is_null() {
        return String::new();
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

pub fn _string_array(raw_ptr: *const *const c_char, len: usize) -> Vec<String> {
    if raw_ptr.is_null() {
        return Vec::new();
    }
    (0..len)
        .map(|i| unsafe { raw_ptr.add(i).read() })
        .take_while(|ptr| !ptr.is_null())
        .map(_string)
        .collect()
}

/// Expands a printf-style message as handed to libtiff's error handlers.
///
/// # Safety
/// `fmt` and `ap` must come straight from libtiff's handler invocation.
pub unsafe fn _format_message(fmt: *const c_char, ap: va_list) -> String {
    if fmt.is_null() {
        return String::new();
    }
    let mut buf = vec![0u8; MESSAGE_CAPACITY];
    let written = libgeo_sys::vsnprintf(buf.as_mut_ptr() as *mut c_char, buf.len(), fmt, ap);
    if written < 0 {
        // fall back to the unexpanded template
        return _string(fmt);
    }
    let len = (written as usize).min(buf.len() - 1);
    buf.truncate(len);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn _path_to_c_string(path: &Path) -> Result<CString> {
    let path_str = path.to_string_lossy();
    CString::new(path_str.as_ref()).map_err(Into::into)
}
