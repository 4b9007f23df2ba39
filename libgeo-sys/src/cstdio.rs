use libc::{c_char, c_int, c_void, size_t};

/// A `va_list` as received by libtiff's message handlers.
///
/// Handlers only forward it to [`vsnprintf`], so it is kept opaque. On every supported
/// target the C ABI hands it over as a pointer (x86_64 System V passes the
/// `__va_list_tag` array decayed, AArch64 passes the 32 byte struct by reference, and
/// Windows/Apple targets use a plain `char *`).
pub type va_list = *mut c_void;

extern "C" {
    pub fn vsnprintf(s: *mut c_char, n: size_t, format: *const c_char, ap: va_list) -> c_int;
}
