//! C ABI over the raster and projection bindings
//!
//! Functions follow C conventions: failures are signalled by sentinel values (null, `0`,
//! `false`, `-1`) and the message describing the failure is kept per thread, see
//! [`geo_tiff_last_error`]. A null handle is never dereferenced; it fails like any other
//! error and records `"invalid ... handle"`.
//!
//! Output arrays are passed with their capacity. Values beyond the capacity are dropped
//! and the functions report how many values were written.

use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::ptr;
use std::slice;

use crate::errors::{GeoError, Result};
use crate::raster::{Tiff, TiffType};
use crate::spatial_ref::{CoordTransform, Projection};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn _c_message(msg: String) -> CString {
    CString::new(msg).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

fn set_last_error(error: &GeoError) {
    log::debug!(target: "libgeo::ffi", "{error}");
    let msg = match error {
        // the library's own wording is what C callers expect to see
        GeoError::TiffError { msg, .. } | GeoError::NullPointer { msg, .. } if !msg.is_empty() => {
            msg.clone()
        }
        other => other.to_string(),
    };
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(_c_message(msg));
    });
}

fn set_last_error_msg(msg: &str) {
    set_last_error(&GeoError::BadArgument(msg.to_string()));
}

/// Opaque handle to an open TIFF file.
pub struct GeoTiff {
    _private: [u8; 0],
}

/// Opaque handle to a projection.
pub struct GeoProjection {
    _private: [u8; 0],
}

unsafe fn tiff_mut<'a>(handle: *mut GeoTiff) -> Option<&'a mut Tiff> {
    let tiff = handle.cast::<Tiff>().as_mut();
    if tiff.is_none() {
        set_last_error_msg("invalid TIFF handle");
    }
    tiff
}

unsafe fn projection_ref<'a>(handle: *const GeoProjection) -> Option<&'a Projection> {
    handle.cast::<Projection>().as_ref()
}

unsafe fn str_arg<'a>(value: *const c_char, what: &str) -> Option<&'a str> {
    if value.is_null() {
        set_last_error_msg(&format!("{what} is null"));
        return None;
    }
    match CStr::from_ptr(value).to_str() {
        Ok(value) => Some(value),
        Err(err) => {
            set_last_error(&err.into());
            None
        }
    }
}

unsafe fn slice_arg<'a, T>(values: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(Default::default());
    }
    if values.is_null() {
        set_last_error_msg("buffer is null");
        return None;
    }
    Some(slice::from_raw_parts(values, len))
}

unsafe fn slice_arg_mut<'a, T>(values: *mut T, len: usize) -> Option<&'a mut [T]> {
    if len == 0 {
        return Some(Default::default());
    }
    if values.is_null() {
        set_last_error_msg("buffer is null");
        return None;
    }
    Some(slice::from_raw_parts_mut(values, len))
}

fn _ok_or_record<T>(result: Result<T>) -> Option<T> {
    result.map_err(|err| set_last_error(&err)).ok()
}

/// The most recent error message recorded on this thread, `""` if there was none.
///
/// The pointer stays valid until the next failing call on the same thread.
#[no_mangle]
pub extern "C" fn geo_tiff_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => msg.as_ptr(),
        None => c"".as_ptr(),
    })
}

/// Open `path` with a libtiff `mode` such as `"r"` or `"w"`. Returns null on failure.
///
/// # Safety
/// `path` and `mode` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_open(path: *const c_char, mode: *const c_char) -> *mut GeoTiff {
    let (Some(path), Some(mode)) = (str_arg(path, "path"), str_arg(mode, "mode")) else {
        return ptr::null_mut();
    };
    match _ok_or_record(Tiff::open_with_mode(path, mode)) {
        Some(tiff) => Box::into_raw(Box::new(tiff)).cast(),
        None => ptr::null_mut(),
    }
}

/// Close a handle returned by [`geo_tiff_open`]. Returns `false` if flushing failed.
///
/// # Safety
/// `handle` must be null or a live handle; it must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_close(handle: *mut GeoTiff) -> bool {
    if handle.is_null() {
        set_last_error_msg("invalid TIFF handle");
        return false;
    }
    let tiff = Box::from_raw(handle.cast::<Tiff>());
    _ok_or_record(tiff.close()).is_some()
}

unsafe fn _get_values<T: TiffType>(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *mut T,
    capacity: usize,
) -> c_int {
    let Some(tiff) = tiff_mut(handle) else {
        return 0;
    };
    let Some(buf) = slice_arg_mut(values, capacity) else {
        return 0;
    };
    _ok_or_record(tiff.get_field_array_into(tag, buf))
        .map_or(0, |count| c_int::try_from(count).unwrap_or(c_int::MAX))
}

unsafe fn _set_value<T: TiffType>(handle: *mut GeoTiff, tag: c_uint, value: T) -> bool {
    let Some(tiff) = tiff_mut(handle) else {
        return false;
    };
    _ok_or_record(tiff.set_field(tag, value)).is_some()
}

unsafe fn _set_values<T: TiffType>(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *const T,
    count: usize,
) -> bool {
    let Some(tiff) = tiff_mut(handle) else {
        return false;
    };
    let Some(values) = slice_arg(values, count) else {
        return false;
    };
    _ok_or_record(tiff.set_field_array(tag, values)).is_some()
}

/// Copy the ASCII field `tag` into `buf`, NUL-terminated and truncated to `capacity`.
///
/// Returns the number of bytes written without the terminator, `0` if the field is not
/// set.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_get_field_string(
    handle: *mut GeoTiff,
    tag: c_uint,
    buf: *mut c_char,
    capacity: usize,
) -> c_int {
    let Some(tiff) = tiff_mut(handle) else {
        return 0;
    };
    let Some(buf) = slice_arg_mut(buf.cast::<u8>(), capacity) else {
        return 0;
    };
    let Some(Some(value)) = _ok_or_record(tiff.get_field_string(tag)) else {
        return 0;
    };
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };
    let len = value.len().min(room);
    buf[..len].copy_from_slice(&value.as_bytes()[..len]);
    buf[len] = 0;
    c_int::try_from(len).unwrap_or(c_int::MAX)
}

/// Copy up to `capacity` values of field `tag`. Returns the number of values written.
///
/// # Safety
/// `handle` must be null or live; `values` must hold `capacity` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_get_field_int(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *mut i32,
    capacity: usize,
) -> c_int {
    _get_values(handle, tag, values, capacity)
}

/// See [`geo_tiff_get_field_int`].
///
/// # Safety
/// `handle` must be null or live; `values` must hold `capacity` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_get_field_short(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *mut i16,
    capacity: usize,
) -> c_int {
    _get_values(handle, tag, values, capacity)
}

/// See [`geo_tiff_get_field_int`].
///
/// # Safety
/// `handle` must be null or live; `values` must hold `capacity` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_get_field_double(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *mut f64,
    capacity: usize,
) -> c_int {
    _get_values(handle, tag, values, capacity)
}

/// See [`geo_tiff_get_field_int`].
///
/// # Safety
/// `handle` must be null or live; `values` must hold `capacity` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_get_field_float(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *mut f32,
    capacity: usize,
) -> c_int {
    _get_values(handle, tag, values, capacity)
}

/// # Safety
/// `handle` must be null or live; `value` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_string(
    handle: *mut GeoTiff,
    tag: c_uint,
    value: *const c_char,
) -> bool {
    let Some(tiff) = tiff_mut(handle) else {
        return false;
    };
    let Some(value) = str_arg(value, "value") else {
        return false;
    };
    _ok_or_record(tiff.set_field_string(tag, value)).is_some()
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_int(handle: *mut GeoTiff, tag: c_uint, value: i32) -> bool {
    _set_value(handle, tag, value)
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_short(
    handle: *mut GeoTiff,
    tag: c_uint,
    value: i16,
) -> bool {
    _set_value(handle, tag, value)
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_double(
    handle: *mut GeoTiff,
    tag: c_uint,
    value: f64,
) -> bool {
    _set_value(handle, tag, value)
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_float(
    handle: *mut GeoTiff,
    tag: c_uint,
    value: f32,
) -> bool {
    _set_value(handle, tag, value)
}

/// # Safety
/// `handle` must be null or live; `values` must hold `count` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_int_array(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *const i32,
    count: usize,
) -> bool {
    _set_values(handle, tag, values, count)
}

/// # Safety
/// `handle` must be null or live; `values` must hold `count` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_short_array(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *const i16,
    count: usize,
) -> bool {
    _set_values(handle, tag, values, count)
}

/// # Safety
/// `handle` must be null or live; `values` must hold `count` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_double_array(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *const f64,
    count: usize,
) -> bool {
    _set_values(handle, tag, values, count)
}

/// # Safety
/// `handle` must be null or live; `values` must hold `count` elements.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_set_field_float_array(
    handle: *mut GeoTiff,
    tag: c_uint,
    values: *const f32,
    count: usize,
) -> bool {
    _set_values(handle, tag, values, count)
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_is_tiled(handle: *mut GeoTiff) -> bool {
    tiff_mut(handle).is_some_and(|tiff| tiff.is_tiled())
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_number_of_strips(handle: *mut GeoTiff) -> u32 {
    tiff_mut(handle).map_or(0, |tiff| tiff.strip_count())
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_strip_size(handle: *mut GeoTiff) -> i64 {
    tiff_mut(handle).map_or(0, |tiff| tiff.strip_size() as i64)
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_number_of_tiles(handle: *mut GeoTiff) -> u32 {
    tiff_mut(handle).map_or(0, |tiff| tiff.tile_count())
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_tile_size(handle: *mut GeoTiff) -> i64 {
    tiff_mut(handle).map_or(0, |tiff| tiff.tile_size() as i64)
}

/// Decode strip `strip` into `buf`. Returns the number of bytes read, `-1` on failure.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_read_strip(
    handle: *mut GeoTiff,
    strip: u32,
    buf: *mut u8,
    size: usize,
) -> i64 {
    let (Some(tiff), Some(buf)) = (tiff_mut(handle), slice_arg_mut(buf, size)) else {
        return -1;
    };
    _ok_or_record(tiff.read_encoded_strip(strip, buf)).map_or(-1, |read| read as i64)
}

/// Encode `size` bytes of `buf` as strip `strip`. Returns the bytes written, `-1` on
/// failure.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_write_strip(
    handle: *mut GeoTiff,
    strip: u32,
    buf: *const u8,
    size: usize,
) -> i64 {
    let (Some(tiff), Some(data)) = (tiff_mut(handle), slice_arg(buf, size)) else {
        return -1;
    };
    _ok_or_record(tiff.write_encoded_strip(strip, data)).map_or(-1, |written| written as i64)
}

/// Decode tile `tile` into `buf`. Returns the number of bytes read, `-1` on failure.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_read_tile(
    handle: *mut GeoTiff,
    tile: u32,
    buf: *mut u8,
    size: usize,
) -> i64 {
    let (Some(tiff), Some(buf)) = (tiff_mut(handle), slice_arg_mut(buf, size)) else {
        return -1;
    };
    _ok_or_record(tiff.read_encoded_tile(tile, buf)).map_or(-1, |read| read as i64)
}

/// Encode `size` bytes of `buf` as tile `tile`. Returns the bytes written, `-1` on failure.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_write_tile(
    handle: *mut GeoTiff,
    tile: u32,
    buf: *const u8,
    size: usize,
) -> i64 {
    let (Some(tiff), Some(data)) = (tiff_mut(handle), slice_arg(buf, size)) else {
        return -1;
    };
    _ok_or_record(tiff.write_encoded_tile(tile, data)).map_or(-1, |written| written as i64)
}

/// Decode the strip starting at `row` into packed RGBA pixels, bottom row first.
///
/// `capacity` is the number of pixels `buf` holds.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `capacity` pixels.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_read_rgba_strip(
    handle: *mut GeoTiff,
    row: u32,
    buf: *mut u32,
    capacity: usize,
) -> bool {
    let (Some(tiff), Some(buf)) = (tiff_mut(handle), slice_arg_mut(buf, capacity)) else {
        return false;
    };
    _ok_or_record(tiff.read_rgba_strip(row, buf)).is_some()
}

/// Decode the tile with top-left pixel `col`, `row` into packed RGBA pixels, bottom row
/// first.
///
/// # Safety
/// `handle` must be null or live; `buf` must hold `capacity` pixels.
#[no_mangle]
pub unsafe extern "C" fn geo_tiff_read_rgba_tile(
    handle: *mut GeoTiff,
    col: u32,
    row: u32,
    buf: *mut u32,
    capacity: usize,
) -> bool {
    let (Some(tiff), Some(buf)) = (tiff_mut(handle), slice_arg_mut(buf, capacity)) else {
        return false;
    };
    _ok_or_record(tiff.read_rgba_tile(col, row, buf)).is_some()
}

/// Parse a projection definition. Returns null on failure.
///
/// # Safety
/// `definition` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn geo_proj_create(definition: *const c_char) -> *mut GeoProjection {
    let Some(definition) = str_arg(definition, "definition") else {
        return ptr::null_mut();
    };
    match _ok_or_record(Projection::from_definition(definition)) {
        Some(projection) => Box::into_raw(Box::new(projection)).cast(),
        None => ptr::null_mut(),
    }
}

/// Release a handle returned by [`geo_proj_create`].
///
/// # Safety
/// `handle` must be null or live; it must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn geo_proj_destroy(handle: *mut GeoProjection) {
    if !handle.is_null() {
        drop(Box::from_raw(handle.cast::<Projection>()));
    }
}

fn _error_string(error: &GeoError) -> *mut c_char {
    log::debug!(target: "libgeo::ffi", "{error}");
    _c_message(error.to_string()).into_raw()
}

/// Transform `count` points in place from `src` to `dst`; point `i` is read from index
/// `i * offset` of each array. `zs` may be null.
///
/// Returns null on success, otherwise an error message to release with
/// [`geo_string_free`]. Null handles are reported as an error.
///
/// # Safety
/// Handles must be null or live; the arrays must hold `(count - 1) * offset + 1` values.
#[no_mangle]
pub unsafe extern "C" fn geo_proj_transform(
    src: *const GeoProjection,
    dst: *const GeoProjection,
    count: usize,
    offset: usize,
    xs: *mut f64,
    ys: *mut f64,
    zs: *mut f64,
) -> *mut c_char {
    let (Some(src), Some(dst)) = (projection_ref(src), projection_ref(dst)) else {
        return _error_string(&GeoError::BadArgument(
            "invalid projection handle".to_string(),
        ));
    };
    if offset == 0 {
        return _error_string(&GeoError::BadArgument(
            "point offset must be at least 1".to_string(),
        ));
    }
    let len = match count {
        0 => 0,
        n => match (n - 1).checked_mul(offset).and_then(|last| last.checked_add(1)) {
            Some(len) => len,
            None => {
                return _error_string(&GeoError::BadArgument(format!(
                    "{count} points at offset {offset} overflow"
                )))
            }
        },
    };
    if len > 0 && (xs.is_null() || ys.is_null()) {
        return _error_string(&GeoError::BadArgument(
            "coordinate array is null".to_string(),
        ));
    }
    let (xs, ys): (&mut [f64], &mut [f64]) = if len == 0 {
        (Default::default(), Default::default())
    } else {
        (
            slice::from_raw_parts_mut(xs, len),
            slice::from_raw_parts_mut(ys, len),
        )
    };
    let zs = if zs.is_null() || len == 0 {
        None
    } else {
        Some(slice::from_raw_parts_mut(zs, len))
    };
    let result = CoordTransform::new(src, dst)
        .and_then(|transform| transform.transform_strided(count, offset, xs, ys, zs));
    match result {
        Ok(()) => ptr::null_mut(),
        Err(err) => _error_string(&err),
    }
}

/// Point PROJ at resource files in `path`, for the whole process.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn geo_proj_set_path(path: *const c_char) -> bool {
    let Some(path) = str_arg(path, "path") else {
        return false;
    };
    _ok_or_record(crate::config::set_proj_search_path(path)).is_some()
}

/// Release a string returned by this library.
///
/// # Safety
/// `s` must be null or a string returned by [`geo_proj_transform`], released only once.
#[no_mangle]
pub unsafe extern "C" fn geo_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
