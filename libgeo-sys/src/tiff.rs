use libc::{c_char, c_int, c_short, c_uchar, c_ushort, c_void};

use crate::cstdio::va_list;

// http://www.simplesystems.org/libtiff/functions.html

#[repr(C)]
pub struct TIFF {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct TIFFField {
    _unused: [u8; 0],
}

#[cfg(tiff_ge_4_5)]
#[repr(C)]
pub struct TIFFOpenOptions {
    _unused: [u8; 0],
}

pub type tmsize_t = isize;
pub type ttag_t = u32;
pub type tstrip_t = u32;
pub type ttile_t = u32;
pub type tsample_t = u16;

/// Directory index; widened from 16 to 32 bits in libtiff 4.5.
#[cfg(tiff_ge_4_5)]
pub type tdir_t = u32;
#[cfg(not(tiff_ge_4_5))]
pub type tdir_t = u16;

pub mod TIFFDataType {
    pub type Type = libc::c_uint;
    pub const TIFF_NOTYPE: Type = 0;
    pub const TIFF_BYTE: Type = 1;
    pub const TIFF_ASCII: Type = 2;
    pub const TIFF_SHORT: Type = 3;
    pub const TIFF_LONG: Type = 4;
    pub const TIFF_RATIONAL: Type = 5;
    pub const TIFF_SBYTE: Type = 6;
    pub const TIFF_UNDEFINED: Type = 7;
    pub const TIFF_SSHORT: Type = 8;
    pub const TIFF_SLONG: Type = 9;
    pub const TIFF_SRATIONAL: Type = 10;
    pub const TIFF_FLOAT: Type = 11;
    pub const TIFF_DOUBLE: Type = 12;
    pub const TIFF_IFD: Type = 13;
    pub const TIFF_LONG8: Type = 16;
    pub const TIFF_SLONG8: Type = 17;
    pub const TIFF_IFD8: Type = 18;
}

/// Any data type, for [`TIFFFindField`].
pub const TIFF_ANY: TIFFDataType::Type = TIFFDataType::TIFF_NOTYPE;

/// Marker read/write counts of [`TIFFFieldInfo`].
pub const TIFF_VARIABLE: c_short = -1;
pub const TIFF_SPP: c_short = -2;
pub const TIFF_VARIABLE2: c_short = -3;

/// Field bit shared by all fields that live in the custom value list.
pub const FIELD_CUSTOM: c_ushort = 65;

/// Legacy field description accepted by [`TIFFMergeFieldInfo`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TIFFFieldInfo {
    pub field_tag: ttag_t,
    pub field_readcount: c_short,
    pub field_writecount: c_short,
    pub field_type: TIFFDataType::Type,
    pub field_bit: c_ushort,
    pub field_oktochange: c_uchar,
    pub field_passcount: c_uchar,
    pub field_name: *mut c_char,
}

pub type TIFFErrorHandler =
    Option<unsafe extern "C" fn(module: *const c_char, fmt: *const c_char, ap: va_list)>;

#[cfg(tiff_ge_4_5)]
pub type TIFFErrorHandlerExtR = Option<
    unsafe extern "C" fn(
        tif: *mut TIFF,
        user_data: *mut c_void,
        module: *const c_char,
        fmt: *const c_char,
        ap: va_list,
    ) -> c_int,
>;

pub type TIFFExtendProc = Option<unsafe extern "C" fn(tif: *mut TIFF)>;

extern "C" {
    pub fn TIFFGetVersion() -> *const c_char;

    // open / close
    pub fn TIFFOpen(filename: *const c_char, mode: *const c_char) -> *mut TIFF;
    pub fn TIFFClose(tif: *mut TIFF);
    pub fn TIFFFlush(tif: *mut TIFF) -> c_int;
    pub fn TIFFFileName(tif: *mut TIFF) -> *const c_char;

    // error reporting
    pub fn TIFFSetErrorHandler(handler: TIFFErrorHandler) -> TIFFErrorHandler;
    pub fn TIFFSetWarningHandler(handler: TIFFErrorHandler) -> TIFFErrorHandler;
    pub fn TIFFError(module: *const c_char, fmt: *const c_char, ...);
    pub fn TIFFWarning(module: *const c_char, fmt: *const c_char, ...);

    // tag registry
    pub fn TIFFSetTagExtender(extender: TIFFExtendProc) -> TIFFExtendProc;
    pub fn TIFFMergeFieldInfo(tif: *mut TIFF, info: *const TIFFFieldInfo, n: u32) -> c_int;
    pub fn TIFFFindField(tif: *mut TIFF, tag: ttag_t, dt: TIFFDataType::Type) -> *const TIFFField;
    pub fn TIFFFieldTag(fip: *const TIFFField) -> ttag_t;
    pub fn TIFFFieldName(fip: *const TIFFField) -> *const c_char;
    pub fn TIFFFieldDataType(fip: *const TIFFField) -> TIFFDataType::Type;
    pub fn TIFFFieldPassCount(fip: *const TIFFField) -> c_int;
    pub fn TIFFFieldReadCount(fip: *const TIFFField) -> c_int;
    pub fn TIFFFieldWriteCount(fip: *const TIFFField) -> c_int;

    // field access
    pub fn TIFFGetField(tif: *mut TIFF, tag: ttag_t, ...) -> c_int;
    pub fn TIFFGetFieldDefaulted(tif: *mut TIFF, tag: ttag_t, ...) -> c_int;
    pub fn TIFFSetField(tif: *mut TIFF, tag: ttag_t, ...) -> c_int;

    // layout
    pub fn TIFFIsTiled(tif: *mut TIFF) -> c_int;
    pub fn TIFFNumberOfStrips(tif: *mut TIFF) -> tstrip_t;
    pub fn TIFFNumberOfTiles(tif: *mut TIFF) -> ttile_t;
    pub fn TIFFStripSize(tif: *mut TIFF) -> tmsize_t;
    pub fn TIFFTileSize(tif: *mut TIFF) -> tmsize_t;
    pub fn TIFFComputeStrip(tif: *mut TIFF, row: u32, sample: tsample_t) -> tstrip_t;
    pub fn TIFFComputeTile(tif: *mut TIFF, x: u32, y: u32, z: u32, sample: tsample_t) -> ttile_t;

    // bulk transfer
    pub fn TIFFReadEncodedStrip(
        tif: *mut TIFF,
        strip: tstrip_t,
        buf: *mut c_void,
        size: tmsize_t,
    ) -> tmsize_t;
    pub fn TIFFWriteEncodedStrip(
        tif: *mut TIFF,
        strip: tstrip_t,
        data: *mut c_void,
        cc: tmsize_t,
    ) -> tmsize_t;
    pub fn TIFFReadEncodedTile(
        tif: *mut TIFF,
        tile: ttile_t,
        buf: *mut c_void,
        size: tmsize_t,
    ) -> tmsize_t;
    pub fn TIFFWriteEncodedTile(
        tif: *mut TIFF,
        tile: ttile_t,
        data: *mut c_void,
        cc: tmsize_t,
    ) -> tmsize_t;
    pub fn TIFFReadRGBAStrip(tif: *mut TIFF, row: u32, raster: *mut u32) -> c_int;
    pub fn TIFFReadRGBATile(tif: *mut TIFF, col: u32, row: u32, raster: *mut u32) -> c_int;

    // directories
    pub fn TIFFWriteDirectory(tif: *mut TIFF) -> c_int;
    pub fn TIFFNumberOfDirectories(tif: *mut TIFF) -> tdir_t;
    pub fn TIFFCurrentDirectory(tif: *mut TIFF) -> tdir_t;
    pub fn TIFFSetDirectory(tif: *mut TIFF, dirn: tdir_t) -> c_int;
}

#[cfg(tiff_ge_4_5)]
extern "C" {
    pub fn TIFFOpenOptionsAlloc() -> *mut TIFFOpenOptions;
    pub fn TIFFOpenOptionsFree(opts: *mut TIFFOpenOptions);
    pub fn TIFFOpenOptionsSetErrorHandlerExtR(
        opts: *mut TIFFOpenOptions,
        handler: TIFFErrorHandlerExtR,
        errorhandler_user_data: *mut c_void,
    );
    pub fn TIFFOpenOptionsSetWarningHandlerExtR(
        opts: *mut TIFFOpenOptions,
        handler: TIFFErrorHandlerExtR,
        warnhandler_user_data: *mut c_void,
    );
    pub fn TIFFOpenExt(
        filename: *const c_char,
        mode: *const c_char,
        opts: *mut TIFFOpenOptions,
    ) -> *mut TIFF;
}
