use std::ffi::{c_char, CStr, CString};
#[cfg(tiff_ge_4_5)]
use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Mutex, Once};

use libgeo_sys::{tdir_t, tmsize_t, va_list, TIFF};

use super::buffer::RgbaBuffer;
use super::fields::_install_custom_fields;
use super::tags;
use crate::config::_dispatch_tiff_message;
use crate::errors::{GeoError, Result, TiffMessageLevel};
use crate::options::OpenFlags;
use crate::utils::{_format_message, _path_to_c_string, _string};

/// Most recent libtiff error and warning messages of one handle (or of the process).
#[derive(Debug, Default)]
pub(crate) struct MessageSlot {
    error: Mutex<Option<String>>,
    warning: Mutex<Option<String>>,
}

impl MessageSlot {
    pub(crate) const fn new() -> Self {
        MessageSlot {
            error: Mutex::new(None),
            warning: Mutex::new(None),
        }
    }

    fn slot(&self, level: TiffMessageLevel) -> std::sync::MutexGuard<'_, Option<String>> {
        let slot = match level {
            TiffMessageLevel::Error => &self.error,
            TiffMessageLevel::Warning => &self.warning,
        };
        match slot.lock() {
            Ok(guard) => guard,
            Err(poison_error) => poison_error.into_inner(),
        }
    }

    pub(crate) fn record(&self, level: TiffMessageLevel, msg: String) {
        self.slot(level).replace(msg);
    }

    pub(crate) fn get(&self, level: TiffMessageLevel) -> Option<String> {
        self.slot(level).clone()
    }

    pub(crate) fn clear(&self) {
        self.slot(TiffMessageLevel::Error).take();
        self.slot(TiffMessageLevel::Warning).take();
    }
}

/// Messages libtiff reports without a handle, and every message on libtiff < 4.5.
static PROCESS_MESSAGES: MessageSlot = MessageSlot::new();
static HANDLERS: Once = Once::new();

unsafe fn _record_message(
    slot: &MessageSlot,
    level: TiffMessageLevel,
    module: *const c_char,
    fmt: *const c_char,
    ap: va_list,
) {
    let msg = _format_message(fmt, ap);
    let module = _string(module);
    _dispatch_tiff_message(level, &module, &msg);
    slot.record(level, msg);
}

unsafe extern "C" fn process_error_handler(module: *const c_char, fmt: *const c_char, ap: va_list) {
    _record_message(&PROCESS_MESSAGES, TiffMessageLevel::Error, module, fmt, ap);
}

unsafe extern "C" fn process_warning_handler(
    module: *const c_char,
    fmt: *const c_char,
    ap: va_list,
) {
    _record_message(&PROCESS_MESSAGES, TiffMessageLevel::Warning, module, fmt, ap);
}

#[cfg(tiff_ge_4_5)]
unsafe extern "C" fn handle_error_handler(
    _tif: *mut TIFF,
    user_data: *mut c_void,
    module: *const c_char,
    fmt: *const c_char,
    ap: va_list,
) -> c_int {
    if user_data.is_null() {
        return 0;
    }
    let slot = &*(user_data as *const MessageSlot);
    _record_message(slot, TiffMessageLevel::Error, module, fmt, ap);
    1
}

#[cfg(tiff_ge_4_5)]
unsafe extern "C" fn handle_warning_handler(
    _tif: *mut TIFF,
    user_data: *mut c_void,
    module: *const c_char,
    fmt: *const c_char,
    ap: va_list,
) -> c_int {
    if user_data.is_null() {
        return 0;
    }
    let slot = &*(user_data as *const MessageSlot);
    _record_message(slot, TiffMessageLevel::Warning, module, fmt, ap);
    1
}

/// Replaces libtiff's default stderr handlers, once per process.
pub(crate) fn _install_process_handlers() {
    HANDLERS.call_once(|| unsafe {
        libgeo_sys::TIFFSetErrorHandler(Some(process_error_handler));
        libgeo_sys::TIFFSetWarningHandler(Some(process_warning_handler));
    });
}

/// Last libtiff error reported outside of any open [`Tiff`].
///
/// With libtiff older than 4.5 messages cannot be attributed to a handle, so this
/// returns the last error of any handle in the process.
pub fn last_error() -> Option<String> {
    PROCESS_MESSAGES.get(TiffMessageLevel::Error)
}

#[cfg(tiff_ge_4_5)]
unsafe fn _open_c(c_path: &CStr, c_mode: &CStr, messages: &MessageSlot) -> *mut TIFF {
    let opts = libgeo_sys::TIFFOpenOptionsAlloc();
    if opts.is_null() {
        return ptr::null_mut();
    }
    let user_data = messages as *const MessageSlot as *mut c_void;
    libgeo_sys::TIFFOpenOptionsSetErrorHandlerExtR(opts, Some(handle_error_handler), user_data);
    libgeo_sys::TIFFOpenOptionsSetWarningHandlerExtR(
        opts,
        Some(handle_warning_handler),
        user_data,
    );
    let c_tiff = libgeo_sys::TIFFOpenExt(c_path.as_ptr(), c_mode.as_ptr(), opts);
    libgeo_sys::TIFFOpenOptionsFree(opts);
    c_tiff
}

#[cfg(not(tiff_ge_4_5))]
unsafe fn _open_c(c_path: &CStr, c_mode: &CStr, _messages: &MessageSlot) -> *mut TIFF {
    libgeo_sys::TIFFOpen(c_path.as_ptr(), c_mode.as_ptr())
}

/// An open TIFF file.
///
/// The file is closed (and flushed, if writable) when the value is dropped. Use
/// [`close`](Tiff::close) to observe flush errors.
#[derive(Debug)]
pub struct Tiff {
    c_tiff: *mut TIFF,
    path: PathBuf,
    flags: OpenFlags,
    #[cfg(tiff_ge_4_5)]
    messages: Box<MessageSlot>,
}

// libtiff handles may move between threads, but are not safe for shared use.
unsafe impl Send for Tiff {}

impl Tiff {
    /// Returns the wrapped C pointer
    ///
    /// The pointer stays valid for the lifetime of `self`.
    pub fn c_tiff(&self) -> *mut TIFF {
        self.c_tiff
    }

    /// Open an existing file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Tiff> {
        Self::open_ex(path, OpenFlags::READ)
    }

    /// Create a new file, truncating any existing file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Tiff> {
        Self::open_ex(path, OpenFlags::WRITE)
    }

    /// Open a file with a libtiff mode string such as `"r"`, `"w8"` or `"a"`.
    pub fn open_with_mode<P: AsRef<Path>>(path: P, mode: &str) -> Result<Tiff> {
        Self::open_ex(path, OpenFlags::from_mode_string(mode)?)
    }

    /// Open a file with explicit [`OpenFlags`].
    ///
    /// The first open in the process registers the GeoTIFF fields with libtiff.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// # fn main() -> libgeo::errors::Result<()> {
    /// use libgeo::raster::Tiff;
    /// use libgeo::OpenFlags;
    /// let tiff = Tiff::open_ex("/tmp/big.tif", OpenFlags::WRITE | OpenFlags::BIG_TIFF)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open_ex<P: AsRef<Path>>(path: P, flags: OpenFlags) -> Result<Tiff> {
        let path = path.as_ref();
        let c_mode = CString::new(flags.mode_string()?)?;
        let c_path = _path_to_c_string(path)?;

        _install_process_handlers();
        _install_custom_fields();

        #[cfg(tiff_ge_4_5)]
        let messages = Box::new(MessageSlot::new());
        #[cfg(tiff_ge_4_5)]
        let slot: &MessageSlot = &messages;
        #[cfg(not(tiff_ge_4_5))]
        let slot: &MessageSlot = &PROCESS_MESSAGES;

        slot.clear();
        let c_tiff = unsafe { _open_c(&c_path, &c_mode, slot) };
        if c_tiff.is_null() {
            let msg = slot
                .get(TiffMessageLevel::Error)
                .unwrap_or_else(|| format!("Unable to open '{}'", path.display()));
            return Err(GeoError::NullPointer {
                method_name: "TIFFOpen",
                msg,
            });
        }
        log::debug!(target: "libgeo::tiff", "opened '{}' with mode {:?}", path.display(), flags);

        Ok(Tiff {
            c_tiff,
            path: path.to_path_buf(),
            flags,
            #[cfg(tiff_ge_4_5)]
            messages,
        })
    }

    /// Flush pending writes and close the file.
    pub fn close(mut self) -> Result<()> {
        let result = if self.flags.is_writable() {
            self.flush()
        } else {
            Ok(())
        };
        unsafe { libgeo_sys::TIFFClose(self.c_tiff) };
        self.c_tiff = ptr::null_mut();
        result
    }

    /// Write pending data and directory changes to the file.
    pub fn flush(&mut self) -> Result<()> {
        self._reset_messages();
        let rv = unsafe { libgeo_sys::TIFFFlush(self.c_tiff) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFFlush"));
        }
        Ok(())
    }

    /// The path this file was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name libtiff reports for this file.
    pub fn file_name(&self) -> String {
        _string(unsafe { libgeo_sys::TIFFFileName(self.c_tiff) })
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    #[cfg(tiff_ge_4_5)]
    fn messages(&self) -> &MessageSlot {
        &self.messages
    }

    #[cfg(not(tiff_ge_4_5))]
    fn messages(&self) -> &MessageSlot {
        &PROCESS_MESSAGES
    }

    /// The error message libtiff reported during the most recent operation on this file.
    pub fn last_error(&self) -> Option<String> {
        self.messages().get(TiffMessageLevel::Error)
    }

    /// The warning message libtiff reported during the most recent operation on this file.
    pub fn last_warning(&self) -> Option<String> {
        self.messages().get(TiffMessageLevel::Warning)
    }

    pub(crate) fn _reset_messages(&self) {
        self.messages().clear();
    }

    pub(crate) fn _last_tiff_err(&self, method_name: &'static str) -> GeoError {
        GeoError::TiffError {
            method_name,
            msg: self.last_error().unwrap_or_default(),
        }
    }

    /// Returns `true` if the image is organized in tiles rather than strips.
    pub fn is_tiled(&self) -> bool {
        unsafe { libgeo_sys::TIFFIsTiled(self.c_tiff) != 0 }
    }

    /// Number of strips in the current directory.
    pub fn strip_count(&self) -> u32 {
        unsafe { libgeo_sys::TIFFNumberOfStrips(self.c_tiff) }
    }

    /// Size in bytes of a decoded full strip, `0` if it cannot be computed.
    pub fn strip_size(&self) -> usize {
        usize::try_from(unsafe { libgeo_sys::TIFFStripSize(self.c_tiff) }).unwrap_or(0)
    }

    /// Number of tiles in the current directory.
    pub fn tile_count(&self) -> u32 {
        unsafe { libgeo_sys::TIFFNumberOfTiles(self.c_tiff) }
    }

    /// Size in bytes of a decoded tile, `0` if it cannot be computed.
    pub fn tile_size(&self) -> usize {
        usize::try_from(unsafe { libgeo_sys::TIFFTileSize(self.c_tiff) }).unwrap_or(0)
    }

    /// Index of the strip holding `row` of `sample`.
    pub fn compute_strip(&self, row: u32, sample: u16) -> u32 {
        unsafe { libgeo_sys::TIFFComputeStrip(self.c_tiff, row, sample) }
    }

    /// Index of the tile holding pixel `x`, `y` of `sample`.
    pub fn compute_tile(&self, x: u32, y: u32, sample: u16) -> u32 {
        unsafe { libgeo_sys::TIFFComputeTile(self.c_tiff, x, y, 0, sample) }
    }

    /// Image `(width, length)` in pixels.
    pub fn raster_size(&self) -> Result<(u32, u32)> {
        let width = self.get_field::<u32>(tags::IMAGE_WIDTH)?;
        let length = self.get_field::<u32>(tags::IMAGE_LENGTH)?;
        Ok((width.unwrap_or_default(), length.unwrap_or_default()))
    }

    /// Tile `(width, length)` in pixels, `None` for striped images.
    pub fn tile_dimensions(&self) -> Result<Option<(u32, u32)>> {
        if !self.is_tiled() {
            return Ok(None);
        }
        let width = self.get_field::<u32>(tags::TILE_WIDTH)?;
        let length = self.get_field::<u32>(tags::TILE_LENGTH)?;
        Ok(width.zip(length))
    }

    /// Rows per strip, defaulting to the whole image as libtiff does.
    pub fn rows_per_strip(&self) -> Result<u32> {
        Ok(self
            .get_field::<u32>(tags::ROWS_PER_STRIP)?
            .unwrap_or(u32::MAX))
    }

    /// Read and decode strip `strip` into `buf`.
    ///
    /// At most `buf.len()` bytes are written. Returns the number of bytes read.
    pub fn read_encoded_strip(&self, strip: u32, buf: &mut [u8]) -> Result<usize> {
        let count = self.strip_count();
        if strip >= count {
            return Err(GeoError::BadArgument(format!(
                "strip {strip} out of range, the image has {count} strips"
            )));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self._reset_messages();
        let rv = unsafe {
            libgeo_sys::TIFFReadEncodedStrip(
                self.c_tiff,
                strip,
                buf.as_mut_ptr().cast(),
                buf.len() as tmsize_t,
            )
        };
        if rv < 0 {
            return Err(self._last_tiff_err("TIFFReadEncodedStrip"));
        }
        Ok(rv as usize)
    }

    /// Encode and write `data` as strip `strip`.
    ///
    /// Returns the number of bytes written.
    pub fn write_encoded_strip(&mut self, strip: u32, data: &[u8]) -> Result<usize> {
        // libtiff may byte swap or encode the data in place
        let mut scratch = data.to_vec();
        self._reset_messages();
        let rv = unsafe {
            libgeo_sys::TIFFWriteEncodedStrip(
                self.c_tiff,
                strip,
                scratch.as_mut_ptr().cast(),
                scratch.len() as tmsize_t,
            )
        };
        if rv < 0 {
            return Err(self._last_tiff_err("TIFFWriteEncodedStrip"));
        }
        Ok(rv as usize)
    }

    /// Read and decode tile `tile` into `buf`.
    ///
    /// At most `buf.len()` bytes are written. Returns the number of bytes read.
    pub fn read_encoded_tile(&self, tile: u32, buf: &mut [u8]) -> Result<usize> {
        let count = self.tile_count();
        if tile >= count {
            return Err(GeoError::BadArgument(format!(
                "tile {tile} out of range, the image has {count} tiles"
            )));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self._reset_messages();
        let rv = unsafe {
            libgeo_sys::TIFFReadEncodedTile(
                self.c_tiff,
                tile,
                buf.as_mut_ptr().cast(),
                buf.len() as tmsize_t,
            )
        };
        if rv < 0 {
            return Err(self._last_tiff_err("TIFFReadEncodedTile"));
        }
        Ok(rv as usize)
    }

    /// Encode and write `data` as tile `tile`.
    ///
    /// Returns the number of bytes written.
    pub fn write_encoded_tile(&mut self, tile: u32, data: &[u8]) -> Result<usize> {
        let mut scratch = data.to_vec();
        self._reset_messages();
        let rv = unsafe {
            libgeo_sys::TIFFWriteEncodedTile(
                self.c_tiff,
                tile,
                scratch.as_mut_ptr().cast(),
                scratch.len() as tmsize_t,
            )
        };
        if rv < 0 {
            return Err(self._last_tiff_err("TIFFWriteEncodedTile"));
        }
        Ok(rv as usize)
    }

    /// `(cols, rows)` of the RGBA raster libtiff produces for the strip starting at `row`.
    fn _rgba_strip_size(&self, row: u32) -> Result<(usize, usize)> {
        let (width, length) = self.raster_size()?;
        let rows_per_strip = self.rows_per_strip()?.max(1);
        if row >= length || row % rows_per_strip != 0 {
            return Err(GeoError::BadArgument(format!(
                "row {row} does not start a strip (rows per strip {rows_per_strip}, length {length})"
            )));
        }
        let rows = rows_per_strip.min(length - row);
        Ok((width as usize, rows as usize))
    }

    /// `(cols, rows)` of the RGBA raster libtiff produces for one tile.
    fn _rgba_tile_size(&self, col: u32, row: u32) -> Result<(usize, usize)> {
        let (width, length) = self.raster_size()?;
        let Some((tile_width, tile_length)) = self.tile_dimensions()? else {
            return Err(GeoError::BadArgument(format!(
                "'{}' is not tiled",
                self.path.display()
            )));
        };
        if col >= width
            || row >= length
            || col % tile_width.max(1) != 0
            || row % tile_length.max(1) != 0
        {
            return Err(GeoError::BadArgument(format!(
                "({col}, {row}) is not the origin of a tile ({tile_width}x{tile_length})"
            )));
        }
        Ok((tile_width as usize, tile_length as usize))
    }

    fn _check_rgba_buf(size: (usize, usize), buf: &[u32]) -> Result<()> {
        let required = size
            .0
            .checked_mul(size.1)
            .ok_or_else(|| GeoError::BadArgument(format!("RGBA raster {size:?} is too large")))?;
        if buf.len() < required {
            return Err(GeoError::BufferTooSmall {
                required,
                actual: buf.len(),
            });
        }
        Ok(())
    }

    /// Decode the strip starting at `row` into packed RGBA pixels.
    ///
    /// `buf` must hold `width * min(rows_per_strip, length - row)` pixels. Pixels are packed
    /// as libtiff defines them (see [`rgba_components`](super::rgba_components)) with the
    /// bottom-left pixel first.
    pub fn read_rgba_strip(&self, row: u32, buf: &mut [u32]) -> Result<()> {
        let size = self._rgba_strip_size(row)?;
        Self::_check_rgba_buf(size, buf)?;
        self._reset_messages();
        let rv = unsafe { libgeo_sys::TIFFReadRGBAStrip(self.c_tiff, row, buf.as_mut_ptr()) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFReadRGBAStrip"));
        }
        Ok(())
    }

    /// Decode the tile whose top-left pixel is `col`, `row` into packed RGBA pixels.
    ///
    /// `buf` must hold `tile_width * tile_length` pixels. Pixels of edge tiles lying outside
    /// the image are zero.
    pub fn read_rgba_tile(&self, col: u32, row: u32, buf: &mut [u32]) -> Result<()> {
        let size = self._rgba_tile_size(col, row)?;
        Self::_check_rgba_buf(size, buf)?;
        self._reset_messages();
        let rv =
            unsafe { libgeo_sys::TIFFReadRGBATile(self.c_tiff, col, row, buf.as_mut_ptr()) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFReadRGBATile"));
        }
        Ok(())
    }

    /// Decode the strip starting at `row` into a new [`RgbaBuffer`].
    pub fn rgba_strip(&self, row: u32) -> Result<RgbaBuffer> {
        let size = self._rgba_strip_size(row)?;
        let mut data = vec![0u32; size.0 * size.1];
        self.read_rgba_strip(row, &mut data)?;
        Ok(RgbaBuffer::new(size, data))
    }

    /// Decode the tile whose top-left pixel is `col`, `row` into a new [`RgbaBuffer`].
    pub fn rgba_tile(&self, col: u32, row: u32) -> Result<RgbaBuffer> {
        let size = self._rgba_tile_size(col, row)?;
        let mut data = vec![0u32; size.0 * size.1];
        self.read_rgba_tile(col, row, &mut data)?;
        Ok(RgbaBuffer::new(size, data))
    }

    /// Finish the current directory so that another image can follow.
    pub fn write_directory(&mut self) -> Result<()> {
        self._reset_messages();
        let rv = unsafe { libgeo_sys::TIFFWriteDirectory(self.c_tiff) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFWriteDirectory"));
        }
        Ok(())
    }

    /// Number of images (directories) in the file.
    pub fn directory_count(&self) -> u32 {
        u32::from(unsafe { libgeo_sys::TIFFNumberOfDirectories(self.c_tiff) })
    }

    /// Index of the current directory.
    pub fn current_directory(&self) -> u32 {
        u32::from(unsafe { libgeo_sys::TIFFCurrentDirectory(self.c_tiff) })
    }

    /// Make directory `index` the current one.
    pub fn set_directory(&mut self, index: u32) -> Result<()> {
        let dirn = tdir_t::try_from(index)
            .map_err(|_| GeoError::BadArgument(format!("directory index {index} is too large")))?;
        self._reset_messages();
        let rv = unsafe { libgeo_sys::TIFFSetDirectory(self.c_tiff, dirn) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFSetDirectory"));
        }
        Ok(())
    }
}

impl Drop for Tiff {
    fn drop(&mut self) {
        if !self.c_tiff.is_null() {
            unsafe { libgeo_sys::TIFFClose(self.c_tiff) };
        }
    }
}
