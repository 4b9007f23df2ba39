use std::borrow::Cow;
use std::ffi::{c_char, c_int, c_short, c_uint, c_void, CString};
use std::ptr;
use std::sync::{Mutex, Once, OnceLock};

use chrono::NaiveDateTime;
use libgeo_sys::{
    TIFFExtendProc, TIFFFieldDataType, TIFFFieldInfo, TIFFFieldName, TIFFFieldPassCount,
    TIFFFieldReadCount, TIFFFieldTag, TIFFFieldWriteCount, TIFFFindField, TIFFGetFieldDefaulted,
    TIFFMergeFieldInfo, TIFFSetField, TIFFSetTagExtender, FIELD_CUSTOM, TIFF, TIFF_ANY,
    TIFF_SPP, TIFF_VARIABLE, TIFF_VARIABLE2,
};

use super::tags;
use super::types::{TiffDataType, TiffType, VarArg};
use super::Tiff;
use crate::errors::{GeoError, Result};
use crate::utils::_string;

/// Format of the `DateTime` tag.
const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Number of values a field holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldCount {
    /// A fixed number of values.
    Fixed(u16),
    /// Any number of values up to `u16::MAX`.
    Variable,
    /// Any number of values up to `u32::MAX`.
    Variable2,
    /// One value per sample.
    SamplesPerPixel,
}

impl FieldCount {
    fn raw(&self) -> Result<c_short> {
        match self {
            FieldCount::Fixed(n) => c_short::try_from(*n)
                .map_err(|_| GeoError::BadArgument(format!("field count {n} is too large"))),
            FieldCount::Variable => Ok(TIFF_VARIABLE),
            FieldCount::Variable2 => Ok(TIFF_VARIABLE2),
            FieldCount::SamplesPerPixel => Ok(TIFF_SPP),
        }
    }
}

/// Description of a custom field registered with libtiff.
///
/// See [`register_custom_fields`] for registering additional fields beside the built-in
/// [`GEOTIFF_FIELDS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub tag: u32,
    pub name: Cow<'static, str>,
    pub field_type: TiffDataType,
    pub count: FieldCount,
    /// Whether values are exchanged together with their count.
    pub pass_count: bool,
    /// Whether the value may change after it has been written.
    pub writable: bool,
}

impl FieldDescriptor {
    const fn geotiff(
        tag: u32,
        name: &'static str,
        field_type: TiffDataType,
        pass_count: bool,
    ) -> Self {
        FieldDescriptor {
            tag,
            name: Cow::Borrowed(name),
            field_type,
            count: FieldCount::Variable,
            pass_count,
            writable: true,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.field_type == TiffDataType::NoType {
            return Err(GeoError::BadArgument(format!(
                "field {} ({}) needs a concrete data type",
                self.tag, self.name
            )));
        }
        if self.field_type != TiffDataType::Ascii
            && !self.pass_count
            && self.count != FieldCount::Fixed(1)
        {
            return Err(GeoError::BadArgument(format!(
                "numeric field {} ({}) holding several values must pass its count",
                self.tag, self.name
            )));
        }
        self.count.raw()?;
        CString::new(self.name.as_ref())?;
        Ok(())
    }

    fn to_field_info(&self) -> Result<TIFFFieldInfo> {
        let count = self.count.raw()?;
        // libtiff keeps referencing the name for the rest of the process
        let name = CString::new(self.name.as_ref())?.into_raw();
        Ok(TIFFFieldInfo {
            field_tag: self.tag,
            field_readcount: count,
            field_writecount: count,
            field_type: self.field_type.tiff_type(),
            field_bit: FIELD_CUSTOM,
            field_oktochange: self.writable.into(),
            field_passcount: self.pass_count.into(),
            field_name: name,
        })
    }
}

/// The GeoTIFF and GDAL private fields registered with libtiff.
pub static GEOTIFF_FIELDS: [FieldDescriptor; 8] = [
    FieldDescriptor::geotiff(tags::GEO_PIXEL_SCALE, "GeoPixelScale", TiffDataType::Double, true),
    FieldDescriptor::geotiff(
        tags::GEO_TRANSFORMATION_MATRIX,
        "GeoTransformationMatrix",
        TiffDataType::Double,
        true,
    ),
    FieldDescriptor::geotiff(tags::GEO_TIE_POINTS, "GeoTiePoints", TiffDataType::Double, true),
    FieldDescriptor::geotiff(
        tags::GEO_KEY_DIRECTORY,
        "GeoKeyDirectory",
        TiffDataType::Short,
        true,
    ),
    FieldDescriptor::geotiff(
        tags::GEO_DOUBLE_PARAMS,
        "GeoDoubleParams",
        TiffDataType::Double,
        true,
    ),
    FieldDescriptor::geotiff(
        tags::GEO_ASCII_PARAMS,
        "GeoASCIIParams",
        TiffDataType::Ascii,
        false,
    ),
    FieldDescriptor::geotiff(tags::GDAL_NODATA, "GdalNoData", TiffDataType::Ascii, false),
    FieldDescriptor::geotiff(tags::GDAL_METADATA, "GdalMetadata", TiffDataType::Ascii, false),
];

/// Fields added through [`register_custom_fields`], pending installation.
static CUSTOM_FIELDS: Mutex<Vec<FieldDescriptor>> = Mutex::new(Vec::new());

struct FieldTable(Vec<TIFFFieldInfo>);

// The table is immutable once built and its names are leaked, never freed.
unsafe impl Send for FieldTable {}
unsafe impl Sync for FieldTable {}

static FIELD_TABLE: OnceLock<FieldTable> = OnceLock::new();
static PARENT_EXTENDER: OnceLock<TIFFExtendProc> = OnceLock::new();
static START: Once = Once::new();

/// Registers additional custom fields with libtiff.
///
/// Must be called before the first [`Tiff`] is opened. Afterwards the set of fields is
/// fixed and this returns [`GeoError::FieldsAlreadyRegistered`]. Tags that collide with
/// an already registered custom field are rejected.
pub fn register_custom_fields(fields: &[FieldDescriptor]) -> Result<()> {
    let mut pending = match CUSTOM_FIELDS.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    if FIELD_TABLE.get().is_some() {
        return Err(GeoError::FieldsAlreadyRegistered);
    }
    for (i, field) in fields.iter().enumerate() {
        field.validate()?;
        let duplicate = GEOTIFF_FIELDS
            .iter()
            .chain(pending.iter())
            .chain(fields[..i].iter())
            .any(|other| other.tag == field.tag);
        if duplicate {
            return Err(GeoError::BadArgument(format!(
                "custom field {} ({}) is already registered",
                field.tag, field.name
            )));
        }
    }
    pending.extend_from_slice(fields);
    Ok(())
}

/// All custom fields known to this crate, built-in ones first.
pub fn registered_fields() -> Vec<FieldDescriptor> {
    let pending = match CUSTOM_FIELDS.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    let fields = GEOTIFF_FIELDS.iter().chain(pending.iter()).cloned().collect();
    fields
}

unsafe extern "C" fn extend_tags(tif: *mut TIFF) {
    if let Some(FieldTable(table)) = FIELD_TABLE.get() {
        TIFFMergeFieldInfo(tif, table.as_ptr(), table.len() as u32);
    }
    if let Some(Some(parent)) = PARENT_EXTENDER.get() {
        parent(tif);
    }
}

/// Installs the custom field table through libtiff's tag extender, once per process.
pub(crate) fn _install_custom_fields() {
    START.call_once(|| {
        let pending = match CUSTOM_FIELDS.lock() {
            Ok(guard) => guard,
            Err(poison_error) => poison_error.into_inner(),
        };
        let table = GEOTIFF_FIELDS
            .iter()
            .chain(pending.iter())
            .filter_map(|field| match field.to_field_info() {
                Ok(info) => Some(info),
                Err(err) => {
                    log::warn!(target: "libgeo::tiff", "skipping field {}: {err}", field.tag);
                    None
                }
            })
            .collect::<Vec<_>>();
        log::debug!(target: "libgeo::tiff", "registering {} custom TIFF fields", table.len());
        let _ = FIELD_TABLE.set(FieldTable(table));
        let parent = unsafe { TIFFSetTagExtender(Some(extend_tags)) };
        let _ = PARENT_EXTENDER.set(parent);
    });
}

/// A field as described by libtiff's registry for an open file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub tag: u32,
    pub name: String,
    pub data_type: TiffDataType,
    /// Raw libtiff read count, negative values are the `TIFF_VARIABLE*` markers.
    pub read_count: i32,
    pub write_count: i32,
    pub pass_count: bool,
}

impl FieldInfo {
    fn wide_read_count(&self) -> bool {
        self.pass_count && self.read_count == c_int::from(TIFF_VARIABLE2)
    }

    fn wide_write_count(&self) -> bool {
        self.pass_count && self.write_count == c_int::from(TIFF_VARIABLE2)
    }

    /// Whether libtiff exchanges the value as a single item.
    fn is_single_value(&self) -> bool {
        !self.pass_count
            && !tags::UNSUPPORTED_VALUE_TAGS.contains(&self.tag)
            && [1, c_int::from(TIFF_VARIABLE), c_int::from(TIFF_SPP)].contains(&self.read_count)
    }

    fn check_type<T: TiffType>(&self) -> Result<()> {
        if !self.data_type.accepts::<T>() {
            return Err(GeoError::FieldTypeMismatch {
                tag: self.tag,
                name: self.name.clone(),
                field_type: self.data_type,
                requested: T::NAME,
            });
        }
        Ok(())
    }

    fn check_ascii(&self) -> Result<()> {
        if self.data_type != TiffDataType::Ascii {
            return Err(GeoError::FieldTypeMismatch {
                tag: self.tag,
                name: self.name.clone(),
                field_type: self.data_type,
                requested: "String",
            });
        }
        Ok(())
    }

    fn shape_mismatch(&self, requested: &'static str) -> GeoError {
        GeoError::FieldShapeMismatch {
            tag: self.tag,
            name: self.name.clone(),
            requested,
        }
    }
}

impl Tiff {
    /// Looks up `tag` in libtiff's field registry for this file.
    ///
    /// Returns `None` for tags libtiff does not know.
    pub fn field_info(&self, tag: u32) -> Option<FieldInfo> {
        let fip = unsafe { TIFFFindField(self.c_tiff(), tag, TIFF_ANY) };
        if fip.is_null() {
            return None;
        }
        let data_type = match TiffDataType::try_from(unsafe { TIFFFieldDataType(fip) }) {
            Ok(TiffDataType::NoType) => tags::exchanged_type(tag).unwrap_or(TiffDataType::NoType),
            Ok(data_type) => data_type,
            Err(err) => {
                log::debug!(target: "libgeo::tiff", "field {tag}: {err}");
                return None;
            }
        };
        unsafe {
            Some(FieldInfo {
                tag: TIFFFieldTag(fip),
                name: _string(TIFFFieldName(fip)),
                data_type,
                read_count: TIFFFieldReadCount(fip),
                write_count: TIFFFieldWriteCount(fip),
                pass_count: TIFFFieldPassCount(fip) != 0,
            })
        }
    }

    fn _known_field(&self, tag: u32) -> Result<FieldInfo> {
        self.field_info(tag).ok_or(GeoError::UnknownTag { tag })
    }

    /// Reads a single value of field `tag`.
    ///
    /// Defaults of standard tags are applied. Returns `Ok(None)` when the tag is unknown or
    /// not set. For fields holding an array of values, the first value is returned.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// # fn main() -> libgeo::errors::Result<()> {
    /// use libgeo::raster::{tags, Tiff};
    /// let tiff = Tiff::open("fixtures/tinymarble.tif")?;
    /// let width = tiff.get_field::<u32>(tags::IMAGE_WIDTH)?;
    /// let compression = tiff.get_field::<u16>(tags::COMPRESSION)?;
    /// println!("{width:?} {compression:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_field<T: TiffType>(&self, tag: u32) -> Result<Option<T>> {
        let Some(info) = self.field_info(tag) else {
            return Ok(None);
        };
        info.check_type::<T>()?;
        if info.pass_count {
            let values = self._get_counted::<T>(&info)?;
            return Ok(values.and_then(|values| values.first().copied()));
        }
        if !info.is_single_value() {
            return Err(info.shape_mismatch("a single value"));
        }
        let mut value = T::default();
        let rv = unsafe {
            TIFFGetFieldDefaulted(self.c_tiff(), tag, &mut value as *mut T as *mut c_void)
        };
        Ok((rv == 1).then_some(value))
    }

    /// Reads all values of field `tag`.
    ///
    /// Single-valued fields yield a one element vector.
    pub fn get_field_array<T: TiffType>(&self, tag: u32) -> Result<Option<Vec<T>>> {
        let Some(info) = self.field_info(tag) else {
            return Ok(None);
        };
        info.check_type::<T>()?;
        if info.pass_count {
            return self._get_counted::<T>(&info);
        }
        Ok(self.get_field::<T>(tag)?.map(|value| vec![value]))
    }

    /// Copies the values of field `tag` into `buf`.
    ///
    /// At most `buf.len()` values are copied, any further values are dropped. Returns the
    /// number of values written, `0` if the field is not set.
    pub fn get_field_array_into<T: TiffType>(&self, tag: u32, buf: &mut [T]) -> Result<usize> {
        let Some(values) = self.get_field_array::<T>(tag)? else {
            return Ok(0);
        };
        let len = values.len().min(buf.len());
        buf[..len].copy_from_slice(&values[..len]);
        Ok(len)
    }

    fn _get_counted<T: TiffType>(&self, info: &FieldInfo) -> Result<Option<Vec<T>>> {
        let c_tiff = self.c_tiff();
        let mut data: *const c_void = ptr::null();
        let (rv, count) = if info.wide_read_count() {
            let mut count: u32 = 0;
            let rv = unsafe {
                TIFFGetFieldDefaulted(
                    c_tiff,
                    info.tag,
                    &mut count as *mut u32,
                    &mut data as *mut *const c_void,
                )
            };
            (rv, count as usize)
        } else {
            let mut count: u16 = 0;
            let rv = unsafe {
                TIFFGetFieldDefaulted(
                    c_tiff,
                    info.tag,
                    &mut count as *mut u16,
                    &mut data as *mut *const c_void,
                )
            };
            (rv, usize::from(count))
        };
        if rv != 1 {
            return Ok(None);
        }
        if data.is_null() || count == 0 {
            return Ok(Some(Vec::new()));
        }
        let values = unsafe { std::slice::from_raw_parts(data as *const T, count) };
        Ok(Some(values.to_vec()))
    }

    /// Reads the ASCII field `tag`.
    ///
    /// Returns `Ok(None)` when the tag is unknown or not set.
    pub fn get_field_string(&self, tag: u32) -> Result<Option<String>> {
        let Some(info) = self.field_info(tag) else {
            return Ok(None);
        };
        info.check_ascii()?;
        if info.pass_count {
            let bytes = self._get_counted::<u8>(&FieldInfo {
                data_type: TiffDataType::Byte,
                ..info
            })?;
            return Ok(bytes.map(|bytes| {
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            }));
        }
        let mut value: *const c_char = ptr::null();
        let rv = unsafe {
            TIFFGetFieldDefaulted(self.c_tiff(), tag, &mut value as *mut *const c_char)
        };
        if rv != 1 || value.is_null() {
            return Ok(None);
        }
        Ok(Some(_string(value)))
    }

    /// Sets a single-valued field.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// # fn main() -> libgeo::errors::Result<()> {
    /// use libgeo::raster::{tags, Tiff};
    /// let mut tiff = Tiff::create("/tmp/out.tif")?;
    /// tiff.set_field(tags::IMAGE_WIDTH, 256u32)?;
    /// tiff.set_field(tags::BITS_PER_SAMPLE, 8u16)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_field<T: TiffType>(&mut self, tag: u32, value: T) -> Result<()> {
        let info = self._known_field(tag)?;
        info.check_type::<T>()?;
        if !info.is_single_value() {
            return Err(info.shape_mismatch("a single value"));
        }
        let c_tiff = self.c_tiff();
        self._reset_messages();
        let rv = unsafe {
            match value.var_arg() {
                VarArg::Int(v) => TIFFSetField(c_tiff, tag, v),
                VarArg::UInt(v) => TIFFSetField(c_tiff, tag, v),
                VarArg::Int64(v) => TIFFSetField(c_tiff, tag, v),
                VarArg::UInt64(v) => TIFFSetField(c_tiff, tag, v),
                VarArg::Double(v) => TIFFSetField(c_tiff, tag, v),
            }
        };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFSetField"));
        }
        Ok(())
    }

    /// Sets a field holding an array of values together with its count.
    pub fn set_field_array<T: TiffType>(&mut self, tag: u32, values: &[T]) -> Result<()> {
        let info = self._known_field(tag)?;
        info.check_type::<T>()?;
        if !info.pass_count {
            return Err(info.shape_mismatch("an array"));
        }
        // libtiff may byte swap the data in place
        let mut scratch = values.to_vec();
        self._set_counted(&info, scratch.as_mut_ptr() as *mut c_void, scratch.len())
    }

    fn _set_counted(&mut self, info: &FieldInfo, data: *mut c_void, len: usize) -> Result<()> {
        let c_tiff = self.c_tiff();
        self._reset_messages();
        let rv = if info.wide_write_count() {
            let count = c_uint::try_from(len).map_err(|_| {
                GeoError::BadArgument(format!("{len} values exceed the field's capacity"))
            })?;
            unsafe { TIFFSetField(c_tiff, info.tag, count, data) }
        } else {
            if len > usize::from(u16::MAX) {
                return Err(GeoError::BadArgument(format!(
                    "field {} ({}) holds at most {} values, got {len}",
                    info.tag,
                    info.name,
                    u16::MAX
                )));
            }
            unsafe { TIFFSetField(c_tiff, info.tag, len as c_int, data) }
        };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFSetField"));
        }
        Ok(())
    }

    /// Sets the ASCII field `tag`.
    pub fn set_field_string(&mut self, tag: u32, value: &str) -> Result<()> {
        let info = self._known_field(tag)?;
        info.check_ascii()?;
        let c_value = CString::new(value)?;
        if info.pass_count {
            let mut bytes = c_value.into_bytes_with_nul();
            return self._set_counted(&info, bytes.as_mut_ptr() as *mut c_void, bytes.len());
        }
        let c_tiff = self.c_tiff();
        self._reset_messages();
        let rv = unsafe { TIFFSetField(c_tiff, tag, c_value.as_ptr()) };
        if rv != 1 {
            return Err(self._last_tiff_err("TIFFSetField"));
        }
        Ok(())
    }

    /// Reads the `DateTime` tag.
    pub fn date_time(&self) -> Result<Option<NaiveDateTime>> {
        let Some(value) = self.get_field_string(tags::DATE_TIME)? else {
            return Ok(None);
        };
        NaiveDateTime::parse_from_str(value.trim(), DATE_TIME_FORMAT)
            .map(Some)
            .map_err(|_| GeoError::DateTimeParse { value })
    }

    /// Sets the `DateTime` tag.
    pub fn set_date_time(&mut self, date_time: NaiveDateTime) -> Result<()> {
        let value = date_time.format(DATE_TIME_FORMAT).to_string();
        self.set_field_string(tags::DATE_TIME, &value)
    }
}
