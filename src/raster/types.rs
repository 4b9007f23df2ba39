use crate::errors::{GeoError, Result};
pub use libgeo_sys::TIFFDataType;
use std::fmt::{Display, Formatter};

/// Storage type of a TIFF field as declared in libtiff's field registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TiffDataType {
    /// Placeholder type of fields that accept several storage types.
    NoType,
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
    Long8,
    SLong8,
    Ifd8,
}

impl TiffDataType {
    /// The libtiff constant for this type.
    pub fn tiff_type(&self) -> TIFFDataType::Type {
        use TIFFDataType::*;
        match self {
            TiffDataType::NoType => TIFF_NOTYPE,
            TiffDataType::Byte => TIFF_BYTE,
            TiffDataType::Ascii => TIFF_ASCII,
            TiffDataType::Short => TIFF_SHORT,
            TiffDataType::Long => TIFF_LONG,
            TiffDataType::Rational => TIFF_RATIONAL,
            TiffDataType::SByte => TIFF_SBYTE,
            TiffDataType::Undefined => TIFF_UNDEFINED,
            TiffDataType::SShort => TIFF_SSHORT,
            TiffDataType::SLong => TIFF_SLONG,
            TiffDataType::SRational => TIFF_SRATIONAL,
            TiffDataType::Float => TIFF_FLOAT,
            TiffDataType::Double => TIFF_DOUBLE,
            TiffDataType::Ifd => TIFF_IFD,
            TiffDataType::Long8 => TIFF_LONG8,
            TiffDataType::SLong8 => TIFF_SLONG8,
            TiffDataType::Ifd8 => TIFF_IFD8,
        }
    }

    /// Name as used in the TIFF 6.0 and BigTIFF documents.
    pub fn name(&self) -> &'static str {
        match self {
            TiffDataType::NoType => "NOTYPE",
            TiffDataType::Byte => "BYTE",
            TiffDataType::Ascii => "ASCII",
            TiffDataType::Short => "SHORT",
            TiffDataType::Long => "LONG",
            TiffDataType::Rational => "RATIONAL",
            TiffDataType::SByte => "SBYTE",
            TiffDataType::Undefined => "UNDEFINED",
            TiffDataType::SShort => "SSHORT",
            TiffDataType::SLong => "SLONG",
            TiffDataType::SRational => "SRATIONAL",
            TiffDataType::Float => "FLOAT",
            TiffDataType::Double => "DOUBLE",
            TiffDataType::Ifd => "IFD",
            TiffDataType::Long8 => "LONG8",
            TiffDataType::SLong8 => "SLONG8",
            TiffDataType::Ifd8 => "IFD8",
        }
    }

    /// Size in **bytes** of one value as libtiff hands it out through `TIFFGetField`.
    ///
    /// Rationals are converted to single precision floats by libtiff, so they report 4.
    /// Returns `None` for ASCII and typeless fields, which have no numeric representation.
    pub fn storage_size(&self) -> Option<usize> {
        match self {
            TiffDataType::Byte | TiffDataType::SByte | TiffDataType::Undefined => Some(1),
            TiffDataType::Short | TiffDataType::SShort => Some(2),
            TiffDataType::Long | TiffDataType::SLong | TiffDataType::Ifd => Some(4),
            TiffDataType::Rational | TiffDataType::SRational | TiffDataType::Float => Some(4),
            TiffDataType::Double => Some(8),
            TiffDataType::Long8 | TiffDataType::SLong8 | TiffDataType::Ifd8 => Some(8),
            TiffDataType::NoType | TiffDataType::Ascii => None,
        }
    }

    /// Returns `true` if values are handed out as floating point numbers.
    pub fn is_floating(&self) -> bool {
        matches!(
            self,
            TiffDataType::Rational
                | TiffDataType::SRational
                | TiffDataType::Float
                | TiffDataType::Double
        )
    }

    /// Returns `true` if data type is integral.
    pub fn is_integer(&self) -> bool {
        self.storage_size().is_some() && !self.is_floating()
    }

    /// Returns `true` if data type supports negative values.
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            TiffDataType::SByte
                | TiffDataType::SShort
                | TiffDataType::SLong
                | TiffDataType::SLong8
                | TiffDataType::SRational
                | TiffDataType::Float
                | TiffDataType::Double
        )
    }

    /// Whether a value of this type can be accessed as `T`.
    ///
    /// Size and integer/float kind must agree; signedness is not checked since libtiff
    /// itself writes signed and unsigned values through the same code path.
    pub fn accepts<T: TiffType>(&self) -> bool {
        self.storage_size() == Some(T::SIZE) && self.is_floating() == T::IS_FLOATING
    }
}

impl Display for TiffDataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<TIFFDataType::Type> for TiffDataType {
    type Error = GeoError;

    fn try_from(value: TIFFDataType::Type) -> Result<Self> {
        use TIFFDataType::*;
        let data_type = match value {
            TIFF_NOTYPE => TiffDataType::NoType,
            TIFF_BYTE => TiffDataType::Byte,
            TIFF_ASCII => TiffDataType::Ascii,
            TIFF_SHORT => TiffDataType::Short,
            TIFF_LONG => TiffDataType::Long,
            TIFF_RATIONAL => TiffDataType::Rational,
            TIFF_SBYTE => TiffDataType::SByte,
            TIFF_UNDEFINED => TiffDataType::Undefined,
            TIFF_SSHORT => TiffDataType::SShort,
            TIFF_SLONG => TiffDataType::SLong,
            TIFF_SRATIONAL => TiffDataType::SRational,
            TIFF_FLOAT => TiffDataType::Float,
            TIFF_DOUBLE => TiffDataType::Double,
            TIFF_IFD => TiffDataType::Ifd,
            TIFF_LONG8 => TiffDataType::Long8,
            TIFF_SLONG8 => TiffDataType::SLong8,
            TIFF_IFD8 => TiffDataType::Ifd8,
            other => {
                return Err(GeoError::BadArgument(format!(
                    "unknown TIFF data type {other}"
                )))
            }
        };
        Ok(data_type)
    }
}

/// A value as it travels through libtiff's variadic `TIFFSetField`.
///
/// C default argument promotion applies: everything narrower than `int` travels as
/// `int` and `float` travels as `double`.
#[doc(hidden)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VarArg {
    Int(std::ffi::c_int),
    UInt(std::ffi::c_uint),
    Int64(i64),
    UInt64(u64),
    Double(std::ffi::c_double),
}

/// Type-level constraint for limiting which primitive numeric values can be stored in
/// or read from TIFF fields.
pub trait TiffType: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Rust name, used in error messages.
    const NAME: &'static str;
    /// Size in bytes of one value.
    const SIZE: usize = std::mem::size_of::<Self>();
    const IS_FLOATING: bool;

    #[doc(hidden)]
    fn var_arg(self) -> VarArg;
}

impl TiffType for u8 {
    const NAME: &'static str = "u8";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int(self.into())
    }
}

impl TiffType for i8 {
    const NAME: &'static str = "i8";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int(self.into())
    }
}

impl TiffType for u16 {
    const NAME: &'static str = "u16";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int(self.into())
    }
}

impl TiffType for i16 {
    const NAME: &'static str = "i16";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int(self.into())
    }
}

impl TiffType for u32 {
    const NAME: &'static str = "u32";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::UInt(self)
    }
}

impl TiffType for i32 {
    const NAME: &'static str = "i32";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int(self)
    }
}

impl TiffType for u64 {
    const NAME: &'static str = "u64";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::UInt64(self)
    }
}

impl TiffType for i64 {
    const NAME: &'static str = "i64";
    const IS_FLOATING: bool = false;
    fn var_arg(self) -> VarArg {
        VarArg::Int64(self)
    }
}

impl TiffType for f32 {
    const NAME: &'static str = "f32";
    const IS_FLOATING: bool = true;
    fn var_arg(self) -> VarArg {
        VarArg::Double(self.into())
    }
}

impl TiffType for f64 {
    const NAME: &'static str = "f64";
    const IS_FLOATING: bool = true;
    fn var_arg(self) -> VarArg {
        VarArg::Double(self)
    }
}
