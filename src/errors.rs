use std::ffi::{IntoStringError, NulError};
use std::str::Utf8Error;
use thiserror::Error;

use crate::raster::TiffDataType;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Clone, Debug, Error)]
pub enum GeoError {
    #[error("FfiNulError")]
    FfiNulError(#[from] NulError),
    #[error("FfiIntoStringError")]
    FfiIntoStringError(#[from] IntoStringError),
    #[error("StrUtf8Error")]
    StrUtf8Error(#[from] Utf8Error),
    #[cfg(feature = "ndarray")]
    #[error("NdarrayShapeError")]
    NdarrayShapeError(#[from] ndarray::ShapeError),
    #[error("libtiff method '{method_name}' failed. Error msg: '{msg}'")]
    TiffError {
        method_name: &'static str,
        msg: String,
    },
    #[error("libtiff method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[error("TIFF tag {tag} is not registered")]
    UnknownTag { tag: u32 },
    #[error("TIFF tag {tag} ({name}) stores {field_type:?} values, not {requested}")]
    FieldTypeMismatch {
        tag: u32,
        name: String,
        field_type: TiffDataType,
        requested: &'static str,
    },
    #[error("TIFF tag {tag} ({name}) cannot be accessed as {requested}")]
    FieldShapeMismatch {
        tag: u32,
        name: String,
        requested: &'static str,
    },
    #[error("Custom TIFF fields must be registered before the first file is opened")]
    FieldsAlreadyRegistered,
    #[error("Buffer holds {actual} elements but {required} are required")]
    BufferTooSmall { required: usize, actual: usize },
    #[error("Bad argument: {0}")]
    BadArgument(String),
    #[error("PROJ method '{method_name}' failed with error {code}: '{msg}'")]
    ProjError {
        method_name: &'static str,
        code: i32,
        msg: String,
    },
    #[error("Unable to transform coordinates from '{from}' to '{to}': {msg}")]
    TransformError {
        from: String,
        to: String,
        msg: String,
    },
    #[error("Unable to parse '{value}' as a TIFF date/time")]
    DateTimeParse { value: String },
}

/// Severity of a message reported by libtiff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TiffMessageLevel {
    Warning,
    Error,
}

impl TiffMessageLevel {
    pub(crate) fn log_level(self) -> log::Level {
        match self {
            TiffMessageLevel::Warning => log::Level::Warn,
            TiffMessageLevel::Error => log::Level::Error,
        }
    }
}
