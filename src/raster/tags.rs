//! Tag numbers and well-known tag values.
//!
//! Baseline and extension tags from the TIFF 6.0 specification that callers of this crate
//! need for building and inspecting images, plus the GeoTIFF and GDAL private tags that
//! are registered with libtiff on first open.

use super::TiffDataType;

// baseline
pub const NEW_SUBFILE_TYPE: u32 = 254;
pub const IMAGE_WIDTH: u32 = 256;
pub const IMAGE_LENGTH: u32 = 257;
pub const BITS_PER_SAMPLE: u32 = 258;
pub const COMPRESSION: u32 = 259;
pub const PHOTOMETRIC: u32 = 262;
pub const IMAGE_DESCRIPTION: u32 = 270;
pub const STRIP_OFFSETS: u32 = 273;
pub const ORIENTATION: u32 = 274;
pub const SAMPLES_PER_PIXEL: u32 = 277;
pub const ROWS_PER_STRIP: u32 = 278;
pub const STRIP_BYTE_COUNTS: u32 = 279;
pub const X_RESOLUTION: u32 = 282;
pub const Y_RESOLUTION: u32 = 283;
pub const PLANAR_CONFIG: u32 = 284;
pub const RESOLUTION_UNIT: u32 = 296;
pub const TRANSFER_FUNCTION: u32 = 301;
pub const SOFTWARE: u32 = 305;
pub const DATE_TIME: u32 = 306;
pub const ARTIST: u32 = 315;
pub const PREDICTOR: u32 = 317;
pub const COLOR_MAP: u32 = 320;

// extension
pub const TILE_WIDTH: u32 = 322;
pub const TILE_LENGTH: u32 = 323;
pub const TILE_OFFSETS: u32 = 324;
pub const TILE_BYTE_COUNTS: u32 = 325;
pub const EXTRA_SAMPLES: u32 = 338;
pub const SAMPLE_FORMAT: u32 = 339;
pub const SMIN_SAMPLE_VALUE: u32 = 340;
pub const SMAX_SAMPLE_VALUE: u32 = 341;

// GeoTIFF
pub const GEO_PIXEL_SCALE: u32 = 33550;
pub const GEO_TIE_POINTS: u32 = 33922;
pub const GEO_TRANSFORMATION_MATRIX: u32 = 34264;
pub const GEO_KEY_DIRECTORY: u32 = 34735;
pub const GEO_DOUBLE_PARAMS: u32 = 34736;
pub const GEO_ASCII_PARAMS: u32 = 34737;

// GDAL
pub const GDAL_METADATA: u32 = 42112;
pub const GDAL_NODATA: u32 = 42113;

/// Tags whose libtiff accessors do not follow the generic value/array conventions
/// (per-sample pointer triples, offsets arrays without counts).
pub(crate) const UNSUPPORTED_VALUE_TAGS: [u32; 6] = [
    STRIP_OFFSETS,
    STRIP_BYTE_COUNTS,
    TILE_OFFSETS,
    TILE_BYTE_COUNTS,
    TRANSFER_FUNCTION,
    COLOR_MAP,
];

/// Value type of fields libtiff registers without a storage type.
///
/// The sample range tags are stored in whatever type matches the sample format, but
/// libtiff always exchanges them as a `double`.
pub(crate) fn exchanged_type(tag: u32) -> Option<TiffDataType> {
    match tag {
        SMIN_SAMPLE_VALUE | SMAX_SAMPLE_VALUE => Some(TiffDataType::Double),
        _ => None,
    }
}

pub mod compression {
    pub const NONE: u16 = 1;
    pub const LZW: u16 = 5;
    pub const ADOBE_DEFLATE: u16 = 8;
    pub const PACKBITS: u16 = 32773;
}

pub mod photometric {
    pub const MIN_IS_WHITE: u16 = 0;
    pub const MIN_IS_BLACK: u16 = 1;
    pub const RGB: u16 = 2;
    pub const PALETTE: u16 = 3;
}

pub mod planar_config {
    pub const CONTIG: u16 = 1;
    pub const SEPARATE: u16 = 2;
}

pub mod sample_format {
    pub const UINT: u16 = 1;
    pub const INT: u16 = 2;
    pub const IEEE_FP: u16 = 3;
}
