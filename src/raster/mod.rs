//! libtiff raster access with GeoTIFF fields
//!
//! A [`Tiff`] owns one open file. Fields are read and written through the generic
//! accessors ([`Tiff::get_field`], [`Tiff::set_field_array`], ...) checked against
//! libtiff's field registry, or through the typed [`GeoTiffFields`] accessors. Pixel data
//! moves as encoded strips/tiles or as decoded RGBA rasters.
//!
//! ```rust, no_run
//! # fn main() -> libgeo::errors::Result<()> {
//! use libgeo::raster::{tags, Tiff};
//!
//! let tiff = Tiff::open("fixtures/tinymarble.tif")?;
//! let (width, length) = tiff.raster_size()?;
//! println!("{width}x{length}, tiled: {}", tiff.is_tiled());
//!
//! let mut strip = vec![0u8; tiff.strip_size()];
//! let read = tiff.read_encoded_strip(0, &mut strip)?;
//! println!("first strip: {read} bytes");
//! # Ok(())
//! # }
//! ```

mod buffer;
mod fields;
mod geotiff;
pub mod tags;
mod tiff;
mod types;

pub use buffer::{rgba_components, RgbaBuffer};
pub use fields::{
    register_custom_fields, registered_fields, FieldCount, FieldDescriptor, FieldInfo,
    GEOTIFF_FIELDS,
};
pub use geotiff::{GeoTiffFields, TiePoint};
pub use tiff::{last_error, Tiff};
pub use types::{TIFFDataType, TiffDataType, TiffType};

pub(crate) use tiff::_install_process_handlers;
