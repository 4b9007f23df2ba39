//! Bindings to [libtiff](http://www.libtiff.org/) with GeoTIFF fields, and to the
//! coordinate transformation API of [PROJ](https://proj.org/).
//!
//! ## Raster access
//!
//! ```rust, no_run
//! # fn main() -> libgeo::errors::Result<()> {
//! use libgeo::raster::{GeoTiffFields, Tiff};
//!
//! let tiff = Tiff::open("fixtures/tinymarble.tif")?;
//! let (width, length) = tiff.raster_size()?;
//! println!("{width}x{length}");
//! println!("geo transform: {:?}", tiff.geo_transform()?);
//! let strip = tiff.rgba_strip(0)?;
//! println!("top-left pixel: {:?}", strip.pixel(0, 0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinate transformation
//!
//! ```rust, no_run
//! # fn main() -> libgeo::errors::Result<()> {
//! use libgeo::spatial_ref::{CoordTransform, Projection};
//!
//! let wgs84 = Projection::from_definition("+proj=longlat +datum=WGS84")?;
//! let mercator = Projection::from_definition("+proj=merc +datum=WGS84")?;
//! let transform = CoordTransform::new(&wgs84, &mercator)?;
//!
//! let mut xs = [1.0, 2.0];
//! let mut ys = [0.0, 45.0];
//! transform.transform_coords(&mut xs, &mut ys, None)?;
//! println!("{xs:?} {ys:?}");
//! # Ok(())
//! # }
//! ```
//!
//! Errors reported by libtiff are kept per open file ([`raster::Tiff::last_error`]),
//! forwarded to the [`log`] crate and to an optional callback installed with
//! [`config::set_error_handler`]. The [`ffi`] module exposes a flat C ABI over the same
//! functionality.

#![crate_name = "libgeo"]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use libgeo_sys;

pub mod config;
pub mod errors;
pub mod ffi;
mod geo_transform;
mod options;
pub mod raster;
pub mod spatial_ref;
pub mod utils;
pub mod version;

pub use geo_transform::{GeoTransform, GeoTransformEx};
pub use options::OpenFlags;

#[cfg(test)]
pub(crate) mod test_utils;
