//! Low level bindings to [libtiff](http://www.libtiff.org/) and [PROJ](https://proj.org/).
//!
//! Only the entry points used by the `libgeo` crate are declared. Enumerations are
//! exposed as constant modules (`TIFFDataType::Type`, `PJ_DIRECTION::Type`, ...) so
//! unexpected values coming from C never produce an invalid Rust enum.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

pub mod cstdio;
pub mod proj;
pub mod tiff;

pub use cstdio::*;
pub use proj::*;
pub use tiff::*;
