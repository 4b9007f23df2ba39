//! Coordinate reference systems and transformations through PROJ

mod proj;
mod transform;

pub use proj::{ProjConfig, ProjLogLevel, Projection};
pub use transform::CoordTransform;

#[cfg(test)]
mod tests;
