use std::ffi::c_double;

use crate::errors;
use crate::errors::GeoError;

/// An affine transform.
///
/// A six-element array storing the coefficients of an [affine transform]
/// used in mapping coordinates between pixel/line `(P, L)` (raster) space,
/// and `(Xp,Yp)` (model) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
///
/// ## Note
///
/// GeoTIFF stores the same coefficients either as a tie point plus pixel scale, or as a
/// 4x4 `ModelTransformation` matrix whose first two rows read:
///
/// ```text
/// | a b 0 c |
/// | d e 0 f |
/// ```
///
/// The corresponding `GeoTransform` ordering is:
///
/// ```text
/// [c, a, b, f, d, e]
/// ```
///
/// # Usage
///  *  [`apply`](GeoTransformEx::apply): perform a `(P,L) -> (Xp,Yp)` transformation
///  *  [`invert`](GeoTransformEx::invert):  construct the inverse transformation coefficients
///     for computing `(Xp,Yp) -> (P,L)` transformations
///
/// # Example
///
/// ```rust, no_run
/// # fn main() -> libgeo::errors::Result<()> {
/// use libgeo::raster::{GeoTiffFields, Tiff};
/// use libgeo::GeoTransformEx;
/// let tiff = Tiff::open("fixtures/tinymarble.tif")?;
/// if let Some(transform) = tiff.geo_transform()? {
///     let (x, y) = transform.apply(0.0, 0.0);
///     println!("(x,y): ({x},{y})");
///     let inverse = transform.invert()?;
///     let (p, l) = inverse.apply(x, y);
///     println!("(p,l): ({p},{l})");
/// }
/// # Ok(())
/// # }
/// ```
///
/// [affine transform]: https://en.wikipedia.org/wiki/Affine_transformation
pub type GeoTransform = [c_double; 6];

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply GeoTransform to x/y coordinate.
    ///
    /// # Example
    ///
    /// See [`GeoTransform`](GeoTransform#example)
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Invert a [`GeoTransform`].
    ///
    /// Fails if the transform collapses the plane (zero determinant).
    ///
    /// # Example
    ///
    /// See [`GeoTransform`](GeoTransform#example)
    fn invert(&self) -> errors::Result<GeoTransform>;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        let geo_x = self[0] + pixel * self[1] + line * self[2];
        let geo_y = self[3] + pixel * self[4] + line * self[5];
        (geo_x, geo_y)
    }

    fn invert(&self) -> errors::Result<GeoTransform> {
        // no rotation: the common north-up case stays exact
        if self[2] == 0.0 && self[4] == 0.0 && self[1] != 0.0 && self[5] != 0.0 {
            return Ok([
                -self[0] / self[1],
                1.0 / self[1],
                0.0,
                -self[3] / self[5],
                0.0,
                1.0 / self[5],
            ]);
        }

        let det = self[1] * self[5] - self[2] * self[4];
        let magnitude = self[1]
            .abs()
            .max(self[2].abs())
            .max(self[4].abs().max(self[5].abs()));
        if det.abs() <= 1e-10 * magnitude * magnitude || !det.is_finite() {
            return Err(GeoError::BadArgument(
                "Geo transform is uninvertible".to_string(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok([
            (self[2] * self[3] - self[0] * self[5]) * inv_det,
            self[5] * inv_det,
            -self[2] * inv_det,
            (-self[1] * self[3] + self[0] * self[4]) * inv_det,
            -self[4] * inv_det,
            self[1] * inv_det,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;

    #[test]
    fn test_apply_north_up() {
        let gt: GeoTransform = [100.0, 2.0, 0.0, 500.0, 0.0, -2.0];
        assert_eq!(gt.apply(0.0, 0.0), (100.0, 500.0));
        assert_eq!(gt.apply(10.0, 5.0), (120.0, 490.0));
    }

    #[test]
    fn test_invert_roundtrip() {
        let gt: GeoTransform = [100.0, 2.0, 0.5, 500.0, 0.25, -2.0];
        let inv = gt.invert().unwrap();
        let (x, y) = gt.apply(7.0, 3.0);
        let (p, l) = inv.apply(x, y);
        assert_near!(p, 7.0, epsilon = 1e-9);
        assert_near!(l, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invert_singular() {
        let gt: GeoTransform = [0.0, 1.0, 2.0, 0.0, 2.0, 4.0];
        assert!(gt.invert().is_err());
        let zero: GeoTransform = [0.0; 6];
        assert!(zero.invert().is_err());
    }
}
