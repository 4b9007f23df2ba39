use std::mem::size_of;
use std::ptr;

use geo_types::Coord;
use libgeo_sys::{PJ, PJ_DIRECTION};

use crate::errors::{GeoError, Result};
use crate::spatial_ref::proj::Context;
use crate::spatial_ref::Projection;

/// One coordinate component laid out with a stride, as `proj_trans_generic` takes it.
struct Strided {
    ptr: *mut f64,
    stride: usize,
}

impl Strided {
    fn null() -> Self {
        Strided {
            ptr: ptr::null_mut(),
            stride: 0,
        }
    }
}

/// Defines a coordinate transformation from one [`Projection`] to another.
///
/// Geographic coordinates are exchanged as longitude, latitude in degrees, projected
/// ones as easting, northing, whatever axis order the CRS definitions declare.
#[derive(Debug)]
pub struct CoordTransform {
    c_proj: *mut PJ,
    ctx: Context,
    from: String,
    to: String,
}

// Like Projection, the transform owns its context.
unsafe impl Send for CoordTransform {}

impl Drop for CoordTransform {
    fn drop(&mut self) {
        unsafe { libgeo_sys::proj_destroy(self.c_proj) };
    }
}

impl CoordTransform {
    /// Constructs a new transformation from `source` to `target`.
    ///
    /// The transform gets a context configured like the one of `source`.
    ///
    /// See: [proj_create_crs_to_crs_from_pj](https://proj.org/en/stable/development/reference/functions.html#c.proj_create_crs_to_crs_from_pj)
    pub fn new(source: &Projection, target: &Projection) -> Result<CoordTransform> {
        let ctx = Context::new(source.context().config())?;
        let c_op = unsafe {
            libgeo_sys::proj_create_crs_to_crs_from_pj(
                ctx.c_ctx(),
                source.c_proj(),
                target.c_proj(),
                ptr::null_mut(),
                ptr::null(),
            )
        };
        if c_op.is_null() {
            return Err(ctx.last_proj_err("proj_create_crs_to_crs_from_pj"));
        }
        let c_proj = unsafe {
            let normalized = libgeo_sys::proj_normalize_for_visualization(ctx.c_ctx(), c_op);
            libgeo_sys::proj_destroy(c_op);
            normalized
        };
        if c_proj.is_null() {
            return Err(ctx.last_proj_err("proj_normalize_for_visualization"));
        }
        Ok(CoordTransform {
            c_proj,
            ctx,
            from: source.source().to_string(),
            to: target.source().to_string(),
        })
    }

    /// Returns a C pointer to the wrapped PROJ operation.
    ///
    /// # Safety
    /// This method returns a raw C pointer, only valid while `self` is alive.
    pub unsafe fn c_proj(&self) -> *mut PJ {
        self.c_proj
    }

    fn _transform_error(&self, msg: String) -> GeoError {
        GeoError::TransformError {
            from: self.from.clone(),
            to: self.to.clone(),
            msg,
        }
    }

    /// Runs `proj_trans_generic` over `count` points.
    ///
    /// Callers guarantee that every non-null component addresses `count` values at its
    /// stride.
    unsafe fn _trans(&self, count: usize, x: Strided, y: Strided, z: Strided) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let nz = if z.ptr.is_null() { 0 } else { count };
        libgeo_sys::proj_errno_reset(self.c_proj);
        libgeo_sys::proj_trans_generic(
            self.c_proj,
            PJ_DIRECTION::PJ_FWD,
            x.ptr,
            x.stride,
            count,
            y.ptr,
            y.stride,
            count,
            z.ptr,
            z.stride,
            nz,
            ptr::null_mut(),
            0,
            0,
        );
        let code = libgeo_sys::proj_errno(self.c_proj);
        if code != 0 {
            return Err(self._transform_error(self.ctx.error_message(code)));
        }
        // PROJ reports some failures only as HUGE_VAL in the output
        let failed = (0..count).find(|i| {
            let x = *x.ptr.byte_add(i * x.stride);
            let y = *y.ptr.byte_add(i * y.stride);
            x.is_infinite() || y.is_infinite()
        });
        if let Some(index) = failed {
            return Err(self._transform_error(format!(
                "point {index} could not be transformed"
            )));
        }
        Ok(())
    }

    /// Transform coordinates in place.
    ///
    /// # Arguments
    /// * `x` - slice of x coordinates
    /// * `y` - slice of y coordinates (must match x in length)
    /// * `z` - optional slice of z coordinates (must match x in length)
    ///
    /// On failure the slices are left as PROJ wrote them.
    pub fn transform_coords(
        &self,
        x: &mut [f64],
        y: &mut [f64],
        z: Option<&mut [f64]>,
    ) -> Result<()> {
        let count = x.len();
        let z_len = z.as_ref().map_or(count, |z| z.len());
        if y.len() != count || z_len != count {
            return Err(GeoError::BadArgument(format!(
                "transform coordinate slices have different lengths: {} != {} != {}",
                count,
                y.len(),
                z_len
            )));
        }
        let stride = size_of::<f64>();
        let z = match z {
            Some(z) => Strided {
                ptr: z.as_mut_ptr(),
                stride,
            },
            None => Strided::null(),
        };
        unsafe {
            self._trans(
                count,
                Strided {
                    ptr: x.as_mut_ptr(),
                    stride,
                },
                Strided {
                    ptr: y.as_mut_ptr(),
                    stride,
                },
                z,
            )
        }
    }

    /// Transform `count` points spread through the slices, point `i` at index `i * offset`.
    ///
    /// Values between the points are left untouched.
    pub fn transform_strided(
        &self,
        count: usize,
        offset: usize,
        x: &mut [f64],
        y: &mut [f64],
        z: Option<&mut [f64]>,
    ) -> Result<()> {
        if offset == 0 {
            return Err(GeoError::BadArgument(
                "point offset must be at least 1".to_string(),
            ));
        }
        let z_len = z.as_ref().map_or(x.len(), |z| z.len());
        if y.len() != x.len() || z_len != x.len() {
            return Err(GeoError::BadArgument(format!(
                "transform coordinate slices have different lengths: {} != {} != {}",
                x.len(),
                y.len(),
                z_len
            )));
        }
        let required = match count {
            0 => 0,
            n => (n - 1)
                .checked_mul(offset)
                .and_then(|last| last.checked_add(1))
                .ok_or_else(|| {
                    GeoError::BadArgument(format!("{count} points at offset {offset} overflow"))
                })?,
        };
        if x.len() < required {
            return Err(GeoError::BufferTooSmall {
                required,
                actual: x.len(),
            });
        }
        let stride = offset * size_of::<f64>();
        let z = match z {
            Some(z) => Strided {
                ptr: z.as_mut_ptr(),
                stride,
            },
            None => Strided::null(),
        };
        unsafe {
            self._trans(
                count,
                Strided {
                    ptr: x.as_mut_ptr(),
                    stride,
                },
                Strided {
                    ptr: y.as_mut_ptr(),
                    stride,
                },
                z,
            )
        }
    }

    /// Transform [`geo_types::Coord`] values in place.
    pub fn transform_points(&self, points: &mut [Coord<f64>]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let stride = size_of::<Coord<f64>>();
        let base = points.as_mut_ptr();
        unsafe {
            self._trans(
                points.len(),
                Strided {
                    ptr: ptr::addr_of_mut!((*base).x),
                    stride,
                },
                Strided {
                    ptr: ptr::addr_of_mut!((*base).y),
                    stride,
                },
                Strided::null(),
            )
        }
    }
}
