//! Typed access to the GeoTIFF and GDAL private fields.
//!
//! These are thin wrappers over the generic field accessors of [`Tiff`]; the contents
//! (key directory, parameters) are passed through without interpretation.

use super::tags;
use super::Tiff;
use crate::errors::{GeoError, Result};
use crate::geo_transform::GeoTransform;

/// One `ModelTiepoint`: raster position `(i, j, k)` mapped to model position `(x, y, z)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TiePoint {
    pub i: f64,
    pub j: f64,
    pub k: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TiePoint {
    fn from_values(values: &[f64]) -> TiePoint {
        TiePoint {
            i: values[0],
            j: values[1],
            k: values[2],
            x: values[3],
            y: values[4],
            z: values[5],
        }
    }

    fn values(&self) -> [f64; 6] {
        [self.i, self.j, self.k, self.x, self.y, self.z]
    }
}

/// Accessors for the GeoTIFF fields of a [`Tiff`].
///
/// ```rust, no_run
/// # fn main() -> libgeo::errors::Result<()> {
/// use libgeo::raster::{GeoTiffFields, Tiff};
/// let tiff = Tiff::open("fixtures/tinymarble.tif")?;
/// println!("scale: {:?}", tiff.pixel_scale()?);
/// println!("tie points: {:?}", tiff.tie_points()?);
/// println!("nodata: {:?}", tiff.nodata()?);
/// # Ok(())
/// # }
/// ```
pub trait GeoTiffFields {
    /// `ModelPixelScale`: `[scale_x, scale_y, scale_z]`.
    fn pixel_scale(&self) -> Result<Option<[f64; 3]>>;
    fn set_pixel_scale(&mut self, scale: [f64; 3]) -> Result<()>;

    /// `ModelTiepoint`, empty if not set.
    fn tie_points(&self) -> Result<Vec<TiePoint>>;
    fn set_tie_points(&mut self, tie_points: &[TiePoint]) -> Result<()>;

    /// `ModelTransformation`, a row-major 4x4 matrix.
    fn transformation_matrix(&self) -> Result<Option<[f64; 16]>>;
    fn set_transformation_matrix(&mut self, matrix: &[f64; 16]) -> Result<()>;

    fn geo_key_directory(&self) -> Result<Option<Vec<u16>>>;
    fn set_geo_key_directory(&mut self, keys: &[u16]) -> Result<()>;

    fn geo_double_params(&self) -> Result<Option<Vec<f64>>>;
    fn set_geo_double_params(&mut self, params: &[f64]) -> Result<()>;

    fn geo_ascii_params(&self) -> Result<Option<String>>;
    fn set_geo_ascii_params(&mut self, params: &str) -> Result<()>;

    /// GDAL's nodata value, parsed as a number.
    fn nodata(&self) -> Result<Option<f64>>;
    fn set_nodata(&mut self, nodata: f64) -> Result<()>;

    /// GDAL's XML metadata document, unparsed.
    fn gdal_metadata(&self) -> Result<Option<String>>;
    fn set_gdal_metadata(&mut self, metadata: &str) -> Result<()>;

    /// Affine pixel to model transform.
    ///
    /// Taken from `ModelTransformation` when present, otherwise derived from the first tie
    /// point and the pixel scale. The raster type (pixel is area/point) from the key
    /// directory is not applied.
    fn geo_transform(&self) -> Result<Option<GeoTransform>>;

    /// Store `transform` as tie point plus pixel scale, or as `ModelTransformation` when
    /// it has rotation terms.
    fn set_geo_transform(&mut self, transform: &GeoTransform) -> Result<()>;
}

impl GeoTiffFields for Tiff {
    fn pixel_scale(&self) -> Result<Option<[f64; 3]>> {
        let Some(values) = self.get_field_array::<f64>(tags::GEO_PIXEL_SCALE)? else {
            return Ok(None);
        };
        let mut scale = [0.0; 3];
        let len = values.len().min(3);
        scale[..len].copy_from_slice(&values[..len]);
        Ok(Some(scale))
    }

    fn set_pixel_scale(&mut self, scale: [f64; 3]) -> Result<()> {
        self.set_field_array(tags::GEO_PIXEL_SCALE, &scale)
    }

    fn tie_points(&self) -> Result<Vec<TiePoint>> {
        let values = self
            .get_field_array::<f64>(tags::GEO_TIE_POINTS)?
            .unwrap_or_default();
        Ok(values.chunks_exact(6).map(TiePoint::from_values).collect())
    }

    fn set_tie_points(&mut self, tie_points: &[TiePoint]) -> Result<()> {
        let values = tie_points
            .iter()
            .flat_map(|tie_point| tie_point.values())
            .collect::<Vec<_>>();
        self.set_field_array(tags::GEO_TIE_POINTS, &values)
    }

    fn transformation_matrix(&self) -> Result<Option<[f64; 16]>> {
        let Some(values) = self.get_field_array::<f64>(tags::GEO_TRANSFORMATION_MATRIX)? else {
            return Ok(None);
        };
        let matrix: [f64; 16] = values.as_slice().try_into().map_err(|_| {
            GeoError::BadArgument(format!(
                "ModelTransformation holds {} values instead of 16",
                values.len()
            ))
        })?;
        Ok(Some(matrix))
    }

    fn set_transformation_matrix(&mut self, matrix: &[f64; 16]) -> Result<()> {
        self.set_field_array(tags::GEO_TRANSFORMATION_MATRIX, matrix)
    }

    fn geo_key_directory(&self) -> Result<Option<Vec<u16>>> {
        self.get_field_array(tags::GEO_KEY_DIRECTORY)
    }

    fn set_geo_key_directory(&mut self, keys: &[u16]) -> Result<()> {
        self.set_field_array(tags::GEO_KEY_DIRECTORY, keys)
    }

    fn geo_double_params(&self) -> Result<Option<Vec<f64>>> {
        self.get_field_array(tags::GEO_DOUBLE_PARAMS)
    }

    fn set_geo_double_params(&mut self, params: &[f64]) -> Result<()> {
        self.set_field_array(tags::GEO_DOUBLE_PARAMS, params)
    }

    fn geo_ascii_params(&self) -> Result<Option<String>> {
        self.get_field_string(tags::GEO_ASCII_PARAMS)
    }

    fn set_geo_ascii_params(&mut self, params: &str) -> Result<()> {
        self.set_field_string(tags::GEO_ASCII_PARAMS, params)
    }

    fn nodata(&self) -> Result<Option<f64>> {
        let Some(value) = self.get_field_string(tags::GDAL_NODATA)? else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| GeoError::BadArgument(format!("invalid nodata value '{value}'")))
    }

    fn set_nodata(&mut self, nodata: f64) -> Result<()> {
        let value = if nodata.is_nan() {
            "nan".to_string()
        } else {
            nodata.to_string()
        };
        self.set_field_string(tags::GDAL_NODATA, &value)
    }

    fn gdal_metadata(&self) -> Result<Option<String>> {
        self.get_field_string(tags::GDAL_METADATA)
    }

    fn set_gdal_metadata(&mut self, metadata: &str) -> Result<()> {
        self.set_field_string(tags::GDAL_METADATA, metadata)
    }

    fn geo_transform(&self) -> Result<Option<GeoTransform>> {
        if let Some(m) = self.transformation_matrix()? {
            return Ok(Some([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
        let tie_points = self.tie_points()?;
        let (Some(tie_point), Some(scale)) = (tie_points.first(), self.pixel_scale()?) else {
            return Ok(None);
        };
        Ok(Some([
            tie_point.x - tie_point.i * scale[0],
            scale[0],
            0.0,
            tie_point.y + tie_point.j * scale[1],
            0.0,
            -scale[1],
        ]))
    }

    fn set_geo_transform(&mut self, gt: &GeoTransform) -> Result<()> {
        if gt[2] == 0.0 && gt[4] == 0.0 {
            self.set_tie_points(&[TiePoint {
                x: gt[0],
                y: gt[3],
                ..TiePoint::default()
            }])?;
            return self.set_pixel_scale([gt[1], -gt[5], 0.0]);
        }
        #[rustfmt::skip]
        let matrix = [
            gt[1], gt[2], 0.0, gt[0],
            gt[4], gt[5], 0.0, gt[3],
            0.0,   0.0,   0.0, 0.0,
            0.0,   0.0,   0.0, 1.0,
        ];
        self.set_transformation_matrix(&matrix)
    }
}
