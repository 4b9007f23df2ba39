use std::path::{Path, PathBuf};

use crate::raster::{tags, Tiff};

/// A struct that contains a temporary directory and a path to a file in that directory.
pub struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

impl TempFixture {
    /// Creates a temporary directory and path to a non-existent file with given `name`.
    /// Useful for writing results to during testing
    ///
    /// Returns the struct `TempFixture` that contains the temp dir (for clean-up on `drop`)
    /// as well as the empty file path.
    pub fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

impl AsRef<Path> for TempFixture {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Layout of a generated test image.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    Striped { rows_per_strip: u32 },
    Tiled { tile_width: u32, tile_length: u32 },
}

/// Writes the tags of an uncompressed, 8-bit, single sample image.
pub fn set_gray8_tags(tiff: &mut Tiff, width: u32, length: u32, layout: Layout) {
    tiff.set_field(tags::IMAGE_WIDTH, width).unwrap();
    tiff.set_field(tags::IMAGE_LENGTH, length).unwrap();
    tiff.set_field(tags::BITS_PER_SAMPLE, 8u16).unwrap();
    tiff.set_field(tags::SAMPLES_PER_PIXEL, 1u16).unwrap();
    tiff.set_field(tags::COMPRESSION, tags::compression::NONE)
        .unwrap();
    tiff.set_field(tags::PHOTOMETRIC, tags::photometric::MIN_IS_BLACK)
        .unwrap();
    tiff.set_field(tags::PLANAR_CONFIG, tags::planar_config::CONTIG)
        .unwrap();
    match layout {
        Layout::Striped { rows_per_strip } => {
            tiff.set_field(tags::ROWS_PER_STRIP, rows_per_strip).unwrap();
        }
        Layout::Tiled {
            tile_width,
            tile_length,
        } => {
            tiff.set_field(tags::TILE_WIDTH, tile_width).unwrap();
            tiff.set_field(tags::TILE_LENGTH, tile_length).unwrap();
        }
    }
}

/// Pixel value of the generated test images.
pub fn gray8_value(col: u32, row: u32) -> u8 {
    ((col + 3 * row) % 251) as u8
}

/// Creates an uncompressed 8-bit grayscale image at `path`, filled with [`gray8_value`].
pub fn write_gray8(path: &Path, width: u32, length: u32, layout: Layout) {
    let mut tiff = Tiff::create(path).unwrap();
    set_gray8_tags(&mut tiff, width, length, layout);
    match layout {
        Layout::Striped { rows_per_strip } => {
            let rows_per_strip = rows_per_strip.min(length);
            for (strip, first_row) in (0..length).step_by(rows_per_strip as usize).enumerate() {
                let last_row = (first_row + rows_per_strip).min(length);
                let data = (first_row..last_row)
                    .flat_map(|row| (0..width).map(move |col| gray8_value(col, row)))
                    .collect::<Vec<_>>();
                tiff.write_encoded_strip(strip as u32, &data).unwrap();
            }
        }
        Layout::Tiled {
            tile_width,
            tile_length,
        } => {
            for tile_row in (0..length).step_by(tile_length as usize) {
                for tile_col in (0..width).step_by(tile_width as usize) {
                    // edge tiles are padded to the full tile size
                    let data = (tile_row..tile_row + tile_length)
                        .flat_map(|row| {
                            (tile_col..tile_col + tile_width).map(move |col| {
                                if col < width && row < length {
                                    gray8_value(col, row)
                                } else {
                                    0
                                }
                            })
                        })
                        .collect::<Vec<_>>();
                    let tile = tiff.compute_tile(tile_col, tile_row, 0);
                    tiff.write_encoded_tile(tile, &data).unwrap();
                }
            }
        }
    }
    tiff.close().unwrap();
}

/// Assert numerical difference between two expressions is less than
/// 64-bit machine epsilon or a specified epsilon.
///
/// # Examples:
/// ```rust, ignore
/// use libgeo::assert_near;
/// use std::f64::consts::{PI, E};
/// assert_near!(PI / E, 1.1557273497909217);
/// // with specified epsilon
/// assert_near!(PI / E, 1.15572734, epsilon = 1e-8);
/// ```
#[macro_export]
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    ($left:expr, $right:expr, epsilon = $ep:expr, field = $field:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "field {}: |{} - {}| = {} is greater than epsilon {:.4e}",
            $field,
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
}
