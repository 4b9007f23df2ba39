#[cfg(feature = "ndarray")]
use ndarray::Array3;

/// Splits a packed libtiff RGBA pixel into `[r, g, b, a]`.
///
/// libtiff packs the red sample in the least significant byte (`ABGR` on little-endian hosts).
pub fn rgba_components(pixel: u32) -> [u8; 4] {
    [
        (pixel & 0xff) as u8,
        ((pixel >> 8) & 0xff) as u8,
        ((pixel >> 16) & 0xff) as u8,
        (pixel >> 24) as u8,
    ]
}

/// RGBA pixels decoded by libtiff for one strip or tile.
///
/// `data` is kept exactly as libtiff writes it: packed pixels, row-major, with the
/// **bottom-left** pixel first. Use [`pixel`](Self::pixel), [`to_top_down`](Self::to_top_down)
/// or [`to_array`](Self::to_array) for top-left oriented access.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct RgbaBuffer {
    /// `(cols, rows)`
    pub size: (usize, usize),
    pub data: Vec<u32>,
}

impl RgbaBuffer {
    /// Construct a new buffer from `size` (`(cols, rows)`) and bottom-up pixel data.
    ///
    /// # Panic
    /// Will panic if `size.0 * size.1 != data.len()`.
    pub fn new(size: (usize, usize), data: Vec<u32>) -> Self {
        assert_eq!(
            size.0 * size.1,
            data.len(),
            "size {:?} does not match length {}",
            size,
            data.len()
        );
        RgbaBuffer { size, data }
    }

    /// The `[r, g, b, a]` samples at `col`, `row`, counted from the top-left corner.
    pub fn pixel(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        let (cols, rows) = self.size;
        if col >= cols || row >= rows {
            return None;
        }
        let index = (rows - 1 - row) * cols + col;
        self.data.get(index).copied().map(rgba_components)
    }

    /// Packed pixels reordered so that the top-left pixel comes first.
    pub fn to_top_down(&self) -> Vec<u32> {
        let cols = self.size.0.max(1);
        self.data
            .chunks(cols)
            .rev()
            .flatten()
            .copied()
            .collect()
    }

    #[cfg(feature = "ndarray")]
    #[cfg_attr(docsrs, doc(cfg(feature = "array")))]
    /// Convert `self` into an [`ndarray::Array3`] of shape `(rows, cols, 4)`, top row first.
    pub fn to_array(&self) -> crate::errors::Result<Array3<u8>> {
        let data = self
            .to_top_down()
            .into_iter()
            .flat_map(rgba_components)
            .collect::<Vec<_>>();
        // Array3 shape is (rows, cols, samples) and buffer shape is (cols, rows)
        Ok(Array3::from_shape_vec((self.size.1, self.size.0, 4), data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_components() {
        assert_eq!(rgba_components(0xff00_80ff), [0xff, 0x80, 0x00, 0xff]);
        assert_eq!(rgba_components(0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_pixel_origin() {
        // two rows, bottom row first
        let buffer = RgbaBuffer::new((2, 2), vec![1, 2, 3, 4]);
        assert_eq!(buffer.pixel(0, 0), Some(rgba_components(3)));
        assert_eq!(buffer.pixel(1, 1), Some(rgba_components(2)));
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.to_top_down(), vec![3, 4, 1, 2]);
    }

    #[test]
    #[should_panic]
    fn test_size_mismatch() {
        RgbaBuffer::new((3, 2), vec![0; 5]);
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_to_array() {
        let buffer = RgbaBuffer::new((1, 2), vec![0xff00_0001, 0xff00_0002]);
        let array = buffer.to_array().unwrap();
        assert_eq!(array.shape(), &[2, 1, 4]);
        assert_eq!(array[[0, 0, 0]], 2);
        assert_eq!(array[[1, 0, 0]], 1);
        assert_eq!(array[[1, 0, 3]], 0xff);
    }
}
