use std::ffi::c_uint;

use bitflags::bitflags;

use crate::errors::{GeoError, Result};

bitflags! {
    /// Open flags used by [`Tiff::open_ex`](crate::raster::Tiff::open_ex).
    ///
    /// Each flag maps onto one character of the mode string handed to [`TIFFOpen`].
    /// Exactly one of `READ`, `WRITE` and `APPEND` must be present.
    ///
    /// [`TIFFOpen`]: http://www.simplesystems.org/libtiff/functions/TIFFOpen.html
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: c_uint {
        /// Open an existing file for reading (`r`).
        const READ = 0x01;
        /// Create a new file, truncating any existing one (`w`).
        const WRITE = 0x02;
        /// Open an existing file to append directories (`a`).
        const APPEND = 0x04;
        /// Create a BigTIFF file (`8`).
        const BIG_TIFF = 0x08;
        /// Write big-endian byte order (`b`).
        const BIG_ENDIAN = 0x10;
        /// Write little-endian byte order (`l`).
        const LITTLE_ENDIAN = 0x20;
        /// Do not memory map the file when reading (`m`).
        const NO_MMAP = 0x40;
        /// Do not split uncompressed single-strip images into several strips (`c`).
        const NO_STRIP_CHOP = 0x80;
    }
}

impl Default for OpenFlags {
    fn default() -> OpenFlags {
        OpenFlags::READ
    }
}

impl OpenFlags {
    /// Builds the libtiff mode string, e.g. `"w8l"`.
    pub fn mode_string(&self) -> Result<String> {
        let access = [
            (OpenFlags::READ, 'r'),
            (OpenFlags::WRITE, 'w'),
            (OpenFlags::APPEND, 'a'),
        ];
        let mut selected = access.iter().filter(|(flag, _)| self.contains(*flag));
        let mut mode = match (selected.next(), selected.next()) {
            (Some((_, c)), None) => c.to_string(),
            _ => {
                return Err(GeoError::BadArgument(format!(
                    "exactly one of READ, WRITE or APPEND must be set, got {self:?}"
                )))
            }
        };
        if self.contains(OpenFlags::BIG_ENDIAN | OpenFlags::LITTLE_ENDIAN) {
            return Err(GeoError::BadArgument(
                "BIG_ENDIAN and LITTLE_ENDIAN are mutually exclusive".to_string(),
            ));
        }

        let modifiers = [
            (OpenFlags::BIG_TIFF, '8'),
            (OpenFlags::BIG_ENDIAN, 'b'),
            (OpenFlags::LITTLE_ENDIAN, 'l'),
            (OpenFlags::NO_MMAP, 'm'),
            (OpenFlags::NO_STRIP_CHOP, 'c'),
        ];
        mode.extend(
            modifiers
                .iter()
                .filter(|(flag, _)| self.contains(*flag))
                .map(|(_, c)| *c),
        );
        Ok(mode)
    }

    /// Parses a libtiff mode string back into flags.
    ///
    /// Characters libtiff understands but that have no flag here (`h`, `H`, `L`, `B`,
    /// `M`, `C`, `O`, `4`, `D`) are rejected.
    pub fn from_mode_string(mode: &str) -> Result<OpenFlags> {
        let mut flags = OpenFlags::empty();
        for c in mode.chars() {
            flags |= match c {
                'r' => OpenFlags::READ,
                'w' => OpenFlags::WRITE,
                'a' => OpenFlags::APPEND,
                '8' => OpenFlags::BIG_TIFF,
                'b' => OpenFlags::BIG_ENDIAN,
                'l' => OpenFlags::LITTLE_ENDIAN,
                'm' => OpenFlags::NO_MMAP,
                'c' => OpenFlags::NO_STRIP_CHOP,
                other => {
                    return Err(GeoError::BadArgument(format!(
                        "unsupported TIFF open mode character '{other}' in '{mode}'"
                    )))
                }
            };
        }
        // validates the access character
        flags.mode_string()?;
        Ok(flags)
    }

    /// Returns `true` if the file may be modified through the handle.
    pub fn is_writable(&self) -> bool {
        self.intersects(OpenFlags::WRITE | OpenFlags::APPEND)
    }
}
