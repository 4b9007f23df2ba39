//! Version inspection of the linked libtiff and PROJ libraries
//!
//! ## Example
//!
//! ```rust, no_run
//! use libgeo::version::VersionInfo;
//! println!("{}", VersionInfo::TIFF_VERSION);
//! println!("{}", VersionInfo::VERSION_REPORT);
//! ```
//! ```text
//! LIBTIFF, Version 4.5.1
//! ...
//! ```

use crate::utils::{_string, _string_array};
use std::fmt::{Debug, Display, Formatter};

/// The banner returned by `TIFFGetVersion`, i.e. "LIBTIFF, Version 4.5.1" followed by a
/// copyright notice.
pub fn tiff_version_info() -> String {
    _string(unsafe { libgeo_sys::TIFFGetVersion() })
}

/// `(major, minor, patch)` of the PROJ library in use.
pub fn proj_version() -> (i32, i32, i32) {
    let info = unsafe { libgeo_sys::proj_info() };
    (info.major, info.minor, info.patch)
}

/// The release string of `proj_info`, i.e. "Rel. 9.2.0, March 1st, 2023".
pub fn proj_version_info() -> String {
    _string(unsafe { libgeo_sys::proj_info() }.release)
}

/// Directories the default PROJ context searches for resource files.
pub fn proj_search_paths() -> Vec<String> {
    let info = unsafe { libgeo_sys::proj_info() };
    _string_array(info.paths, info.path_count)
}

/// Convenience selector for the version information that may be queried.
///
/// `VersionInfo` has a `Display` implementation which fetches the associated value and
/// returns it as a string.
#[allow(non_camel_case_types)]
#[non_exhaustive]
#[derive(Copy, Clone)]
pub enum VersionInfo {
    /// First line of the libtiff banner, i.e. "LIBTIFF, Version 4.5.1"
    TIFF_VERSION,
    /// PROJ release line, i.e. "Rel. 9.2.0, March 1st, 2023"
    PROJ_RELEASE,
    /// PROJ version as "MAJOR.MINOR.PATCH"
    PROJ_VERSION,
    /// Versions found when building, empty when the build script did not report them
    BUILD_INFO,
    /// Render all available version and build details in a multiline, debug string
    VERSION_REPORT,
}

use VersionInfo::*;
impl VersionInfo {
    /// Get the complete list of variants.
    pub fn options() -> Vec<Self> {
        vec![
            TIFF_VERSION,
            PROJ_RELEASE,
            PROJ_VERSION,
            BUILD_INFO,
            VERSION_REPORT,
        ]
    }

    /// Get the variant's name
    pub fn name(&self) -> &'static str {
        match self {
            TIFF_VERSION => "TIFF_VERSION",
            PROJ_RELEASE => "PROJ_RELEASE",
            PROJ_VERSION => "PROJ_VERSION",
            BUILD_INFO => "BUILD_INFO",
            VERSION_REPORT => "VERSION_REPORT",
        }
    }

    fn value(&self) -> Option<String> {
        match self {
            TIFF_VERSION => Some(
                tiff_version_info()
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            ),
            PROJ_RELEASE => Some(proj_version_info()),
            PROJ_VERSION => {
                let (major, minor, patch) = proj_version();
                Some(format!("{major}.{minor}.{patch}"))
            }
            BUILD_INFO => Some(format!(
                "TIFF_BUILD_VERSION={}\nPROJ_BUILD_VERSION={}",
                option_env!("LIBGEO_TIFF_BUILD_VERSION").unwrap_or_default(),
                option_env!("LIBGEO_PROJ_BUILD_VERSION").unwrap_or_default()
            )),
            VERSION_REPORT => None,
        }
    }
}

/// Provides renderings of each variant name along with its value.
impl Debug for VersionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VERSION_REPORT => f
                .debug_struct("LibgeoVersionInfo")
                .field(TIFF_VERSION.name(), &TIFF_VERSION.to_string())
                .field(PROJ_VERSION.name(), &PROJ_VERSION.to_string())
                .field(PROJ_RELEASE.name(), &PROJ_RELEASE.to_string())
                .field(BUILD_INFO.name(), &BUILD_INFO)
                .finish(),
            BUILD_INFO => {
                let mut builder = f.debug_struct("");
                let text = BUILD_INFO.to_string();

                text.lines()
                    .filter_map(|l| l.split_once('='))
                    .for_each(|(key, value)| {
                        builder.field(key, &value);
                    });

                builder.finish()
            }
            i => f.debug_tuple(i.name()).field(&i.to_string()).finish(),
        }
    }
}

impl Display for VersionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Some(value) => f.write_str(&value),
            None => f.write_fmt(format_args!("{self:#?}")),
        }
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        TIFF_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiff_version() {
        let banner = tiff_version_info();
        assert!(banner.starts_with("LIBTIFF"), "{banner}");
        assert!(!TIFF_VERSION.to_string().contains('\n'));
    }

    #[test]
    fn test_proj_version() {
        let (major, _, _) = proj_version();
        assert!(major >= 6);
        let version = PROJ_VERSION.to_string();
        assert!(proj_version_info().contains(&version), "{version}");
    }

    #[test]
    fn test_version_report() {
        let report = VERSION_REPORT.to_string();
        assert!(report.contains(&PROJ_VERSION.to_string()));
        assert!(report.contains("TIFF_BUILD_VERSION"));
    }
}
