use std::ffi::{c_char, c_int, c_void, CString};
use std::path::PathBuf;
use std::ptr;

use libgeo_sys::{PJ, PJ_CONTEXT, PJ_LOG_LEVEL, PJ_PROJ_STRING_TYPE};

use crate::errors::{GeoError, Result};
use crate::spatial_ref::CoordTransform;
use crate::utils::{_path_to_c_string, _string};

/// Verbosity of the messages PROJ forwards to the `log` crate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjLogLevel {
    None,
    #[default]
    Error,
    Debug,
    Trace,
}

impl ProjLogLevel {
    fn to_c(self) -> PJ_LOG_LEVEL::Type {
        match self {
            ProjLogLevel::None => PJ_LOG_LEVEL::PJ_LOG_NONE,
            ProjLogLevel::Error => PJ_LOG_LEVEL::PJ_LOG_ERROR,
            ProjLogLevel::Debug => PJ_LOG_LEVEL::PJ_LOG_DEBUG,
            ProjLogLevel::Trace => PJ_LOG_LEVEL::PJ_LOG_TRACE,
        }
    }
}

/// Settings of the PROJ context owned by a [`Projection`] or [`CoordTransform`].
///
/// With an empty `search_paths`, PROJ falls back to its defaults and the `PROJ_DATA`
/// environment variable (see [`set_proj_search_path`](crate::config::set_proj_search_path)).
///
/// ```rust, no_run
/// # fn main() -> libgeo::errors::Result<()> {
/// use libgeo::spatial_ref::{ProjConfig, ProjLogLevel, Projection};
///
/// let config = ProjConfig {
///     search_paths: vec!["/opt/proj/share".into()],
///     log_level: ProjLogLevel::Debug,
/// };
/// let utm = Projection::from_definition_with_config("EPSG:32633", &config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjConfig {
    pub search_paths: Vec<PathBuf>,
    pub log_level: ProjLogLevel,
}

unsafe extern "C" fn log_proj_message(_app_data: *mut c_void, level: c_int, msg: *const c_char) {
    if msg.is_null() {
        return;
    }
    let level = match level {
        PJ_LOG_LEVEL::PJ_LOG_ERROR => log::Level::Error,
        PJ_LOG_LEVEL::PJ_LOG_DEBUG => log::Level::Debug,
        _ => log::Level::Trace,
    };
    log::log!(target: "libgeo::proj", level, "{}", _string(msg));
}

/// Owned PROJ context, destroyed on drop.
#[derive(Debug)]
pub(crate) struct Context {
    c_ctx: *mut PJ_CONTEXT,
    config: ProjConfig,
}

impl Context {
    pub(crate) fn new(config: &ProjConfig) -> Result<Context> {
        let c_ctx = unsafe { libgeo_sys::proj_context_create() };
        if c_ctx.is_null() {
            return Err(GeoError::NullPointer {
                method_name: "proj_context_create",
                msg: "Unable to create PROJ context".to_string(),
            });
        }
        let ctx = Context {
            c_ctx,
            config: config.clone(),
        };
        unsafe {
            libgeo_sys::proj_log_func(c_ctx, ptr::null_mut(), Some(log_proj_message));
            libgeo_sys::proj_log_level(c_ctx, config.log_level.to_c());
        }
        if !config.search_paths.is_empty() {
            let paths = config
                .search_paths
                .iter()
                .map(|path| _path_to_c_string(path))
                .collect::<Result<Vec<_>>>()?;
            let path_ptrs = paths.iter().map(|path| path.as_ptr()).collect::<Vec<_>>();
            unsafe {
                libgeo_sys::proj_context_set_search_paths(
                    c_ctx,
                    path_ptrs.len() as c_int,
                    path_ptrs.as_ptr(),
                )
            };
        }
        Ok(ctx)
    }

    pub(crate) fn c_ctx(&self) -> *mut PJ_CONTEXT {
        self.c_ctx
    }

    pub(crate) fn config(&self) -> &ProjConfig {
        &self.config
    }

    pub(crate) fn errno(&self) -> i32 {
        unsafe { libgeo_sys::proj_context_errno(self.c_ctx) }
    }

    /// PROJ's text for error `code`.
    pub(crate) fn error_message(&self, code: i32) -> String {
        #[cfg(proj_ge_8)]
        let c_msg = unsafe { libgeo_sys::proj_context_errno_string(self.c_ctx, code) };
        #[cfg(not(proj_ge_8))]
        let c_msg = unsafe { libgeo_sys::proj_errno_string(code) };
        if c_msg.is_null() {
            return format!("PROJ error {code}");
        }
        _string(c_msg)
    }

    pub(crate) fn last_proj_err(&self, method_name: &'static str) -> GeoError {
        let code = self.errno();
        GeoError::ProjError {
            method_name,
            code,
            msg: self.error_message(code),
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe { libgeo_sys::proj_context_destroy(self.c_ctx) };
    }
}

/// Appends `+type=crs` to a bare PROJ string so that it describes a CRS rather than a
/// coordinate operation.
fn _crs_definition(definition: &str) -> String {
    let trimmed = definition.trim();
    let is_proj_string = trimmed.starts_with('+') || trimmed.starts_with("proj=");
    if is_proj_string && !trimmed.contains("type=") && !trimmed.contains("proj=pipeline") {
        format!("{trimmed} +type=crs")
    } else {
        trimmed.to_string()
    }
}

/// A coordinate reference system parsed by PROJ.
///
/// Each `Projection` owns its own PROJ context, so values can be moved to other threads
/// independently.
///
/// ```rust, no_run
/// # fn main() -> libgeo::errors::Result<()> {
/// use libgeo::spatial_ref::Projection;
///
/// let lcc = Projection::from_definition(
///     "+proj=lcc +lat_1=33 +lat_2=45 +lon_0=-100 +datum=NAD83",
/// )?;
/// println!("{} ({})", lcc.name(), lcc.definition()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Projection {
    c_proj: *mut PJ,
    ctx: Context,
    source: String,
}

// The context and object are used from one thread at a time.
unsafe impl Send for Projection {}

impl Projection {
    /// Parse `definition`: a PROJ string, WKT, `AUTHORITY:CODE` or PROJJSON.
    ///
    /// PROJ strings are read as CRS definitions (`+type=crs` is implied).
    pub fn from_definition(definition: &str) -> Result<Projection> {
        Self::from_definition_with_config(definition, &ProjConfig::default())
    }

    /// Parse `definition` with a context set up from `config`.
    pub fn from_definition_with_config(definition: &str, config: &ProjConfig) -> Result<Projection> {
        let ctx = Context::new(config)?;
        let c_definition = CString::new(_crs_definition(definition))?;
        let c_proj = unsafe { libgeo_sys::proj_create(ctx.c_ctx(), c_definition.as_ptr()) };
        if c_proj.is_null() {
            let mut err = ctx.last_proj_err("proj_create");
            if let GeoError::ProjError { code: 0, msg, .. } = &mut err {
                *msg = format!("Unable to parse '{definition}'");
            }
            return Err(err);
        }
        log::debug!(target: "libgeo::proj", "created projection from '{definition}'");
        Ok(Projection {
            c_proj,
            ctx,
            source: definition.to_string(),
        })
    }

    /// Returns a C pointer to the wrapped PROJ object.
    ///
    /// # Safety
    /// This method returns a raw C pointer, only valid while `self` is alive.
    pub unsafe fn c_proj(&self) -> *mut PJ {
        self.c_proj
    }

    pub(crate) fn context(&self) -> &Context {
        &self.ctx
    }

    /// The definition this projection was created from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The object's name as reported by PROJ, e.g. `"WGS 84"` or `"unknown"`.
    pub fn name(&self) -> String {
        _string(unsafe { libgeo_sys::proj_get_name(self.c_proj) })
    }

    pub fn is_crs(&self) -> bool {
        unsafe { libgeo_sys::proj_is_crs(self.c_proj) != 0 }
    }

    /// Export as a PROJ string.
    pub fn definition(&self) -> Result<String> {
        let c_str = unsafe {
            libgeo_sys::proj_as_proj_string(
                self.ctx.c_ctx(),
                self.c_proj,
                PJ_PROJ_STRING_TYPE::PJ_PROJ_5,
                ptr::null(),
            )
        };
        if c_str.is_null() {
            return Err(self.ctx.last_proj_err("proj_as_proj_string"));
        }
        Ok(_string(c_str))
    }

    /// Transform coordinates in place from `self` to `target`.
    ///
    /// Builds a [`CoordTransform`] for a single use; keep one around when transforming
    /// repeatedly between the same pair.
    pub fn transform_to(
        &self,
        target: &Projection,
        xs: &mut [f64],
        ys: &mut [f64],
        zs: Option<&mut [f64]>,
    ) -> Result<()> {
        CoordTransform::new(self, target)?.transform_coords(xs, ys, zs)
    }
}

impl Drop for Projection {
    fn drop(&mut self) {
        unsafe { libgeo_sys::proj_destroy(self.c_proj) };
    }
}

#[cfg(test)]
mod tests {
    use super::_crs_definition;

    #[test]
    fn test_crs_definition() {
        assert_eq!(
            _crs_definition(" +proj=merc +datum=WGS84 "),
            "+proj=merc +datum=WGS84 +type=crs"
        );
        assert_eq!(
            _crs_definition("+proj=longlat +type=crs"),
            "+proj=longlat +type=crs"
        );
        assert_eq!(
            _crs_definition("+proj=pipeline +step +proj=axisswap +order=2,1"),
            "+proj=pipeline +step +proj=axisswap +order=2,1"
        );
        assert_eq!(_crs_definition("EPSG:4326"), "EPSG:4326");
    }
}
