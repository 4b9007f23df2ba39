//! Process-wide configuration
//!
//! Two things in the wrapped libraries are global to the process and are therefore
//! configured here rather than on a handle:
//!
//! * an observer for every libtiff error and warning, see [`set_error_handler`];
//! * the directory PROJ loads its resource files (`proj.db`, grids) from when no
//!   explicit [`ProjConfig`](crate::spatial_ref::ProjConfig) is given, see
//!   [`set_proj_search_path`].
//!
//! ```no_run
//! use libgeo::config;
//! use libgeo::errors::TiffMessageLevel;
//!
//! config::set_error_handler(|level, module, msg| {
//!     if level == TiffMessageLevel::Error {
//!         eprintln!("{module}: {msg}");
//!     }
//! });
//!
//! // Remove the handler again
//! config::remove_error_handler();
//! ```

use std::path::Path;
use std::sync::Mutex;

use crate::errors::{GeoError, Result, TiffMessageLevel};

type ErrorCallbackType = dyn FnMut(TiffMessageLevel, &str, &str) + 'static + Send;

/// Static variable that holds the current error callback function
static ERROR_CALLBACK: Mutex<Option<Box<ErrorCallbackType>>> = Mutex::new(None);

/// Environment variables read by PROJ's resource loader (`PROJ_DATA` since PROJ 9.1).
const PROJ_DATA_VARS: [&str; 2] = ["PROJ_DATA", "PROJ_LIB"];

/// Set a custom handler for libtiff errors and warnings.
///
/// The handler sees every message, whether it was raised on an open
/// [`Tiff`](crate::raster::Tiff) or outside of any handle. Messages are still recorded in
/// the owning handle's error slot and logged through the `log` crate.
///
/// The function must be `Send` since libtiff may report from any thread that uses a handle.
pub fn set_error_handler<F>(callback: F)
where
    F: FnMut(TiffMessageLevel, &str, &str) + 'static + Send,
{
    crate::raster::_install_process_handlers();

    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        // poisoning could only occur on a panicking callback, the slot itself stays valid
        Err(poison_error) => poison_error.into_inner(),
    };
    callback_lock.replace(Box::new(callback));
}

/// Remove a custom error handler for libtiff.
pub fn remove_error_handler() {
    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    callback_lock.take();
}

/// Forwards one libtiff message to the log and to the installed handler, if any.
pub(crate) fn _dispatch_tiff_message(level: TiffMessageLevel, module: &str, msg: &str) {
    log::log!(target: "libgeo::tiff", level.log_level(), "{module}: {msg}");

    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    if let Some(callback) = callback_lock.as_mut() {
        callback(level, module, msg);
    }
}

/// Point PROJ's resource loader at `path` for the whole process.
///
/// Sets the `PROJ_DATA` and `PROJ_LIB` environment variables. This affects every
/// projection created afterwards, in every thread, and cannot be scoped; it has to
/// happen before any projection needing those resources is created. Prefer passing a
/// [`ProjConfig`](crate::spatial_ref::ProjConfig) when creating projections.
pub fn set_proj_search_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let value = path.as_os_str();
    if value.is_empty() {
        return Err(GeoError::BadArgument(
            "PROJ search path must not be empty".to_string(),
        ));
    }
    if value.to_string_lossy().contains('\0') {
        return Err(GeoError::BadArgument(format!(
            "PROJ search path contains a NUL byte: {}",
            path.display()
        )));
    }
    for var in PROJ_DATA_VARS {
        std::env::set_var(var, value);
    }
    log::debug!(target: "libgeo::proj", "PROJ search path set to {}", path.display());
    Ok(())
}

/// Returns the PROJ search path configured through the environment, if any.
pub fn proj_search_path() -> Option<String> {
    PROJ_DATA_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
}
