use semver::Version;

use pkg_config::Config;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A native library this crate links against.
struct NativeLib {
    /// Link name on unix-like targets.
    name: &'static str,
    /// `pkg-config` package name.
    pkg_name: &'static str,
    /// Prefix of the `*_LIB_DIR`, `*_INCLUDE_DIR`, `*_HOME`, `*_VERSION`,
    /// `*_STATIC` and `*_DYNAMIC` environment variables.
    env_prefix: &'static str,
    /// Import library name used by MSVC builds.
    msvc_lib: &'static str,
    /// Oldest release whose API is declared in this crate.
    min_version: Version,
}

fn env_dir(var: &str) -> Option<PathBuf> {
    let dir = env::var_os(var).map(PathBuf::from);

    if let Some(ref dir) = dir {
        if !dir.exists() {
            panic!("{} was set to {}, which doesn't exist.", var, dir.display());
        }
    }

    dir
}

fn find_dll(lib_dir: &Path, stem: &str) -> io::Result<Option<String>> {
    for e in fs::read_dir(lib_dir)? {
        let e = e?;
        let name = e.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(stem) && name.ends_with(".dll") {
            return Ok(Some(name.into_owned()));
        }
    }
    Ok(None)
}

/// Development builds report versions like `9.4.0dev`, which is not valid semver.
fn parse_version(raw: &str) -> Option<Version> {
    let mut version_string = raw.trim().to_string();
    if let Some(idx) = version_string.rfind(|c: char| c.is_ascii_digit()) {
        if idx + 1 < version_string.len() && !version_string[idx + 1..].starts_with('-') {
            version_string.insert(idx + 1, '-');
        }
    }
    Version::parse(&version_string).ok()
}

/// Locates `lib`, emits the link directives and returns its version if it could be determined.
fn probe(lib: &NativeLib) -> Option<Version> {
    let var = |suffix: &str| format!("{}_{}", lib.env_prefix, suffix);

    for suffix in ["STATIC", "DYNAMIC", "INCLUDE_DIR", "LIB_DIR", "HOME", "VERSION"] {
        println!("cargo:rerun-if-env-changed={}", var(suffix));
    }

    let mut need_metadata = true;
    let mut lib_name = String::from(lib.name);

    let mut prefer_static =
        env::var_os(var("STATIC")).is_some() && env::var_os(var("DYNAMIC")).is_none();

    let mut lib_dir = env_dir(&var("LIB_DIR"));
    let home_dir = env_dir(&var("HOME"));
    let mut version = env::var_os(var("VERSION"))
        .map(|vs| vs.to_string_lossy().to_string())
        .and_then(|vs| parse_version(&vs));

    let mut found = false;
    if cfg!(windows) {
        // first, look for an import library in $*_LIB_DIR or $*_HOME/lib
        let import_lib = format!("{}.lib", lib.msvc_lib);
        if let Some(ref dir) = lib_dir {
            if dir.join(&import_lib).exists() {
                lib_name = lib.msvc_lib.to_string();
                found = true;
            }
        }
        if !found {
            if let Some(ref home_dir) = home_dir {
                let home_lib_dir = home_dir.join("lib");
                if home_lib_dir.join(&import_lib).exists() {
                    lib_name = lib.msvc_lib.to_string();
                    lib_dir = Some(home_lib_dir);
                    found = true;
                }
            }
        }
        if !found {
            // otherwise, look for a dll in $*_HOME/bin (windows-gnu)
            if let Some(ref home_dir) = home_dir {
                let bin_dir = home_dir.join("bin");
                if bin_dir.exists() {
                    if let Ok(Some(name)) = find_dll(&bin_dir, lib.name) {
                        prefer_static = false;
                        lib_dir = Some(bin_dir);
                        lib_name = name;
                        found = true;
                    }
                }
            }
        }
    }

    if let Some(ref home_dir) = home_dir {
        if lib_dir.is_none() {
            let dir = home_dir.join("lib");
            if !dir.exists() {
                panic!(
                    "{} was not set and {} doesn't exist.",
                    var("LIB_DIR"),
                    dir.display()
                );
            }
            lib_dir = Some(dir);
        }
    }

    if let Some(lib_dir) = lib_dir {
        let link_type = if prefer_static { "static" } else { "dylib" };

        println!("cargo:rustc-link-lib={link_type}={lib_name}");
        println!("cargo:rustc-link-search={}", lib_dir.display());

        if !prefer_static {
            need_metadata = false;
        }
    }

    let pkg_config = Config::new()
        .statik(prefer_static)
        .cargo_metadata(need_metadata)
        .probe(lib.pkg_name);

    match &pkg_config {
        Ok(library) => {
            if version.is_none() {
                version = parse_version(&library.version);
            }
        }
        Err(pkg_config_err) => {
            if !found && need_metadata {
                // Special case output for this common error
                if matches!(pkg_config_err, pkg_config::Error::Command { cause, .. } if cause.kind() == io::ErrorKind::NotFound)
                {
                    panic!("Could not find `pkg-config` in your path. Please install it or set {}.", var("LIB_DIR"));
                }
                panic!(
                    "Unable to locate {} with pkg-config: {}",
                    lib.pkg_name, pkg_config_err
                );
            }
        }
    }

    if let Some(version) = &version {
        if *version < lib.min_version {
            panic!(
                "{} {} is too old, at least {} is required.",
                lib.pkg_name, version, lib.min_version
            );
        }
    }

    version
}

fn main() {
    let libs = [
        NativeLib {
            name: "tiff",
            pkg_name: "libtiff-4",
            env_prefix: "TIFF",
            msvc_lib: "tiff",
            min_version: Version::new(4, 0, 0),
        },
        NativeLib {
            name: "proj",
            pkg_name: "proj",
            env_prefix: "PROJ",
            msvc_lib: "proj",
            min_version: Version::new(6, 2, 0),
        },
    ];

    println!("cargo:rustc-check-cfg=cfg(tiff_ge_4_5)");
    println!("cargo:rustc-check-cfg=cfg(proj_ge_8)");

    for lib in &libs {
        if let Some(version) = probe(lib) {
            // this version number mirrors the usual MAJOR*1000000+MINOR*10000+PATCH*100 scheme
            let version_number = version.major * 1_000_000 + version.minor * 10_000 + version.patch * 100;
            println!("cargo:{}_version_number={}", lib.name, version_number);

            // declarations whose signature or existence depends on the release
            if lib.name == "tiff" && version >= Version::new(4, 5, 0) {
                println!("cargo:rustc-cfg=tiff_ge_4_5");
            }
            if lib.name == "proj" && version >= Version::new(8, 0, 0) {
                println!("cargo:rustc-cfg=proj_ge_8");
            }
        }
    }
}
