use std::env;

/// Splits a `MAJOR*1000000+MINOR*10000+PATCH*100` number into its parts.
fn split_version(version_number: u64) -> (u64, u64, u64) {
    let major = version_number / 1_000_000;
    let minor = (version_number - major * 1_000_000) / 10_000;
    let patch = (version_number - major * 1_000_000 - minor * 10_000) / 100;
    (major, minor, patch)
}

fn version_from_env(var: &str) -> Option<(u64, u64, u64)> {
    println!("cargo:rerun-if-env-changed={var}");
    let raw = env::var(var).ok()?;
    let number = raw
        .parse::<u64>()
        .unwrap_or_else(|_| panic!("{var} is not a number: {raw}"));
    Some(split_version(number))
}

fn main() {
    // exported by libgeo-sys through its `links = "geo"` metadata
    if let Some((major, minor, patch)) = version_from_env("DEP_GEO_TIFF_VERSION_NUMBER") {
        println!("cargo:rustc-env=LIBGEO_TIFF_BUILD_VERSION={major}.{minor}.{patch}");
        if (major, minor) >= (4, 5) {
            println!("cargo:rustc-cfg=tiff_ge_4_5");
        }
    }

    if let Some((major, minor, patch)) = version_from_env("DEP_GEO_PROJ_VERSION_NUMBER") {
        println!("cargo:rustc-env=LIBGEO_PROJ_BUILD_VERSION={major}.{minor}.{patch}");
        if major >= 8 {
            println!("cargo:rustc-cfg=proj_ge_8");
        }
    }
}
