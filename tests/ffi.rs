use std::ffi::{c_char, CStr, CString};
use std::ptr;

use libgeo::ffi::*;
use libgeo::raster::tags;

const WIDTH: u32 = 8;
const LENGTH: u32 = 4;

fn c_path(dir: &tempfile::TempDir, name: &str) -> CString {
    CString::new(dir.path().join(name).to_str().unwrap()).unwrap()
}

fn last_error() -> String {
    unsafe { CStr::from_ptr(geo_tiff_last_error()) }
        .to_string_lossy()
        .into_owned()
}

fn take_string(s: *mut c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    let value = unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned();
    unsafe { geo_string_free(s) };
    Some(value)
}

unsafe fn write_gray_image(path: &CString) {
    let handle = geo_tiff_open(path.as_ptr(), c"w".as_ptr());
    assert!(!handle.is_null(), "{}", last_error());
    assert!(geo_tiff_set_field_int(handle, tags::IMAGE_WIDTH, WIDTH as i32));
    assert!(geo_tiff_set_field_int(handle, tags::IMAGE_LENGTH, LENGTH as i32));
    assert!(geo_tiff_set_field_short(handle, tags::BITS_PER_SAMPLE, 8));
    assert!(geo_tiff_set_field_short(handle, tags::SAMPLES_PER_PIXEL, 1));
    assert!(geo_tiff_set_field_short(handle, tags::COMPRESSION, 1));
    assert!(geo_tiff_set_field_short(handle, tags::PHOTOMETRIC, 1));
    assert!(geo_tiff_set_field_short(handle, tags::PLANAR_CONFIG, 1));
    assert!(geo_tiff_set_field_int(handle, tags::ROWS_PER_STRIP, LENGTH as i32));
    assert!(geo_tiff_set_field_string(
        handle,
        tags::ARTIST,
        c"Somebody Else".as_ptr()
    ));
    let scale = [0.5, 0.25, 0.0];
    assert!(geo_tiff_set_field_double_array(
        handle,
        tags::GEO_PIXEL_SCALE,
        scale.as_ptr(),
        scale.len()
    ));
    let keys: [i16; 8] = [1, 1, 0, 1, 1024, 0, 1, 2];
    assert!(geo_tiff_set_field_short_array(
        handle,
        tags::GEO_KEY_DIRECTORY,
        keys.as_ptr(),
        keys.len()
    ));

    assert!(geo_tiff_set_field_double(handle, tags::SMIN_SAMPLE_VALUE, 1.0));
    assert!(geo_tiff_set_field_double(handle, tags::SMAX_SAMPLE_VALUE, 250.0));

    assert!(!geo_tiff_is_tiled(handle));
    assert_eq!(geo_tiff_number_of_strips(handle), 1);
    assert_eq!(geo_tiff_strip_size(handle), (WIDTH * LENGTH) as i64);
    let pixels: Vec<u8> = (0..(WIDTH * LENGTH) as u8).collect();
    assert_eq!(
        geo_tiff_write_strip(handle, 0, pixels.as_ptr(), pixels.len()),
        pixels.len() as i64
    );
    assert!(geo_tiff_close(handle));
}

#[test]
fn test_tiff_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = c_path(&dir, "gray.tif");
    unsafe {
        write_gray_image(&path);

        let handle = geo_tiff_open(path.as_ptr(), c"r".as_ptr());
        assert!(!handle.is_null(), "{}", last_error());

        let mut width = [0i32];
        assert_eq!(
            geo_tiff_get_field_int(handle, tags::IMAGE_WIDTH, width.as_mut_ptr(), 1),
            1
        );
        assert_eq!(width[0], WIDTH as i32);

        let mut bits = [0i16];
        assert_eq!(
            geo_tiff_get_field_short(handle, tags::BITS_PER_SAMPLE, bits.as_mut_ptr(), 1),
            1
        );
        assert_eq!(bits[0], 8);

        let mut scale = [0.0f64; 3];
        assert_eq!(
            geo_tiff_get_field_double(handle, tags::GEO_PIXEL_SCALE, scale.as_mut_ptr(), 3),
            3
        );
        assert_eq!(scale, [0.5, 0.25, 0.0]);

        let mut range = [0.0f64; 2];
        assert_eq!(
            geo_tiff_get_field_double(handle, tags::SMIN_SAMPLE_VALUE, range.as_mut_ptr(), 1),
            1
        );
        assert_eq!(
            geo_tiff_get_field_double(handle, tags::SMAX_SAMPLE_VALUE, range[1..].as_mut_ptr(), 1),
            1
        );
        assert_eq!(range, [1.0, 250.0]);

        // truncated to the capacity
        let mut keys = [0i16; 4];
        assert_eq!(
            geo_tiff_get_field_short(handle, tags::GEO_KEY_DIRECTORY, keys.as_mut_ptr(), 4),
            4
        );
        assert_eq!(keys, [1, 1, 0, 1]);

        let mut artist = [0 as c_char; 64];
        let len = geo_tiff_get_field_string(handle, tags::ARTIST, artist.as_mut_ptr(), 64);
        assert_eq!(len, 13);
        assert_eq!(
            CStr::from_ptr(artist.as_ptr()).to_str().unwrap(),
            "Somebody Else"
        );

        let mut short = [0 as c_char; 5];
        assert_eq!(
            geo_tiff_get_field_string(handle, tags::ARTIST, short.as_mut_ptr(), 5),
            4
        );
        assert_eq!(CStr::from_ptr(short.as_ptr()).to_str().unwrap(), "Some");

        // not set
        let mut description = [0 as c_char; 8];
        assert_eq!(
            geo_tiff_get_field_string(handle, tags::IMAGE_DESCRIPTION, description.as_mut_ptr(), 8),
            0
        );

        let mut pixels = vec![0u8; (WIDTH * LENGTH) as usize];
        assert_eq!(
            geo_tiff_read_strip(handle, 0, pixels.as_mut_ptr(), pixels.len()),
            pixels.len() as i64
        );
        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[31], 31);

        let mut rgba = vec![0u32; (WIDTH * LENGTH) as usize];
        assert!(geo_tiff_read_rgba_strip(handle, 0, rgba.as_mut_ptr(), rgba.len()));
        // bottom row first, gray replicated to r, g and b with opaque alpha
        assert_eq!(rgba[0], 0xff18_1818);
        assert_eq!(rgba[(WIDTH * (LENGTH - 1)) as usize], 0xff00_0000);

        let mut small = vec![0u32; 4];
        assert!(!geo_tiff_read_rgba_strip(handle, 0, small.as_mut_ptr(), small.len()));
        assert!(!last_error().is_empty());

        assert!(geo_tiff_close(handle));
    }
}

#[test]
fn test_tiff_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = c_path(&dir, "missing.tif");
    unsafe {
        assert!(geo_tiff_open(missing.as_ptr(), c"r".as_ptr()).is_null());
        assert!(!last_error().is_empty());

        assert!(geo_tiff_open(ptr::null(), c"r".as_ptr()).is_null());
        assert!(last_error().contains("path"));

        let path = c_path(&dir, "gray.tif");
        write_gray_image(&path);
        let handle = geo_tiff_open(path.as_ptr(), c"r".as_ptr());
        assert!(!handle.is_null());
        // read-only
        let pixels = [0u8; 32];
        assert_eq!(
            geo_tiff_write_strip(handle, 0, pixels.as_ptr(), pixels.len()),
            -1
        );
        assert!(!last_error().is_empty());
        // wrong value type for the tag
        let mut value = [0.0f32];
        assert_eq!(
            geo_tiff_get_field_float(handle, tags::IMAGE_WIDTH, value.as_mut_ptr(), 1),
            0
        );
        assert!(geo_tiff_close(handle));
    }
}

#[test]
fn test_null_tiff_handle() {
    let null = ptr::null_mut();
    let mut values = [0i32; 2];
    let mut buf = [0u8; 4];
    unsafe {
        assert!(!geo_tiff_set_field_int(null, tags::IMAGE_WIDTH, 1));
        assert_eq!(last_error(), "Bad argument: invalid TIFF handle");
        assert_eq!(
            geo_tiff_get_field_int(null, tags::IMAGE_WIDTH, values.as_mut_ptr(), 2),
            0
        );
        assert!(!geo_tiff_is_tiled(null));
        assert_eq!(geo_tiff_number_of_strips(null), 0);
        assert_eq!(geo_tiff_number_of_tiles(null), 0);
        assert_eq!(geo_tiff_strip_size(null), 0);
        assert_eq!(geo_tiff_tile_size(null), 0);
        assert_eq!(geo_tiff_read_strip(null, 0, buf.as_mut_ptr(), 4), -1);
        assert_eq!(geo_tiff_read_tile(null, 0, buf.as_mut_ptr(), 4), -1);
        assert!(!geo_tiff_close(null));
    }
}

#[test]
fn test_proj_transform() {
    unsafe {
        let wgs84 = geo_proj_create(c"+proj=longlat +datum=WGS84".as_ptr());
        let mercator = geo_proj_create(c"+proj=merc +datum=WGS84".as_ptr());
        assert!(!wgs84.is_null());
        assert!(!mercator.is_null());

        // two points interleaved with a second coordinate set
        let mut xs = [1.0, 50.0, -1.0, 50.0];
        let mut ys = [0.0, 50.0, 0.0, 50.0];
        let error = geo_proj_transform(
            wgs84,
            mercator,
            2,
            2,
            xs.as_mut_ptr(),
            ys.as_mut_ptr(),
            ptr::null_mut(),
        );
        assert_eq!(take_string(error), None);
        assert!((xs[0] - 111319.49079327357).abs() < 1e-6);
        assert!((xs[2] + 111319.49079327357).abs() < 1e-6);
        assert_eq!(xs[1], 50.0);

        let mut xs = [0.0];
        let mut ys = [100.0];
        let error = geo_proj_transform(
            wgs84,
            mercator,
            1,
            1,
            xs.as_mut_ptr(),
            ys.as_mut_ptr(),
            ptr::null_mut(),
        );
        assert!(take_string(error).is_some());

        let error = geo_proj_transform(
            wgs84,
            mercator,
            1,
            0,
            xs.as_mut_ptr(),
            ys.as_mut_ptr(),
            ptr::null_mut(),
        );
        assert!(take_string(error).is_some());

        geo_proj_destroy(wgs84);
        geo_proj_destroy(mercator);
    }
}

#[test]
fn test_proj_failures() {
    unsafe {
        assert!(geo_proj_create(c"+proj=nonsense".as_ptr()).is_null());
        assert!(!last_error().is_empty());
        assert!(geo_proj_create(ptr::null()).is_null());

        let mut xs = [1.0];
        let mut ys = [2.0];
        let error = geo_proj_transform(
            ptr::null(),
            ptr::null(),
            1,
            1,
            xs.as_mut_ptr(),
            ys.as_mut_ptr(),
            ptr::null_mut(),
        );
        assert!(take_string(error).unwrap().contains("invalid projection handle"));
        assert_eq!(xs, [1.0]);

        assert!(!geo_proj_set_path(ptr::null()));
        assert!(!geo_proj_set_path(c"".as_ptr()));
        geo_proj_destroy(ptr::null_mut());
        geo_string_free(ptr::null_mut());
    }
}
