use super::{CoordTransform, ProjConfig, ProjLogLevel, Projection};
use crate::assert_near;
use crate::errors::GeoError;
use geo_types::Coord;

const WGS84: &str = "+proj=longlat +datum=WGS84";
const MERCATOR: &str = "+proj=merc +datum=WGS84";
/// Easting of one degree of longitude on the equator, in metres.
const ONE_DEGREE: f64 = 111319.49079327357;

fn wgs84_to_mercator() -> CoordTransform {
    let wgs84 = Projection::from_definition(WGS84).unwrap();
    let mercator = Projection::from_definition(MERCATOR).unwrap();
    CoordTransform::new(&wgs84, &mercator).unwrap()
}

#[test]
fn from_proj_string() {
    let wgs84 = Projection::from_definition(WGS84).unwrap();
    assert!(wgs84.is_crs());
    assert_eq!(wgs84.source(), WGS84);
    assert!(wgs84.definition().unwrap().contains("+proj=longlat"));
}

#[test]
fn from_authority_code() {
    let wgs84 = Projection::from_definition("EPSG:4326").unwrap();
    assert!(wgs84.is_crs());
    assert_eq!(wgs84.name(), "WGS 84");
}

#[test]
fn from_malformed_definition() {
    match Projection::from_definition("+proj=nonsense +foo=bar") {
        Err(GeoError::ProjError {
            method_name, msg, ..
        }) => {
            assert_eq!(method_name, "proj_create");
            assert!(!msg.is_empty());
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        Projection::from_definition("nul\0byte"),
        Err(GeoError::FfiNulError(_))
    ));
}

#[test]
fn from_definition_with_config() {
    let config = ProjConfig {
        search_paths: Vec::new(),
        log_level: ProjLogLevel::None,
    };
    let mercator = Projection::from_definition_with_config(MERCATOR, &config).unwrap();
    assert!(mercator.is_crs());
}

#[test]
fn transform_to_mercator() {
    let transform = wgs84_to_mercator();
    let mut xs = [1.0, -1.0];
    let mut ys = [0.0, 0.0];
    transform.transform_coords(&mut xs, &mut ys, None).unwrap();
    assert_near!(xs[0], ONE_DEGREE, epsilon = 1e-6);
    assert_near!(xs[1], -ONE_DEGREE, epsilon = 1e-6);
    assert_near!(ys[0], 0.0, epsilon = 1e-6);
}

#[test]
fn transform_authority_codes_lon_lat() {
    // EPSG:4326 declares latitude first, exchanged coordinates stay longitude first
    let wgs84 = Projection::from_definition("EPSG:4326").unwrap();
    let pseudo_mercator = Projection::from_definition("EPSG:3857").unwrap();
    let mut xs = [1.0];
    let mut ys = [0.0];
    wgs84
        .transform_to(&pseudo_mercator, &mut xs, &mut ys, None)
        .unwrap();
    assert_near!(xs[0], ONE_DEGREE, epsilon = 1e-6);
    assert_near!(ys[0], 0.0, epsilon = 1e-6);
}

#[test]
fn transform_identity() {
    let wgs84 = Projection::from_definition(WGS84).unwrap();
    let same = Projection::from_definition(WGS84).unwrap();
    let mut xs = [12.5, -77.25, 0.0];
    let mut ys = [45.0, 10.125, -33.5];
    let mut zs = [100.0, 0.0, -5.0];
    wgs84
        .transform_to(&same, &mut xs, &mut ys, Some(&mut zs))
        .unwrap();
    for (actual, expected) in xs.iter().zip([12.5, -77.25, 0.0]) {
        assert_near!(*actual, expected, epsilon = 1e-9);
    }
    for (actual, expected) in ys.iter().zip([45.0, 10.125, -33.5]) {
        assert_near!(*actual, expected, epsilon = 1e-9);
    }
    for (actual, expected) in zs.iter().zip([100.0, 0.0, -5.0]) {
        assert_near!(*actual, expected, epsilon = 1e-9);
    }
}

#[test]
fn transform_with_heights() {
    let wgs84_3d = Projection::from_definition("EPSG:4979").unwrap();
    let geocentric = Projection::from_definition("EPSG:4978").unwrap();
    let transform = CoordTransform::new(&wgs84_3d, &geocentric).unwrap();
    let mut xs = [0.0];
    let mut ys = [0.0];
    let mut zs = [100.0];
    transform
        .transform_coords(&mut xs, &mut ys, Some(&mut zs))
        .unwrap();
    assert_near!(xs[0], 6378237.0, epsilon = 1e-3);
    assert_near!(ys[0], 0.0, epsilon = 1e-6);
    assert_near!(zs[0], 0.0, epsilon = 1e-3);
}

#[test]
fn transform_strided() {
    let transform = wgs84_to_mercator();
    let mut xs = [1.0, 99.0, 2.0, 99.0];
    let mut ys = [0.0, 99.0, 0.0, 99.0];
    transform
        .transform_strided(2, 2, &mut xs, &mut ys, None)
        .unwrap();
    assert_near!(xs[0], ONE_DEGREE, epsilon = 1e-6);
    assert_near!(xs[2], 2.0 * ONE_DEGREE, epsilon = 1e-6);
    assert_eq!(xs[1], 99.0);
    assert_eq!(ys[3], 99.0);

    // the last point does not need a full stride behind it
    let mut xs = [1.0, 0.0, 2.0];
    let mut ys = [0.0, 0.0, 0.0];
    transform
        .transform_strided(2, 2, &mut xs, &mut ys, None)
        .unwrap();
    assert_near!(xs[2], 2.0 * ONE_DEGREE, epsilon = 1e-6);
    assert_eq!(xs[1], 0.0);
}

#[test]
fn transform_strided_bad_arguments() {
    let transform = wgs84_to_mercator();
    let mut xs = [1.0, 2.0, 3.0];
    let mut ys = [0.0, 0.0, 0.0];
    assert!(matches!(
        transform.transform_strided(1, 0, &mut xs, &mut ys, None),
        Err(GeoError::BadArgument(_))
    ));
    assert!(matches!(
        transform.transform_strided(3, 2, &mut xs, &mut ys, None),
        Err(GeoError::BufferTooSmall {
            required: 5,
            actual: 3
        })
    ));
    let mut short_ys = [0.0, 0.0];
    assert!(matches!(
        transform.transform_strided(1, 1, &mut xs, &mut short_ys, None),
        Err(GeoError::BadArgument(_))
    ));
    // nothing was touched
    assert_eq!(xs, [1.0, 2.0, 3.0]);
    assert!(transform
        .transform_strided(0, 1, &mut [], &mut [], None)
        .is_ok());
}

#[test]
fn transform_mismatched_lengths() {
    let transform = wgs84_to_mercator();
    let mut xs = [1.0, 2.0];
    let mut ys = [0.0];
    assert!(matches!(
        transform.transform_coords(&mut xs, &mut ys, None),
        Err(GeoError::BadArgument(_))
    ));
}

#[test]
fn transform_failure() {
    let transform = wgs84_to_mercator();
    let mut xs = [0.0];
    let mut ys = [100.0];
    match transform.transform_coords(&mut xs, &mut ys, None) {
        Err(GeoError::TransformError { from, to, msg }) => {
            assert_eq!(from, WGS84);
            assert_eq!(to, MERCATOR);
            assert!(!msg.is_empty());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn transform_points() {
    let transform = wgs84_to_mercator();
    let mut points = [Coord { x: 1.0, y: 0.0 }, Coord { x: -2.0, y: 0.0 }];
    transform.transform_points(&mut points).unwrap();
    assert_near!(points[0].x, ONE_DEGREE, epsilon = 1e-6);
    assert_near!(points[1].x, -2.0 * ONE_DEGREE, epsilon = 1e-6);
    assert_near!(points[1].y, 0.0, epsilon = 1e-6);
    assert!(transform.transform_points(&mut []).is_ok());
}

#[test]
fn projection_and_transform_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Projection>();
    assert_send::<CoordTransform>();
}
