use std::borrow::Cow;

use libgeo::errors::GeoError;
use libgeo::raster::{
    register_custom_fields, registered_fields, tags, FieldCount, FieldDescriptor, Tiff,
    TiffDataType,
};

const SENSOR_GAINS: u32 = 65100;
const SENSOR_NAME: u32 = 65101;

fn descriptors() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            tag: SENSOR_GAINS,
            name: Cow::Borrowed("SensorGains"),
            field_type: TiffDataType::Float,
            count: FieldCount::Variable,
            pass_count: true,
            writable: true,
        },
        FieldDescriptor {
            tag: SENSOR_NAME,
            name: Cow::Borrowed("SensorName"),
            field_type: TiffDataType::Ascii,
            count: FieldCount::Variable,
            pass_count: false,
            writable: true,
        },
    ]
}

#[test]
fn test_custom_fields() {
    // Registration has to happen before any file of this process is opened, so the
    // scenarios run in sequence within one test.

    reject_invalid_descriptors();

    register_custom_fields(&descriptors()).unwrap();
    assert!(registered_fields()
        .iter()
        .any(|field| field.tag == SENSOR_NAME));

    roundtrip_custom_fields();

    assert!(matches!(
        register_custom_fields(&descriptors()),
        Err(GeoError::FieldsAlreadyRegistered)
    ));
}

fn reject_invalid_descriptors() {
    let clash = FieldDescriptor {
        tag: tags::GEO_PIXEL_SCALE,
        name: Cow::Borrowed("Clash"),
        field_type: TiffDataType::Double,
        count: FieldCount::Variable,
        pass_count: true,
        writable: true,
    };
    assert!(matches!(
        register_custom_fields(&[clash]),
        Err(GeoError::BadArgument(_))
    ));

    let uncounted = FieldDescriptor {
        tag: 65102,
        name: Cow::Borrowed("Uncounted"),
        field_type: TiffDataType::Short,
        count: FieldCount::Variable,
        pass_count: false,
        writable: true,
    };
    assert!(matches!(
        register_custom_fields(&[uncounted]),
        Err(GeoError::BadArgument(_))
    ));
}

fn roundtrip_custom_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.tif");

    let mut tiff = Tiff::create(&path).unwrap();
    tiff.set_field(tags::IMAGE_WIDTH, 2u32).unwrap();
    tiff.set_field(tags::IMAGE_LENGTH, 2u32).unwrap();
    tiff.set_field(tags::BITS_PER_SAMPLE, 8u16).unwrap();
    tiff.set_field(tags::SAMPLES_PER_PIXEL, 1u16).unwrap();
    tiff.set_field(tags::PHOTOMETRIC, tags::photometric::MIN_IS_BLACK)
        .unwrap();
    tiff.set_field(tags::ROWS_PER_STRIP, 2u32).unwrap();
    tiff.set_field_array(SENSOR_GAINS, &[1.5f32, 0.75, 2.0])
        .unwrap();
    tiff.set_field_string(SENSOR_NAME, "probe-7").unwrap();
    tiff.write_encoded_strip(0, &[1, 2, 3, 4]).unwrap();
    tiff.close().unwrap();

    let tiff = Tiff::open(&path).unwrap();
    let info = tiff.field_info(SENSOR_GAINS).unwrap();
    assert_eq!(info.name, "SensorGains");
    assert_eq!(
        tiff.get_field_array::<f32>(SENSOR_GAINS).unwrap(),
        Some(vec![1.5, 0.75, 2.0])
    );
    assert_eq!(
        tiff.get_field_string(SENSOR_NAME).unwrap().as_deref(),
        Some("probe-7")
    );
}
