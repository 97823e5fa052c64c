use std::fs;
use std::path::Path;

use dicom_core::{dicom_value, DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use tempfile::tempdir;
use vizkit_core::{load_dataset, Rescale, Stage, StageInput};

/// A 2x2 unsigned 16-bit CT slice
struct SliceSpec<'a> {
    file: &'a str,
    uid: &'a str,
    position: Option<f64>,
    instance: i32,
    values: [u16; 4],
}

fn write_slice(dir: &Path, spec: &SliceSpec<'_>) {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.2"),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(spec.uid),
    ));
    obj.put(DataElement::new(tags::ROWS, VR::US, dicom_value!(U16, [2])));
    obj.put(DataElement::new(tags::COLUMNS, VR::US, dicom_value!(U16, [2])));
    obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, dicom_value!(U16, [16])));
    obj.put(DataElement::new(tags::BITS_STORED, VR::US, dicom_value!(U16, [16])));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        dicom_value!(U16, [0]),
    ));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        dicom_value!(U16, [1]),
    ));
    obj.put(DataElement::new(
        tags::PIXEL_SPACING,
        VR::DS,
        dicom_value!(Strs, ["0.5", "0.75"]),
    ));
    obj.put(DataElement::new(
        tags::SLICE_THICKNESS,
        VR::DS,
        PrimitiveValue::from("2.5"),
    ));
    obj.put(DataElement::new(
        tags::RESCALE_INTERCEPT,
        VR::DS,
        PrimitiveValue::from("-1024"),
    ));
    obj.put(DataElement::new(
        tags::RESCALE_SLOPE,
        VR::DS,
        PrimitiveValue::from("1"),
    ));
    obj.put(DataElement::new(
        tags::INSTANCE_NUMBER,
        VR::IS,
        PrimitiveValue::from(spec.instance.to_string()),
    ));
    if let Some(z) = spec.position {
        obj.put(DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            dicom_value!(Strs, ["10", "20", z.to_string()]),
        ));
    }
    let bytes: Vec<u8> = spec.values.iter().flat_map(|v| v.to_le_bytes()).collect();
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::from(bytes),
    ));

    let file = obj
        .with_meta(FileMetaTableBuilder::new().transfer_syntax("1.2.840.10008.1.2.1"))
        .unwrap();
    file.write_to_file(dir.join(spec.file)).unwrap();
}

#[test]
fn series_is_stacked_by_position_with_stored_values() {
    let dir = tempdir().unwrap();
    // File order and instance numbers both disagree with slice position
    write_slice(
        dir.path(),
        &SliceSpec {
            file: "a.dcm",
            uid: "1.2.3.1",
            position: Some(5.0),
            instance: 1,
            values: [400, 500, 600, 700],
        },
    );
    write_slice(
        dir.path(),
        &SliceSpec {
            file: "b.dcm",
            uid: "1.2.3.2",
            position: Some(2.0),
            instance: 2,
            values: [0, 100, 200, 300],
        },
    );
    fs::write(dir.path().join("README"), b"not a slice").unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    let volume = dataset.as_volume().unwrap();
    assert_eq!(volume.dimensions(), [2, 2, 2]);
    assert_eq!(volume.spacing(), [0.75, 0.5, 3.0]);
    assert_eq!(volume.origin().z, 2.0);
    assert_eq!(volume.get(0, 0, 0), 0.0);
    assert_eq!(volume.get(1, 1, 0), 300.0);
    assert_eq!(volume.get(0, 0, 1), 400.0);
    assert_eq!(volume.scalar_range(), (0.0, 700.0));
    assert_eq!(
        volume.rescale(),
        Rescale {
            slope: 1.0,
            intercept: -1024.0
        }
    );

    let surface = Stage::Isosurface {
        value: 250.0,
        compute_normals: true,
    }
    .apply(StageInput::Volume(volume))
    .unwrap();
    assert!(surface.number_of_points() > 0);
}

#[test]
fn series_without_positions_uses_instance_number_and_thickness() {
    let dir = tempdir().unwrap();
    write_slice(
        dir.path(),
        &SliceSpec {
            file: "a.dcm",
            uid: "1.2.4.1",
            position: None,
            instance: 9,
            values: [9; 4],
        },
    );
    write_slice(
        dir.path(),
        &SliceSpec {
            file: "b.dcm",
            uid: "1.2.4.2",
            position: None,
            instance: 3,
            values: [3; 4],
        },
    );

    let dataset = load_dataset(dir.path()).unwrap();
    let volume = dataset.as_volume().unwrap();
    assert_eq!(volume.get(0, 0, 0), 3.0);
    assert_eq!(volume.get(0, 0, 1), 9.0);
    assert_eq!(volume.spacing()[2], 2.5);
}
