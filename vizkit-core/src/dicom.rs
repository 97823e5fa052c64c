//! DICOM series reader: a directory of single-frame slices stacked into a volume.
//!
//! Only uncompressed, single-sample (grayscale) pixel data is supported,
//! 8 or 16 bits allocated, signed or unsigned. Scalars are the stored pixel
//! values; Rescale Slope and Intercept are kept on the volume.

use std::path::{Path, PathBuf};

use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{open_file, DefaultDicomObject};
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{VizError, VizResult};
use crate::volume::{ImageVolume, Rescale};

/// One decoded slice
#[derive(Debug)]
struct Slice {
    path: PathBuf,
    rows: usize,
    columns: usize,
    pixel_spacing: Option<[f32; 2]>,
    slice_thickness: Option<f32>,
    position: Option<[f32; 3]>,
    instance_number: Option<i32>,
    rescale: Rescale,
    values: Vec<f32>,
}

/// Load every readable DICOM file in `dir` into a single volume
pub fn load_dicom_series<P: AsRef<Path>>(dir: P) -> VizResult<ImageVolume> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| VizError::from_io(e, dir))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut slices = Vec::new();
    for path in paths {
        match read_slice(&path) {
            Ok(slice) => slices.push(slice),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable slice"),
        }
    }

    if slices.is_empty() {
        return Err(VizError::unsupported(format!(
            "no readable DICOM slices in {}",
            dir.display()
        )));
    }

    let volume = stack_slices(slices)?;
    let (min, max) = volume.scalar_range();
    info!(
        dir = %dir.display(),
        dimensions = ?volume.dimensions(),
        spacing = ?volume.spacing(),
        min,
        max,
        "Loaded DICOM series"
    );
    Ok(volume)
}

fn read_slice(path: &Path) -> VizResult<Slice> {
    let obj = open_file(path).map_err(|e| VizError::unsupported(e.to_string()))?;

    let rows = required_int(&obj, tags::ROWS, "Rows")? as usize;
    let columns = required_int(&obj, tags::COLUMNS, "Columns")? as usize;
    let bits_allocated = required_int(&obj, tags::BITS_ALLOCATED, "Bits Allocated")?;
    let signed = optional_int(&obj, tags::PIXEL_REPRESENTATION).unwrap_or(0) == 1;
    let samples = optional_int(&obj, tags::SAMPLES_PER_PIXEL).unwrap_or(1);
    if samples != 1 {
        return Err(VizError::unsupported(format!(
            "{} samples per pixel, only grayscale is supported",
            samples
        )));
    }

    let slope = optional_floats(&obj, tags::RESCALE_SLOPE)
        .and_then(|v| v.first().copied())
        .unwrap_or(1.0);
    let intercept = optional_floats(&obj, tags::RESCALE_INTERCEPT)
        .and_then(|v| v.first().copied())
        .unwrap_or(0.0);

    let pixel_data = obj
        .element(tags::PIXEL_DATA)
        .map_err(|e| VizError::unsupported(e.to_string()))?
        .to_bytes()
        .map_err(|e| VizError::unsupported(format!("encapsulated pixel data: {}", e)))?;

    let values = decode_samples(&pixel_data, rows * columns, bits_allocated, signed)?;

    let pixel_spacing = optional_floats(&obj, tags::PIXEL_SPACING)
        .filter(|v| v.len() >= 2)
        .map(|v| [v[0], v[1]]);
    let position = optional_floats(&obj, tags::IMAGE_POSITION_PATIENT)
        .filter(|v| v.len() >= 3)
        .map(|v| [v[0], v[1], v[2]]);

    debug!(path = %path.display(), rows, columns, bits_allocated, "Read slice");

    Ok(Slice {
        path: path.to_path_buf(),
        rows,
        columns,
        pixel_spacing,
        slice_thickness: optional_floats(&obj, tags::SLICE_THICKNESS)
            .and_then(|v| v.first().copied()),
        position,
        instance_number: optional_int(&obj, tags::INSTANCE_NUMBER),
        rescale: Rescale { slope, intercept },
        values,
    })
}

fn required_int(obj: &DefaultDicomObject, tag: Tag, name: &str) -> VizResult<i32> {
    obj.element(tag)
        .map_err(|_| VizError::unsupported(format!("missing {}", name)))?
        .to_int::<i32>()
        .map_err(|e| VizError::unsupported(format!("bad {}: {}", name, e)))
}

fn optional_int(obj: &DefaultDicomObject, tag: Tag) -> Option<i32> {
    obj.get(tag).and_then(|e| e.to_int::<i32>().ok())
}

fn optional_floats(obj: &DefaultDicomObject, tag: Tag) -> Option<Vec<f32>> {
    obj.get(tag)
        .and_then(|e| e.to_multi_float64().ok())
        .map(|v| v.into_iter().map(|x| x as f32).collect())
}

/// Little-endian sample decoding for 8 and 16 bit pixel data
pub(crate) fn decode_samples(
    bytes: &[u8],
    count: usize,
    bits_allocated: i32,
    signed: bool,
) -> VizResult<Vec<f32>> {
    let width = match bits_allocated {
        8 => 1,
        16 => 2,
        other => {
            return Err(VizError::unsupported(format!(
                "{} bits allocated is not supported",
                other
            )))
        }
    };
    if bytes.len() < count * width {
        return Err(VizError::unsupported(format!(
            "pixel data holds {} bytes, expected {}",
            bytes.len(),
            count * width
        )));
    }

    let samples = bytes[..count * width].chunks_exact(width);
    let values = match (width, signed) {
        (1, false) => samples.map(|c| c[0] as f32).collect(),
        (1, true) => samples.map(|c| c[0] as i8 as f32).collect(),
        (_, false) => samples.map(|c| u16::from_le_bytes([c[0], c[1]]) as f32).collect(),
        (_, true) => samples.map(|c| i16::from_le_bytes([c[0], c[1]]) as f32).collect(),
    };
    Ok(values)
}

fn stack_slices(mut slices: Vec<Slice>) -> VizResult<ImageVolume> {
    let (rows, columns) = (slices[0].rows, slices[0].columns);
    if let Some(odd) = slices.iter().find(|s| s.rows != rows || s.columns != columns) {
        return Err(VizError::unsupported(format!(
            "{} is {}x{}, series is {}x{}",
            odd.path.display(),
            odd.columns,
            odd.rows,
            columns,
            rows
        )));
    }

    // Position along z when every slice has one, else instance number, else file name
    if slices.iter().all(|s| s.position.is_some()) {
        slices.sort_by(|a, b| {
            let za = a.position.map_or(0.0, |p| p[2]);
            let zb = b.position.map_or(0.0, |p| p[2]);
            za.total_cmp(&zb)
        });
    } else if slices.iter().all(|s| s.instance_number.is_some()) {
        slices.sort_by_key(|s| s.instance_number);
    }

    let [row_spacing, column_spacing] = slices[0].pixel_spacing.unwrap_or([1.0, 1.0]);
    let z_spacing = slice_spacing(&slices);
    let origin = slices[0]
        .position
        .map_or_else(Point3::origin, |p| Point3::new(p[0], p[1], p[2]));

    let rescale = slices[0].rescale;
    let depth = slices.len();
    let mut scalars = Vec::with_capacity(rows * columns * depth);
    for slice in slices {
        scalars.extend(slice.values);
    }

    ImageVolume::new(
        [columns, rows, depth],
        [column_spacing, row_spacing, z_spacing],
        origin,
        scalars,
    )
    .map(|volume| volume.with_rescale(rescale))
}

fn slice_spacing(slices: &[Slice]) -> f32 {
    if let [first, second, ..] = slices {
        if let (Some(a), Some(b)) = (first.position, second.position) {
            let dz = (b[2] - a[2]).abs();
            if dz > 1e-6 {
                return dz;
            }
        }
    }
    slices[0]
        .slice_thickness
        .filter(|t| *t > 0.0)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(position: Option<[f32; 3]>, instance: Option<i32>, value: f32) -> Slice {
        Slice {
            path: PathBuf::from(format!("slice{}", value)),
            rows: 2,
            columns: 3,
            pixel_spacing: Some([0.5, 0.25]),
            slice_thickness: Some(2.5),
            position,
            instance_number: instance,
            rescale: Rescale::default(),
            values: vec![value; 6],
        }
    }

    #[test]
    fn decodes_signed_16_bit() {
        let bytes = [0x18, 0xfc, 0x64, 0x00]; // -1000, 100
        let values = decode_samples(&bytes, 2, 16, true).unwrap();
        assert_eq!(values, vec![-1000.0, 100.0]);
    }

    #[test]
    fn decodes_unsigned_8_bit() {
        let values = decode_samples(&[0, 255], 2, 8, false).unwrap();
        assert_eq!(values, vec![0.0, 255.0]);
    }

    #[test]
    fn rejects_short_pixel_data() {
        assert!(decode_samples(&[0, 1, 2], 2, 16, false).is_err());
        assert!(decode_samples(&[0; 8], 2, 32, false).is_err());
    }

    #[test]
    fn stacks_by_position() {
        let volume = stack_slices(vec![
            slice(Some([0.0, 0.0, 4.0]), Some(1), 2.0),
            slice(Some([0.0, 0.0, 1.0]), Some(2), 1.0),
        ])
        .unwrap();
        assert_eq!(volume.dimensions(), [3, 2, 2]);
        assert_eq!(volume.spacing(), [0.25, 0.5, 3.0]);
        assert_eq!(volume.get(0, 0, 0), 1.0);
        assert_eq!(volume.get(0, 0, 1), 2.0);
        assert_eq!(volume.origin().z, 1.0);
    }

    #[test]
    fn falls_back_to_instance_number_and_thickness() {
        let volume = stack_slices(vec![
            slice(None, Some(7), 7.0),
            slice(None, Some(3), 3.0),
        ])
        .unwrap();
        assert_eq!(volume.get(0, 0, 0), 3.0);
        assert_eq!(volume.spacing()[2], 2.5);
    }

    #[test]
    fn rejects_mixed_slice_sizes() {
        let mut odd = slice(None, None, 1.0);
        odd.rows = 4;
        odd.values = vec![1.0; 12];
        assert!(stack_slices(vec![slice(None, None, 0.0), odd]).is_err());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = load_dicom_series("/definitely/not/here").unwrap_err();
        assert!(matches!(err, VizError::NotFound { .. }));
    }

    #[test]
    fn directory_without_dicom_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not a slice").unwrap();
        let err = load_dicom_series(dir.path()).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat { .. }));
    }
}
