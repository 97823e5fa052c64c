//! Loaded datasets and the loader entry point.
use std::path::Path;

use crate::dicom::load_dicom_series;
use crate::error::{VizError, VizResult};
use crate::geometry::{Bounds, PolyData};
use crate::stl::load_stl;
use crate::volume::ImageVolume;

/// Geometry or volume read from disk. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Mesh(PolyData),
    Volume(ImageVolume),
}

impl Dataset {
    pub fn number_of_points(&self) -> usize {
        match self {
            Dataset::Mesh(poly) => poly.number_of_points(),
            Dataset::Volume(volume) => volume.number_of_points(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Dataset::Mesh(poly) => poly.bounds(),
            Dataset::Volume(volume) => volume.bounds(),
        }
    }

    pub fn as_mesh(&self) -> Option<&PolyData> {
        match self {
            Dataset::Mesh(poly) => Some(poly),
            Dataset::Volume(_) => None,
        }
    }

    pub fn as_volume(&self) -> Option<&ImageVolume> {
        match self {
            Dataset::Volume(volume) => Some(volume),
            Dataset::Mesh(_) => None,
        }
    }
}

/// Load a dataset: a directory is read as a DICOM series, a `.stl` file as a mesh
pub fn load_dataset<P: AsRef<Path>>(path: P) -> VizResult<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(VizError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_dir() {
        return load_dicom_series(path).map(Dataset::Volume);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "stl" => load_stl(path).map(Dataset::Mesh),
        other => Err(VizError::unsupported(format!(
            "unknown file format: .{}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_found() {
        let err = load_dataset("/no/such/owl.stl").unwrap_err();
        assert!(matches!(err, VizError::NotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat { .. }));
    }

    #[test]
    fn dataset_accessors() {
        let dataset = Dataset::Mesh(PolyData::cube(1.0));
        assert_eq!(dataset.number_of_points(), 8);
        assert!(dataset.as_mesh().is_some());
        assert!(dataset.as_volume().is_none());
    }
}
