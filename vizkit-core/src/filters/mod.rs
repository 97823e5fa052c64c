//! Pipeline stages: pure functions from a dataset to derived geometry.

pub mod clip;
pub mod contour;
pub mod cut;
pub mod plane;
pub mod sample;

pub use clip::clip_polydata;
pub use contour::isosurface;
pub use cut::{cut_polydata, strip};
pub use plane::Plane;
pub use sample::{plane_outline, sample_plane};

use crate::dataset::Dataset;
use crate::error::{VizError, VizResult};
use crate::geometry::{Bounds, PolyData};
use crate::volume::ImageVolume;

/// Default grid resolution for [`Stage::PlaneOutline`]
pub const PLANE_OUTLINE_SAMPLES: usize = 40;

/// Borrowed input to a stage
#[derive(Debug, Clone, Copy)]
pub enum StageInput<'a> {
    Mesh(&'a PolyData),
    Volume(&'a ImageVolume),
}

impl<'a> From<&'a Dataset> for StageInput<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        match dataset {
            Dataset::Mesh(poly) => StageInput::Mesh(poly),
            Dataset::Volume(volume) => StageInput::Volume(volume),
        }
    }
}

impl<'a> From<&'a PolyData> for StageInput<'a> {
    fn from(poly: &'a PolyData) -> Self {
        StageInput::Mesh(poly)
    }
}

/// A configured transform stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep the half-space the plane normal points into
    Clip { plane: Plane },
    /// Plane intersection polylines
    Cut { plane: Plane },
    /// Surface where the volume equals `value`
    Isosurface { value: f32, compute_normals: bool },
    /// The plane patch inside `bounds`, sampled on a `samples`³ grid
    PlaneOutline {
        plane: Plane,
        bounds: Bounds,
        samples: usize,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Clip { .. } => "clip",
            Stage::Cut { .. } => "cut",
            Stage::Isosurface { .. } => "isosurface",
            Stage::PlaneOutline { .. } => "plane-outline",
        }
    }

    /// Run the stage. Same input and parameters always give the same output.
    pub fn apply(&self, input: StageInput<'_>) -> VizResult<PolyData> {
        match (self, input) {
            (Stage::Clip { plane }, StageInput::Mesh(poly)) => Ok(clip_polydata(poly, plane)),
            (Stage::Cut { plane }, StageInput::Mesh(poly)) => Ok(cut_polydata(poly, plane)),
            (
                Stage::Isosurface {
                    value,
                    compute_normals,
                },
                StageInput::Volume(volume),
            ) => Ok(isosurface(volume, *value, *compute_normals)),
            (
                Stage::PlaneOutline {
                    plane,
                    bounds,
                    samples,
                },
                _,
            ) => plane_outline(plane, bounds, *samples),
            (stage, StageInput::Mesh(_)) => Err(VizError::configuration(format!(
                "{} needs a volume input",
                stage.name()
            ))),
            (stage, StageInput::Volume(_)) => Err(VizError::configuration(format!(
                "{} needs a mesh input",
                stage.name()
            ))),
        }
    }
}
