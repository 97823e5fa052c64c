//! vizkit core library - datasets, loaders and geometry pipeline stages
//!
//! This library provides the stateless core of the visualization front-end:
//! STL and DICOM loading, clip / cut / isosurface stages, the camera model
//! and the scene store that hands out stable ids for everything it owns.

pub mod dataset;
pub mod dicom;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod volume;

// Re-export commonly used types
pub use dataset::{load_dataset, Dataset};
pub use error::{VizError, VizResult};
pub use filters::{Plane, Stage, StageInput};
pub use geometry::{Bounds, PolyData, Triangle};
pub use projection::{Camera, ProjectionMode};
pub use scene::{DatasetId, GeometryId, Scene, Source, StageId};
pub use volume::{ImageVolume, Rescale};
