//! Owned store of datasets and derived geometry, addressed by stable ids.
//!
//! Renderers and actors hold ids rather than references, so the scene stays
//! the single owner of every dataset and stage output.

use std::path::Path;

use tracing::info;

use crate::dataset::{load_dataset, Dataset};
use crate::error::{VizError, VizResult};
use crate::filters::{Stage, StageInput};
use crate::geometry::{Bounds, PolyData};
use crate::volume::ImageVolume;

/// A loaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(usize);

/// The output of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId(usize);

/// Any polygonal data in the scene: a loaded mesh or a stage output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryId {
    Dataset(DatasetId),
    Stage(StageId),
}

/// What a stage reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Dataset(DatasetId),
    Stage(StageId),
}

impl From<DatasetId> for GeometryId {
    fn from(id: DatasetId) -> Self {
        GeometryId::Dataset(id)
    }
}

impl From<StageId> for GeometryId {
    fn from(id: StageId) -> Self {
        GeometryId::Stage(id)
    }
}

impl From<DatasetId> for Source {
    fn from(id: DatasetId) -> Self {
        Source::Dataset(id)
    }
}

impl From<StageId> for Source {
    fn from(id: StageId) -> Self {
        Source::Stage(id)
    }
}

impl From<GeometryId> for Source {
    fn from(id: GeometryId) -> Self {
        match id {
            GeometryId::Dataset(d) => Source::Dataset(d),
            GeometryId::Stage(s) => Source::Stage(s),
        }
    }
}

#[derive(Debug, Clone)]
struct StageRecord {
    source: Source,
    stage: Stage,
    output: PolyData,
}

/// Datasets and stage outputs of one run
#[derive(Debug, Default)]
pub struct Scene {
    datasets: Vec<Dataset>,
    stages: Vec<StageRecord>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> DatasetId {
        self.datasets.push(dataset);
        DatasetId(self.datasets.len() - 1)
    }

    /// Load a file or directory and keep it in the scene
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> VizResult<DatasetId> {
        let dataset = load_dataset(path)?;
        Ok(self.add_dataset(dataset))
    }

    pub fn dataset(&self, id: DatasetId) -> &Dataset {
        &self.datasets[id.0]
    }

    /// Polygonal data behind `id`; a volume dataset is a configuration error
    pub fn geometry(&self, id: GeometryId) -> VizResult<&PolyData> {
        match id {
            GeometryId::Dataset(d) => self
                .dataset(d)
                .as_mesh()
                .ok_or_else(|| VizError::configuration("dataset is a volume, not a mesh")),
            GeometryId::Stage(s) => Ok(&self.stages[s.0].output),
        }
    }

    pub fn volume(&self, id: DatasetId) -> VizResult<&ImageVolume> {
        self.dataset(id)
            .as_volume()
            .ok_or_else(|| VizError::configuration("dataset is a mesh, not a volume"))
    }

    pub fn bounds(&self, id: GeometryId) -> Bounds {
        self.geometry(id).map(PolyData::bounds).unwrap_or_default()
    }

    pub fn stage(&self, id: StageId) -> &Stage {
        &self.stages[id.0].stage
    }

    /// Apply `stage` to `source` and store the result
    pub fn run(&mut self, source: impl Into<Source>, stage: Stage) -> VizResult<StageId> {
        let source = source.into();
        let output = self.evaluate(self.input(source), &stage)?;
        self.stages.push(StageRecord {
            source,
            stage,
            output,
        });
        Ok(StageId(self.stages.len() - 1))
    }

    /// Replace the parameters of an existing stage, recomputing its output.
    ///
    /// Stages reading from `id` are recomputed too, in creation order. Nothing
    /// is replaced unless every recomputation succeeds.
    pub fn rerun(&mut self, id: StageId, stage: Stage) -> VizResult<()> {
        let source = self.stages[id.0].source;
        let mut updated = vec![(id.0, self.evaluate(self.input(source), &stage)?)];

        for later in id.0 + 1..self.stages.len() {
            let Source::Stage(parent) = self.stages[later].source else {
                continue;
            };
            let Some(pos) = updated.iter().position(|(index, _)| *index == parent.0) else {
                continue;
            };
            let input = StageInput::Mesh(&updated[pos].1);
            let output = self.evaluate(input, &self.stages[later].stage)?;
            updated.push((later, output));
        }

        self.stages[id.0].stage = stage;
        for (index, output) in updated {
            self.stages[index].output = output;
        }
        Ok(())
    }

    fn input(&self, source: Source) -> StageInput<'_> {
        match source {
            Source::Dataset(d) => StageInput::from(self.dataset(d)),
            Source::Stage(s) => StageInput::Mesh(&self.stages[s.0].output),
        }
    }

    fn evaluate(&self, input: StageInput<'_>, stage: &Stage) -> VizResult<PolyData> {
        let output = stage.apply(input)?;
        info!(
            stage = stage.name(),
            points = output.number_of_points(),
            cells = output.number_of_cells(),
            "Stage complete"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Plane;
    use nalgebra::{Point3, Vector3};

    fn clip_at(z: f32) -> Stage {
        Stage::Clip {
            plane: Plane::new(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap(),
        }
    }

    #[test]
    fn run_stores_output_under_stable_id() {
        let mut scene = Scene::new();
        let cube = scene.add_dataset(Dataset::Mesh(PolyData::cube(2.0)));
        let clipped = scene.run(cube, clip_at(0.0)).unwrap();
        assert_eq!(scene.geometry(clipped.into()).unwrap().number_of_points(), 12);
        assert_eq!(scene.geometry(cube.into()).unwrap().number_of_points(), 8);
    }

    #[test]
    fn rerun_invalidates_downstream() {
        let mut scene = Scene::new();
        let cube = scene.add_dataset(Dataset::Mesh(PolyData::cube(2.0)));
        let clipped = scene.run(cube, clip_at(0.0)).unwrap();
        let cut = scene
            .run(
                clipped,
                Stage::Cut {
                    plane: Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z()).unwrap(),
                },
            )
            .unwrap();
        assert_eq!(scene.geometry(cut.into()).unwrap().lines.len(), 1);

        // Clip everything away: the cut downstream must follow
        scene.rerun(clipped, clip_at(5.0)).unwrap();
        assert!(scene.geometry(clipped.into()).unwrap().is_empty());
        assert!(scene.geometry(cut.into()).unwrap().is_empty());
        assert_eq!(scene.stage(clipped), &clip_at(5.0));
    }

    #[test]
    fn failed_rerun_leaves_scene_unchanged() {
        let mut scene = Scene::new();
        let cube = scene.add_dataset(Dataset::Mesh(PolyData::cube(2.0)));
        let clipped = scene.run(cube, clip_at(0.0)).unwrap();
        let cut = scene
            .run(
                clipped,
                Stage::Cut {
                    plane: Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z()).unwrap(),
                },
            )
            .unwrap();
        let before = scene.geometry(cut.into()).unwrap().clone();

        let bad = Stage::Isosurface {
            value: 1.0,
            compute_normals: false,
        };
        assert!(matches!(
            scene.rerun(clipped, bad),
            Err(VizError::Configuration { .. })
        ));
        assert_eq!(scene.stage(clipped), &clip_at(0.0));
        assert_eq!(scene.geometry(clipped.into()).unwrap().number_of_points(), 12);
        assert_eq!(scene.geometry(cut.into()).unwrap(), &before);
    }

    #[test]
    fn volume_is_not_geometry() {
        let mut scene = Scene::new();
        let volume = ImageVolume::from_fn([2, 2, 2], [1.0; 3], Point3::origin(), |p| p.x).unwrap();
        let id = scene.add_dataset(Dataset::Volume(volume));
        assert!(scene.geometry(id.into()).is_err());
        assert!(scene.volume(id).is_ok());
    }
}
