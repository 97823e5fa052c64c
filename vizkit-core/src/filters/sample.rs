//! Implicit function sampling, used to draw a plane across a model.

use tracing::debug;

use super::contour::isosurface;
use super::plane::Plane;
use crate::error::{VizError, VizResult};
use crate::geometry::{Bounds, PolyData};
use crate::volume::ImageVolume;

/// Sample `plane` on a `samples`³ grid spanning `bounds`
pub fn sample_plane(plane: &Plane, bounds: &Bounds, samples: usize) -> VizResult<ImageVolume> {
    if samples < 2 {
        return Err(VizError::configuration("plane sampling needs at least 2 samples per axis"));
    }
    if bounds.is_empty() {
        return Err(VizError::configuration("cannot sample a plane over empty bounds"));
    }

    let extent = bounds.max - bounds.min;
    let spacing = [extent.x, extent.y, extent.z].map(|e| {
        let s = e / (samples - 1) as f32;
        // Flat models still get a unit-thick slab
        if s > 0.0 {
            s
        } else {
            1.0
        }
    });

    ImageVolume::from_fn([samples; 3], spacing, bounds.min, |p| plane.evaluate(&p))
}

/// The patch of `plane` inside `bounds`, triangulated by contouring its samples at zero
pub fn plane_outline(plane: &Plane, bounds: &Bounds, samples: usize) -> VizResult<PolyData> {
    let grid = sample_plane(plane, bounds, samples)?;
    let patch = isosurface(&grid, 0.0, false);
    debug!(
        samples,
        triangles = patch.triangles.len(),
        "Built plane outline"
    );
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn outline_spans_bounds_on_the_plane() {
        let bounds = Bounds::new(Point3::new(-2.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        let plane = Plane::new(bounds.center(), Vector3::z()).unwrap();
        let patch = plane_outline(&plane, &bounds, 40).unwrap();

        assert!(!patch.triangles.is_empty());
        let b = patch.bounds();
        assert_relative_eq!(b.min.x, -2.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.y, 1.0, epsilon = 1e-4);
        for p in &patch.points {
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn rejects_degenerate_sampling() {
        let bounds = Bounds::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        assert!(matches!(
            plane_outline(&plane, &bounds, 1),
            Err(VizError::Configuration { .. })
        ));
        assert!(plane_outline(&plane, &Bounds::empty(), 40).is_err());
    }
}
