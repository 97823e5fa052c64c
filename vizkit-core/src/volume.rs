//! Regular scalar grids (image data).
use nalgebra::{Point3, Vector3};

use crate::error::{VizError, VizResult};
use crate::geometry::Bounds;

/// A scalar volume sampled on a regular grid.
///
/// Scalars are stored x-fastest, then y, then z (slice index). They are
/// the stored values; `rescale` maps them to modality units.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVolume {
    dimensions: [usize; 3],
    spacing: [f32; 3],
    origin: Point3<f32>,
    scalars: Vec<f32>,
    rescale: Rescale,
}

/// Linear map from stored values to modality units: `v * slope + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f32,
    pub intercept: f32,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl Rescale {
    pub fn apply(&self, value: f32) -> f32 {
        value * self.slope + self.intercept
    }
}

impl ImageVolume {
    pub fn new(
        dimensions: [usize; 3],
        spacing: [f32; 3],
        origin: Point3<f32>,
        scalars: Vec<f32>,
    ) -> VizResult<Self> {
        let expected = dimensions.iter().product::<usize>();
        if expected == 0 || scalars.len() != expected {
            return Err(VizError::unsupported(format!(
                "volume of {:?} needs {} scalars, got {}",
                dimensions,
                expected,
                scalars.len()
            )));
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(VizError::unsupported(format!(
                "invalid voxel spacing {:?}",
                spacing
            )));
        }
        Ok(Self {
            dimensions,
            spacing,
            origin,
            scalars,
            rescale: Rescale::default(),
        })
    }

    pub fn with_rescale(mut self, rescale: Rescale) -> Self {
        self.rescale = rescale;
        self
    }

    /// Sample a scalar function at every grid point
    pub fn from_fn(
        dimensions: [usize; 3],
        spacing: [f32; 3],
        origin: Point3<f32>,
        f: impl Fn(Point3<f32>) -> f32,
    ) -> VizResult<Self> {
        let mut scalars = Vec::with_capacity(dimensions.iter().product());
        for k in 0..dimensions[2] {
            for j in 0..dimensions[1] {
                for i in 0..dimensions[0] {
                    scalars.push(f(Self::grid_position(origin, spacing, i, j, k)));
                }
            }
        }
        Self::new(dimensions, spacing, origin, scalars)
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    pub fn scalars(&self) -> &[f32] {
        &self.scalars
    }

    pub fn rescale(&self) -> Rescale {
        self.rescale
    }

    /// Scalars converted to modality units (HU for CT)
    pub fn rescaled_scalars(&self) -> Vec<f32> {
        self.scalars.iter().map(|&v| self.rescale.apply(v)).collect()
    }

    pub fn number_of_points(&self) -> usize {
        self.scalars.len()
    }

    /// Minimum and maximum scalar
    pub fn scalar_range(&self) -> (f32, f32) {
        self.scalars
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub fn bounds(&self) -> Bounds {
        let far = self.position(
            self.dimensions[0] - 1,
            self.dimensions[1] - 1,
            self.dimensions[2] - 1,
        );
        Bounds::new(self.origin, far)
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.scalars[self.index(i, j, k)]
    }

    pub fn position(&self, i: usize, j: usize, k: usize) -> Point3<f32> {
        Self::grid_position(self.origin, self.spacing, i, j, k)
    }

    /// Continuous grid coordinates of a world point
    pub fn continuous_index(&self, p: &Point3<f32>) -> Vector3<f32> {
        let d = p - self.origin;
        Vector3::new(
            d.x / self.spacing[0],
            d.y / self.spacing[1],
            d.z / self.spacing[2],
        )
    }

    /// Value of the nearest grid point, `None` outside the grid
    pub fn sample_nearest(&self, p: &Point3<f32>) -> Option<f32> {
        let c = self.continuous_index(p);
        let mut idx = [0usize; 3];
        for axis in 0..3 {
            let r = c[axis].round();
            if r < 0.0 || r > (self.dimensions[axis] - 1) as f32 {
                return None;
            }
            idx[axis] = r as usize;
        }
        Some(self.get(idx[0], idx[1], idx[2]))
    }

    /// Trilinearly interpolated value, `None` outside the grid
    pub fn sample_linear(&self, p: &Point3<f32>) -> Option<f32> {
        let c = self.continuous_index(p);
        let mut base = [0usize; 3];
        let mut frac = [0f32; 3];
        for axis in 0..3 {
            let max = (self.dimensions[axis] - 1) as f32;
            if c[axis] < 0.0 || c[axis] > max {
                return None;
            }
            // Flat axes and the far face clamp to the last cell
            let cell = c[axis].floor().min((max - 1.0).max(0.0));
            base[axis] = cell as usize;
            frac[axis] = if max == 0.0 { 0.0 } else { c[axis] - cell };
        }

        let at = |di: usize, dj: usize, dk: usize| {
            let i = (base[0] + di).min(self.dimensions[0] - 1);
            let j = (base[1] + dj).min(self.dimensions[1] - 1);
            let k = (base[2] + dk).min(self.dimensions[2] - 1);
            self.get(i, j, k)
        };
        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

        let c00 = lerp(at(0, 0, 0), at(1, 0, 0), frac[0]);
        let c10 = lerp(at(0, 1, 0), at(1, 1, 0), frac[0]);
        let c01 = lerp(at(0, 0, 1), at(1, 0, 1), frac[0]);
        let c11 = lerp(at(0, 1, 1), at(1, 1, 1), frac[0]);
        let c0 = lerp(c00, c10, frac[1]);
        let c1 = lerp(c01, c11, frac[1]);
        Some(lerp(c0, c1, frac[2]))
    }

    /// Central-difference gradient at a grid point, in world units
    pub fn gradient(&self, i: usize, j: usize, k: usize) -> Vector3<f32> {
        let idx = [i, j, k];
        let mut g = Vector3::zeros();
        for axis in 0..3 {
            let n = self.dimensions[axis];
            if n < 2 {
                continue;
            }
            let lo = idx[axis].saturating_sub(1);
            let hi = (idx[axis] + 1).min(n - 1);
            let mut a = idx;
            let mut b = idx;
            a[axis] = lo;
            b[axis] = hi;
            let dv = self.get(b[0], b[1], b[2]) - self.get(a[0], a[1], a[2]);
            g[axis] = dv / ((hi - lo) as f32 * self.spacing[axis]);
        }
        g
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.dimensions[1] + j) * self.dimensions[0] + i
    }

    fn grid_position(
        origin: Point3<f32>,
        spacing: [f32; 3],
        i: usize,
        j: usize,
        k: usize,
    ) -> Point3<f32> {
        Point3::new(
            origin.x + i as f32 * spacing[0],
            origin.y + j as f32 * spacing[1],
            origin.z + k as f32 * spacing[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> ImageVolume {
        // value = x
        ImageVolume::from_fn([4, 3, 2], [1.0, 2.0, 3.0], Point3::origin(), |p| p.x).unwrap()
    }

    #[test]
    fn rejects_mismatched_scalars() {
        let err = ImageVolume::new([2, 2, 2], [1.0; 3], Point3::origin(), vec![0.0; 7]);
        assert!(matches!(err, Err(VizError::UnsupportedFormat { .. })));
    }

    #[test]
    fn rejects_zero_spacing() {
        let err = ImageVolume::new([1, 1, 1], [1.0, 0.0, 1.0], Point3::origin(), vec![0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn bounds_and_range() {
        let v = ramp();
        let b = v.bounds();
        assert_relative_eq!(b.max.x, 3.0);
        assert_relative_eq!(b.max.y, 4.0);
        assert_relative_eq!(b.max.z, 3.0);
        assert_eq!(v.scalar_range(), (0.0, 3.0));
    }

    #[test]
    fn rescale_leaves_stored_scalars_alone() {
        let v = ramp().with_rescale(Rescale {
            slope: 2.0,
            intercept: -1024.0,
        });
        assert_eq!(v.scalar_range(), (0.0, 3.0));
        assert_eq!(v.rescaled_scalars()[..2], [-1024.0, -1022.0]);
        assert_eq!(ramp().rescale(), Rescale::default());
    }

    #[test]
    fn linear_sampling_interpolates() {
        let v = ramp();
        assert_relative_eq!(v.sample_linear(&Point3::new(1.25, 1.0, 1.5)).unwrap(), 1.25);
        assert_relative_eq!(v.sample_linear(&Point3::new(3.0, 4.0, 3.0)).unwrap(), 3.0);
        assert!(v.sample_linear(&Point3::new(-0.1, 0.0, 0.0)).is_none());
    }

    #[test]
    fn nearest_sampling_rounds() {
        let v = ramp();
        assert_eq!(v.sample_nearest(&Point3::new(1.6, 0.0, 0.0)), Some(2.0));
        assert_eq!(v.sample_nearest(&Point3::new(9.0, 0.0, 0.0)), None);
    }

    #[test]
    fn gradient_of_ramp() {
        let v = ramp();
        let g = v.gradient(1, 1, 0);
        assert_relative_eq!(g.x, 1.0);
        assert_relative_eq!(g.y, 0.0);
        assert_relative_eq!(g.z, 0.0);
    }
}
