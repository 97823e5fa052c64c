use nalgebra::{Point3, Vector3};

use crate::error::{VizError, VizResult};

/// Implicit plane `f(x) = n · (x - origin)` with a unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: Point3<f32>,
    normal: Vector3<f32>,
}

impl Plane {
    /// Fails when the normal has no direction
    pub fn new(origin: Point3<f32>, normal: Vector3<f32>) -> VizResult<Self> {
        let normal = normal
            .try_normalize(1e-12)
            .ok_or_else(|| VizError::configuration("plane normal must be non-zero"))?;
        Ok(Self { origin, normal })
    }

    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Same plane, opposite half-space
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    pub fn evaluate(&self, p: &Point3<f32>) -> f32 {
        self.normal.dot(&(p - self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn evaluate_is_signed_distance() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(plane.evaluate(&Point3::new(5.0, 5.0, 3.0)), 2.0);
        assert_eq!(plane.flipped().evaluate(&Point3::new(5.0, 5.0, 3.0)), -2.0);
    }
}
