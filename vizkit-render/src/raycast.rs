//! Front-to-back compositing ray caster for scalar volumes.
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use vizkit_core::{Bounds, Camera, ImageVolume};

use crate::color::Color;
use crate::frame::Frame;
use crate::property::{VolumeInterpolation, VolumeProperty};
use crate::viewport::PixelRect;

/// Accumulated opacity at which a ray stops
const OPACITY_TERMINATION: f32 = 0.99;

/// Casts one ray per pixel of a viewport through a volume.
///
/// Rays stop at the depth already in the frame, so surfaces drawn before
/// the volume occlude it.
pub struct RayCaster<'a> {
    frame: &'a mut Frame,
    rect: PixelRect,
    inverse: Matrix4<f32>,
}

impl<'a> RayCaster<'a> {
    /// `None` when the camera matrices cannot be inverted
    pub fn new(frame: &'a mut Frame, rect: PixelRect, camera: &Camera) -> Option<Self> {
        let aspect = rect.width.max(1) as f32 / rect.height.max(1) as f32;
        let mvp = camera.projection_matrix(aspect) * camera.view_matrix();
        Some(Self {
            frame,
            rect,
            inverse: mvp.try_inverse()?,
        })
    }

    pub fn render_volume(&mut self, volume: &ImageVolume, property: &VolumeProperty) {
        let bounds = volume.bounds();
        let spacing = volume.spacing();
        let step = spacing[0].min(spacing[1]).min(spacing[2]);
        let unit = if property.opacity_unit_distance > 0.0 {
            property.opacity_unit_distance
        } else {
            step
        };

        for y in self.rect.y..self.rect.y + self.rect.height {
            for x in self.rect.x..self.rect.x + self.rect.width {
                let (ndc_x, ndc_y) = self.ndc(x, y);
                let (Some(near), Some(far)) = (
                    self.unproject(ndc_x, ndc_y, -1.0),
                    self.unproject(ndc_x, ndc_y, 1.0),
                ) else {
                    continue;
                };
                let ray = far - near;
                let length = ray.norm();
                if length <= f32::EPSILON {
                    continue;
                }

                // Stop at whatever is already drawn at this pixel
                let surface = self.frame.depth(x, y);
                let t_stop = if surface.is_finite() {
                    match self.unproject(ndc_x, ndc_y, surface * 2.0 - 1.0) {
                        Some(p) => (p - near).dot(&ray) / (length * length),
                        None => 1.0,
                    }
                } else {
                    1.0
                };

                let Some((t0, t1)) = slab(&near, &ray, &bounds) else {
                    continue;
                };
                let (t0, t1) = (t0.max(0.0), t1.min(t_stop));
                if t1 <= t0 {
                    continue;
                }

                let (color, alpha) = composite(
                    volume,
                    property,
                    near + ray * t0,
                    ray / length,
                    (t1 - t0) * length,
                    step,
                    unit,
                );
                if alpha > 0.0 {
                    self.frame.blend(x, y, color, alpha);
                }
            }
        }
    }

    fn ndc(&self, x: u32, y: u32) -> (f32, f32) {
        let fx = (x - self.rect.x) as f32 + 0.5;
        let fy = (y - self.rect.y) as f32 + 0.5;
        (
            fx / self.rect.width as f32 * 2.0 - 1.0,
            1.0 - fy / self.rect.height as f32 * 2.0,
        )
    }

    fn unproject(&self, x: f32, y: f32, z: f32) -> Option<Point3<f32>> {
        let p = self.inverse * Vector4::new(x, y, z, 1.0);
        if p.w.abs() <= 1e-12 {
            return None;
        }
        Some(Point3::new(p.x / p.w, p.y / p.w, p.z / p.w))
    }
}

/// Accumulate premultiplied color and opacity along one ray segment
fn composite(
    volume: &ImageVolume,
    property: &VolumeProperty,
    start: Point3<f32>,
    direction: Vector3<f32>,
    distance: f32,
    step: f32,
    unit: f32,
) -> (Color, f32) {
    let mut color = Color::BLACK;
    let mut alpha = 0.0f32;
    let mut travelled = step * 0.5;

    while travelled < distance {
        let p = start + direction * travelled;
        travelled += step;

        let value = match property.interpolation {
            VolumeInterpolation::Nearest => volume.sample_nearest(&p),
            VolumeInterpolation::Linear => volume.sample_linear(&p),
        };
        let Some(value) = value else {
            continue;
        };

        let opacity = property.scalar_opacity.value(value).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            continue;
        }
        // Opacity is defined per unit distance; correct it for the step
        let opacity = 1.0 - (1.0 - opacity).powf(step / unit);
        let weight = (1.0 - alpha) * opacity;
        color = color.add(property.color.color(value).scale(weight));
        alpha += weight;

        if alpha > OPACITY_TERMINATION {
            break;
        }
    }
    (color, alpha)
}

/// Parameter interval where `origin + t * ray` lies inside `bounds`
fn slab(origin: &Point3<f32>, ray: &Vector3<f32>, bounds: &Bounds) -> Option<(f32, f32)> {
    if bounds.is_empty() {
        return None;
    }
    let (mut t0, mut t1) = (f32::NEG_INFINITY, f32::INFINITY);
    for axis in 0..3 {
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if ray[axis].abs() < 1e-12 {
            if origin[axis] < lo || origin[axis] > hi {
                return None;
            }
            continue;
        }
        let a = (lo - origin[axis]) / ray[axis];
        let b = (hi - origin[axis]) / ray[axis];
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
    }
    (t0 <= t1).then_some((t0, t1))
}
