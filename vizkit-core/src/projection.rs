//! Camera and projection utilities
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3, Vector4};

use crate::geometry::Bounds;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub focal_point: Point3<f32>,
    pub view_up: Vector3<f32>,
    /// Vertical view angle in radians
    pub view_angle: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
    /// Half height of the view for orthographic projection
    pub parallel_scale: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            focal_point: Point3::new(0.0, 0.0, 0.0),
            view_up: Vector3::new(0.0, 1.0, 0.0),
            view_angle: 30f32.to_radians(),
            near: 0.01,
            far: 1000.01,
            mode: ProjectionMode::Perspective,
            parallel_scale: 1.0,
        }
    }

    /// Camera at `position` looking at `focal_point`
    pub fn looking_at(position: Point3<f32>, focal_point: Point3<f32>) -> Self {
        let mut camera = Self::new();
        camera.position = position;
        camera.focal_point = focal_point;
        camera.orthogonalize_view_up();
        camera
    }

    /// Unit vector from the camera towards the focal point
    pub fn direction(&self) -> Vector3<f32> {
        (self.focal_point - self.position)
            .try_normalize(1e-12)
            .unwrap_or_else(|| -Vector3::z())
    }

    pub fn distance(&self) -> f32 {
        (self.focal_point - self.position).norm()
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.focal_point, &self.view_up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(aspect, self.view_angle, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = self.parallel_scale;
                let width = height * aspect;
                Matrix4::new_orthographic(-width, width, -height, height, self.near, self.far)
            }
        }
    }

    /// Move the camera along its current view direction so `bounds` fills the view.
    ///
    /// The focal point moves to the center of the bounds; the distance fits the
    /// bounding sphere inside the view angle. Empty bounds leave the camera as is.
    pub fn reset(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            return;
        }
        let direction = self.direction();
        let center = bounds.center();
        let radius = (bounds.diagonal() * 0.5).max(1e-3);
        let distance = radius / (self.view_angle * 0.5).sin();

        self.focal_point = center;
        self.position = center - direction * distance;
        self.parallel_scale = radius;
        self.orthogonalize_view_up();
        self.reset_clipping_range(bounds);
    }

    /// Fit near and far planes around `bounds`
    pub fn reset_clipping_range(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            return;
        }
        let direction = self.direction();
        let (mut near, mut far) = (f32::INFINITY, f32::NEG_INFINITY);
        for corner in bounds.corners() {
            let d = (corner - self.position).dot(&direction);
            near = near.min(d);
            far = far.max(d);
        }
        let pad = (far - near).max(1e-3) * 0.01;
        far += pad;
        // Keep a sane near/far ratio so the depth buffer stays usable
        self.near = (near - pad).max(far * 1e-3);
        self.far = far;
    }

    /// Rotate the position about the view-up vector centered at the focal point
    pub fn azimuth(&mut self, degrees: f32) {
        let axis = Unit::new_normalize(self.view_up);
        self.orbit(Rotation3::from_axis_angle(&axis, degrees.to_radians()));
    }

    /// Rotate the position about the cross product of the view direction and view-up
    pub fn elevation(&mut self, degrees: f32) {
        let right = self.direction().cross(&self.view_up);
        let Some(axis) = Unit::try_new(right, 1e-12) else {
            return;
        };
        // Positive elevation moves the camera up
        let rotation = Rotation3::from_axis_angle(&axis, -degrees.to_radians());
        self.orbit(rotation);
        self.view_up = rotation * self.view_up;
        self.orthogonalize_view_up();
    }

    fn orbit(&mut self, rotation: Rotation3<f32>) {
        let offset = self.position - self.focal_point;
        self.position = self.focal_point + rotation * offset;
    }

    fn orthogonalize_view_up(&mut self) {
        let direction = self.direction();
        let mut up = self.view_up - direction * self.view_up.dot(&direction);
        if up.norm() < 1e-6 {
            // View-up parallel to the view direction: pick any perpendicular axis
            up = direction.cross(&Vector3::x());
            if up.norm() < 1e-6 {
                up = direction.cross(&Vector3::y());
            }
        }
        self.view_up = up.normalize();
    }

    /// Project a world point to pixel coordinates of a `width` x `height` viewport.
    ///
    /// Returns `(x, y, depth)` with `y` growing downwards and depth in [0, 1],
    /// or `None` for points behind the camera.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let aspect = width as f32 / height.max(1) as f32;
        let mvp = self.projection_matrix(aspect) * self.view_matrix();
        project_with(&mvp, point, width, height)
    }
}

/// Project through a precomputed model-view-projection matrix
pub fn project_with(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, (ndc_z + 1.0) * 0.5))
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
