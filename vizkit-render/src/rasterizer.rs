//! Z-buffered triangle and line rasterization with a headlight.
use std::borrow::Cow;

use nalgebra::{Matrix4, Point3, Vector3};
use vizkit_core::projection::project_with;
use vizkit_core::{Camera, PolyData};

use crate::color::Color;
use crate::frame::Frame;
use crate::property::{Interpolation, Property, Representation};
use crate::viewport::PixelRect;

/// Lines win depth ties against the surface they lie on
const LINE_DEPTH_BIAS: f32 = 1e-4;

/// Projected vertex: pixel position inside the frame plus depth in [0, 1]
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
}

/// Draws polygonal data into one viewport of a frame
pub struct Rasterizer<'a> {
    frame: &'a mut Frame,
    rect: PixelRect,
    mvp: Matrix4<f32>,
    /// Unit vector from the scene towards the camera
    light: Vector3<f32>,
}

impl<'a> Rasterizer<'a> {
    pub fn new(frame: &'a mut Frame, rect: PixelRect, camera: &Camera) -> Self {
        let aspect = rect.width.max(1) as f32 / rect.height.max(1) as f32;
        Self {
            frame,
            rect,
            mvp: camera.projection_matrix(aspect) * camera.view_matrix(),
            light: -camera.direction(),
        }
    }

    pub fn render_polydata(&mut self, mesh: &PolyData, property: &Property) {
        let projected: Vec<Option<ScreenVertex>> =
            mesh.points.iter().map(|p| self.project(p)).collect();

        match property.representation {
            Representation::Wireframe => {
                for tri in &mesh.triangles {
                    for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                        self.draw_edge(&projected, a, b, property.color);
                    }
                }
            }
            Representation::Surface => self.render_surface(mesh, &projected, property),
        }

        for line in &mesh.lines {
            for pair in line.windows(2) {
                self.draw_edge(&projected, pair[0], pair[1], property.color);
            }
        }
    }

    fn render_surface(
        &mut self,
        mesh: &PolyData,
        projected: &[Option<ScreenVertex>],
        property: &Property,
    ) {
        let normals = match property.interpolation {
            Interpolation::Flat => Cow::Borrowed(&[][..]),
            _ => point_normals(mesh),
        };

        for (index, tri) in mesh.triangles.iter().enumerate() {
            let Some(screen) = corners(projected, tri) else {
                // Triangle is clipped
                continue;
            };

            match property.interpolation {
                Interpolation::Flat => {
                    let normal = mesh.triangle(index).calculate_normal();
                    let color = self.shade(property, &normal);
                    self.fill_triangle(&screen, |_| color);
                }
                Interpolation::Gouraud => {
                    let colors = tri.map(|i| self.shade(property, &normals[i as usize]));
                    self.fill_triangle(&screen, |w| {
                        colors[0]
                            .scale(w[0])
                            .add(colors[1].scale(w[1]))
                            .add(colors[2].scale(w[2]))
                    });
                }
                Interpolation::Phong => {
                    let n = tri.map(|i| normals[i as usize]);
                    let light = self.light;
                    self.fill_triangle(&screen, |w| {
                        let normal = n[0] * w[0] + n[1] * w[1] + n[2] * w[2];
                        lighting(property, &normal, &light)
                    });
                }
            }
        }
    }

    fn shade(&self, property: &Property, normal: &Vector3<f32>) -> Color {
        lighting(property, normal, &self.light)
    }

    fn project(&self, point: &Point3<f32>) -> Option<ScreenVertex> {
        let (x, y, depth) = project_with(&self.mvp, point, self.rect.width, self.rect.height)?;
        Some(ScreenVertex {
            x: x + self.rect.x as f32,
            y: y + self.rect.y as f32,
            depth,
        })
    }

    fn fill_triangle(&mut self, v: &[ScreenVertex; 3], shade: impl Fn([f32; 3]) -> Color) {
        let rect = self.rect;
        if rect.is_empty() {
            return;
        }

        // Bounding box
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor() as i64;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil() as i64;
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor() as i64;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil() as i64;

        // Clip to the viewport
        let min_x = min_x.max(rect.x as i64);
        let max_x = max_x.min((rect.x + rect.width) as i64 - 1);
        let min_y = min_y.max(rect.y as i64);
        let max_y = max_y.min((rect.y + rect.height) as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some(w) = barycentric((v[0].x, v[0].y), (v[1].x, v[1].y), (v[2].x, v[2].y), p)
                else {
                    return;
                };
                if w.iter().any(|&wi| wi < 0.0) {
                    continue;
                }
                let depth = w[0] * v[0].depth + w[1] * v[1].depth + w[2] * v[2].depth;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let (x, y) = (x as u32, y as u32);
                if depth < self.frame.depth(x, y) {
                    self.frame.plot(x, y, depth, shade(w));
                }
            }
        }
    }

    fn draw_edge(&mut self, projected: &[Option<ScreenVertex>], a: u32, b: u32, color: Color) {
        if let (Some(a), Some(b)) = (projected[a as usize], projected[b as usize]) {
            self.draw_line(a, b, color);
        }
    }

    /// DDA line with interpolated depth
    fn draw_line(&mut self, a: ScreenVertex, b: ScreenVertex, color: Color) {
        let rect = self.rect;
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
        // Guard against degenerate projections far outside the viewport
        if steps > 16 * (rect.width + rect.height) as usize {
            return;
        }
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = (a.x + (b.x - a.x) * t).floor();
            let y = (a.y + (b.y - a.y) * t).floor();
            let depth = a.depth + (b.depth - a.depth) * t - LINE_DEPTH_BIAS;
            if x < 0.0 || y < 0.0 || !(-LINE_DEPTH_BIAS..=1.0).contains(&depth) {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if rect.contains(x, y) {
                self.frame.plot(x, y, depth, color);
            }
        }
    }
}

fn corners(projected: &[Option<ScreenVertex>], tri: &[u32; 3]) -> Option<[ScreenVertex; 3]> {
    Some([
        projected[tri[0] as usize]?,
        projected[tri[1] as usize]?,
        projected[tri[2] as usize]?,
    ])
}

/// Point normals of `mesh`, computed when it carries none
fn point_normals(mesh: &PolyData) -> Cow<'_, [Vector3<f32>]> {
    match &mesh.normals {
        Some(normals) if normals.len() == mesh.points.len() => Cow::Borrowed(normals),
        _ => {
            let mut copy = PolyData {
                points: mesh.points.clone(),
                normals: None,
                triangles: mesh.triangles.clone(),
                lines: Vec::new(),
            };
            copy.compute_point_normals();
            Cow::Owned(copy.normals.unwrap_or_default())
        }
    }
}

/// Two-sided headlight: ambient, diffuse and a white specular term
fn lighting(property: &Property, normal: &Vector3<f32>, light: &Vector3<f32>) -> Color {
    if !property.shading {
        return property.color;
    }
    let Some(n) = normal.try_normalize(1e-12) else {
        return property.color.scale(property.ambient);
    };
    // The viewer sits at the light, so the half vector is the light itself
    let cos = n.dot(light).abs();
    let mut color = property
        .color
        .scale(property.ambient + property.diffuse * cos);
    if property.specular > 0.0 {
        let highlight = property.specular * cos.powf(property.specular_power);
        color = color.add(Color::WHITE.scale(highlight));
    }
    color
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<[f32; 3]> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some([w0, w1, w2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vizkit_core::Bounds;

    fn front_camera(bounds: &Bounds) -> Camera {
        let mut camera = Camera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        camera.reset(bounds);
        camera
    }

    fn full(w: u32, h: u32) -> PixelRect {
        PixelRect {
            x: 0,
            y: 0,
            width: w,
            height: h,
        }
    }

    #[test]
    fn barycentric_of_vertex() {
        let w = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)).unwrap();
        assert_relative_eq!(w[0], 1.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn cube_covers_the_center_pixel() {
        let cube = PolyData::cube(2.0);
        let camera = front_camera(&cube.bounds());
        let mut frame = Frame::new(64, 64);
        frame.clear_rect(full(64, 64), Color::BLACK);
        let property = Property::default()
            .with_color(Color::new(1.0, 0.0, 0.0))
            .surface(Interpolation::Flat);
        Rasterizer::new(&mut frame, full(64, 64), &camera).render_polydata(&cube, &property);

        let center = frame.pixel(32, 32);
        assert!(center[0] > 200, "facing side is lit: {:?}", center);
        assert_eq!(center[1], 0);
        assert!(frame.depth(32, 32) < 1.0);
        // Corners stay background
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn wireframe_leaves_face_interior_empty() {
        let cube = PolyData::cube(2.0);
        let camera = front_camera(&cube.bounds());
        let mut frame = Frame::new(64, 64);
        frame.clear_rect(full(64, 64), Color::BLACK);
        let property = Property::default().with_color(Color::WHITE).wireframe();
        Rasterizer::new(&mut frame, full(64, 64), &camera).render_polydata(&cube, &property);

        let drawn = frame
            .as_rgba()
            .chunks_exact(4)
            .filter(|px| px[0] == 255)
            .count();
        assert!(drawn > 0);
        // Inside the front face, away from every projected edge
        assert_eq!(frame.pixel(20, 26), [0, 0, 0, 255]);
    }

    #[test]
    fn drawing_stays_inside_viewport() {
        let cube = PolyData::cube(2.0);
        let camera = front_camera(&cube.bounds());
        let mut frame = Frame::new(64, 32);
        let right = PixelRect {
            x: 32,
            y: 0,
            width: 32,
            height: 32,
        };
        frame.clear_rect(right, Color::BLACK);
        Rasterizer::new(&mut frame, right, &camera)
            .render_polydata(&cube, &Property::default().surface(Interpolation::Phong));

        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(frame.pixel(x, y), [0, 0, 0, 0]);
            }
        }
        assert!(frame.pixel(48, 16)[0] > 0);
    }

    #[test]
    fn lighting_is_two_sided() {
        let property = Property::default();
        let light = Vector3::z();
        let front = lighting(&property, &Vector3::z(), &light);
        let back = lighting(&property, &-Vector3::z(), &light);
        assert_eq!(front, back);
        let grazing = lighting(&property, &Vector3::x(), &light);
        assert_relative_eq!(grazing.r, 0.0);
    }

    #[test]
    fn specular_highlight_is_white() {
        let property = Property::default()
            .with_color(Color::new(0.0, 0.5, 0.5))
            .with_specular(0.4, 20.0);
        let lit = lighting(&property, &Vector3::z(), &Vector3::z());
        assert_relative_eq!(lit.r, 0.4, epsilon = 1e-5);
        let plain = lighting(&Property::default(), &Vector3::z(), &Vector3::z());
        assert_relative_eq!(plain.g, Property::default().color.g, epsilon = 1e-5);
    }
}
