//! Polygonal geometry: points, triangles and polylines.
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    /// An inverted box that any point will expand
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.include(p);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Bounds::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }

    /// The eight corners, x varying fastest
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// A triangle face defined by three positions
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }
}

/// Indexed polygonal data: the output of readers and pipeline stages.
///
/// `triangles` index into `points`; `lines` are polylines (two or more
/// indices each). `normals`, when present, holds one normal per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyData {
    pub points: Vec<Point3<f32>>,
    pub normals: Option<Vec<Vector3<f32>>>,
    pub triangles: Vec<[u32; 3]>,
    pub lines: Vec<Vec<u32>>,
}

impl PolyData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a triangle soup, merging coincident positions into shared points
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut merger = PointMerger::default();
        let mut poly = PolyData::new();
        poly.triangles.reserve(triangles.len());
        for triangle in triangles {
            let ids = triangle
                .vertices
                .map(|v| merger.insert(&mut poly.points, v));
            poly.triangles.push(ids);
        }
        poly
    }

    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    pub fn number_of_cells(&self) -> usize {
        self.triangles.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }

    /// Center of the bounding box
    pub fn center(&self) -> Point3<f32> {
        self.bounds().center()
    }

    pub fn triangle(&self, index: usize) -> Triangle {
        let [a, b, c] = self.triangles[index];
        Triangle::new(
            self.points[a as usize],
            self.points[b as usize],
            self.points[c as usize],
        )
    }

    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangles.len()).map(move |i| self.triangle(i))
    }

    /// Area-weighted vertex normals from the triangle faces
    pub fn compute_point_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.points.len()];
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| self.points[i as usize]);
            let face = (b - a).cross(&(c - a));
            for &i in tri {
                normals[i as usize] += face;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        }
        self.normals = Some(normals);
    }

    /// Create a simple cube mesh for testing, centered on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let bounds = Bounds::new(
            Point3::new(-half, -half, -half),
            Point3::new(half, half, half),
        );
        let points = bounds.corners().to_vec();
        // Counter-clockwise seen from outside
        let triangles = vec![
            [0, 2, 1], [1, 2, 3], // -z
            [4, 5, 6], [5, 7, 6], // +z
            [0, 1, 4], [1, 5, 4], // -y
            [2, 6, 3], [3, 6, 7], // +y
            [0, 4, 2], [2, 4, 6], // -x
            [1, 3, 5], [3, 7, 5], // +x
        ];
        Self {
            points,
            normals: None,
            triangles,
            lines: Vec::new(),
        }
    }
}

/// Deduplicates points by exact position
#[derive(Debug, Default)]
pub(crate) struct PointMerger {
    index: HashMap<[u32; 3], u32>,
}

impl PointMerger {
    pub(crate) fn insert(&mut self, points: &mut Vec<Point3<f32>>, p: Point3<f32>) -> u32 {
        // +0.0 and -0.0 are the same position
        let key = [p.x, p.y, p.z].map(|c| if c == 0.0 { 0u32 } else { c.to_bits() });
        *self.index.entry(key).or_insert_with(|| {
            points.push(p);
            (points.len() - 1) as u32
        })
    }
}
