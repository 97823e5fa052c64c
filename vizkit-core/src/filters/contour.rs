//! Isosurface extraction from image volumes.
//!
//! Every grid cell is split into six tetrahedra around its main diagonal and
//! each tetrahedron is contoured on its own. Neighbouring cells split their
//! shared faces along the same diagonal, so the surface is watertight
//! without the 256-case cube tables.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::geometry::PolyData;
use crate::volume::ImageVolume;

/// Cube corner offsets, counter-clockwise on the bottom face then the top face
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Six tetrahedra sharing the 0-6 diagonal
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Extract the surface where the volume equals `value`.
///
/// Triangles are wound so their face normal points down the gradient, out of
/// the region above `value`. With `compute_normals` the output carries
/// per-point normals from the interpolated gradient.
pub fn isosurface(volume: &ImageVolume, value: f32, compute_normals: bool) -> PolyData {
    let [nx, ny, nz] = volume.dimensions();
    let mut builder = SurfaceBuilder {
        volume,
        value,
        output: PolyData::new(),
        normals: Vec::new(),
        edges: HashMap::new(),
    };

    if nx >= 2 && ny >= 2 && nz >= 2 {
        for k in 0..nz - 1 {
            for j in 0..ny - 1 {
                for i in 0..nx - 1 {
                    builder.cell(i, j, k);
                }
            }
        }
    }

    let SurfaceBuilder {
        mut output, normals, ..
    } = builder;
    if compute_normals {
        output.normals = Some(normals);
    }
    debug!(
        value,
        points = output.number_of_points(),
        triangles = output.triangles.len(),
        "Extracted isosurface"
    );
    output
}

struct SurfaceBuilder<'a> {
    volume: &'a ImageVolume,
    value: f32,
    output: PolyData,
    normals: Vec<Vector3<f32>>,
    /// sorted pair of linear grid indices -> output point id
    edges: HashMap<(usize, usize), u32>,
}

#[derive(Clone, Copy)]
struct Corner {
    grid: [usize; 3],
    linear: usize,
    scalar: f32,
}

impl SurfaceBuilder<'_> {
    fn cell(&mut self, i: usize, j: usize, k: usize) {
        let [nx, ny, _] = self.volume.dimensions();
        let corners = CORNERS.map(|[di, dj, dk]| {
            let grid = [i + di, j + dj, k + dk];
            Corner {
                grid,
                linear: (grid[2] * ny + grid[1]) * nx + grid[0],
                scalar: self.volume.get(grid[0], grid[1], grid[2]),
            }
        });

        let above = corners.iter().filter(|c| c.scalar >= self.value).count();
        if above == 0 || above == 8 {
            return;
        }

        for tet in TETRAHEDRA {
            self.tetrahedron(tet.map(|c| corners[c]));
        }
    }

    fn tetrahedron(&mut self, tet: [Corner; 4]) {
        let (inside, outside): (Vec<Corner>, Vec<Corner>) =
            tet.into_iter().partition(|c| c.scalar >= self.value);

        match inside.len() {
            1 | 3 => {
                let (lone, rest) = if inside.len() == 1 {
                    (inside[0], outside)
                } else {
                    (outside[0], inside)
                };
                let ids = [
                    self.edge_point(lone, rest[0]),
                    self.edge_point(lone, rest[1]),
                    self.edge_point(lone, rest[2]),
                ];
                self.emit(ids);
            }
            2 => {
                let (a, b) = (inside[0], inside[1]);
                let (c, d) = (outside[0], outside[1]);
                let ac = self.edge_point(a, c);
                let ad = self.edge_point(a, d);
                let bd = self.edge_point(b, d);
                let bc = self.edge_point(b, c);
                self.emit([ac, ad, bd]);
                self.emit([ac, bd, bc]);
            }
            _ => {}
        }
    }

    fn edge_point(&mut self, a: Corner, b: Corner) -> u32 {
        let (a, b) = if a.linear < b.linear { (a, b) } else { (b, a) };
        if let Some(&id) = self.edges.get(&(a.linear, b.linear)) {
            return id;
        }

        let t = (self.value - a.scalar) / (b.scalar - a.scalar);
        let pa = self.volume.position(a.grid[0], a.grid[1], a.grid[2]);
        let pb = self.volume.position(b.grid[0], b.grid[1], b.grid[2]);
        let ga = self.volume.gradient(a.grid[0], a.grid[1], a.grid[2]);
        let gb = self.volume.gradient(b.grid[0], b.grid[1], b.grid[2]);

        let point = Point3::from(pa.coords.lerp(&pb.coords, t));
        let normal = -ga.lerp(&gb, t);

        self.output.points.push(point);
        self.normals
            .push(normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros));
        let id = (self.output.points.len() - 1) as u32;
        self.edges.insert((a.linear, b.linear), id);
        id
    }

    fn emit(&mut self, mut tri: [u32; 3]) {
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            return;
        }
        let [a, b, c] = tri.map(|id| self.output.points[id as usize]);
        let face = (b - a).cross(&(c - a));
        let outward: Vector3<f32> = tri.iter().map(|&id| self.normals[id as usize]).sum();
        if face.dot(&outward) < 0.0 {
            tri.swap(1, 2);
        }
        self.output.triangles.push(tri);
    }
}
