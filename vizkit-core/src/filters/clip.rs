//! Clip polygonal data with an implicit plane.

use std::collections::HashMap;

use nalgebra::Point3;

use super::plane::Plane;
use crate::geometry::PolyData;

/// Keep the part of `input` where `plane.evaluate(x) >= 0`.
///
/// Triangles straddling the plane are split at the plane; points created on
/// a shared edge are shared between the neighbouring output triangles.
/// Polylines are clipped segment by segment.
pub fn clip_polydata(input: &PolyData, plane: &Plane) -> PolyData {
    let values: Vec<f32> = input.points.iter().map(|p| plane.evaluate(p)).collect();
    let mut clipper = Clipper {
        input,
        values: &values,
        output: PolyData::new(),
        kept: HashMap::new(),
        edges: HashMap::new(),
    };

    for tri in &input.triangles {
        clipper.clip_triangle(*tri);
    }
    for line in &input.lines {
        clipper.clip_polyline(line);
    }

    clipper.output
}

struct Clipper<'a> {
    input: &'a PolyData,
    values: &'a [f32],
    output: PolyData,
    /// input point id -> output point id
    kept: HashMap<u32, u32>,
    /// sorted input edge -> output point id of its plane crossing
    edges: HashMap<(u32, u32), u32>,
}

impl Clipper<'_> {
    fn inside(&self, id: u32) -> bool {
        self.values[id as usize] >= 0.0
    }

    fn keep(&mut self, id: u32) -> u32 {
        let points = &mut self.output.points;
        let input = self.input;
        *self.kept.entry(id).or_insert_with(|| {
            points.push(input.points[id as usize]);
            (points.len() - 1) as u32
        })
    }

    fn crossing(&mut self, a: u32, b: u32) -> u32 {
        let key = (a.min(b), a.max(b));
        let (va, vb) = (self.values[key.0 as usize], self.values[key.1 as usize]);
        let (pa, pb) = (self.input.points[key.0 as usize], self.input.points[key.1 as usize]);
        let points = &mut self.output.points;
        *self.edges.entry(key).or_insert_with(|| {
            let t = va / (va - vb);
            points.push(Point3::from(pa.coords.lerp(&pb.coords, t)));
            (points.len() - 1) as u32
        })
    }

    fn clip_triangle(&mut self, tri: [u32; 3]) {
        let inside = tri.map(|id| self.inside(id));
        match inside.iter().filter(|i| **i).count() {
            0 => {}
            3 => {
                let out = tri.map(|id| self.keep(id));
                self.output.triangles.push(out);
            }
            count => {
                // Rotate so the odd vertex comes first, preserving winding
                let odd = (0..3)
                    .find(|&i| inside[i] == (count == 1))
                    .unwrap_or(0);
                let a = tri[odd];
                let b = tri[(odd + 1) % 3];
                let c = tri[(odd + 2) % 3];
                let ab = self.crossing(a, b);
                let ac = self.crossing(a, c);
                if count == 1 {
                    let a = self.keep(a);
                    self.output.triangles.push([a, ab, ac]);
                } else {
                    let b = self.keep(b);
                    let c = self.keep(c);
                    self.output.triangles.push([ab, b, c]);
                    self.output.triangles.push([ab, c, ac]);
                }
            }
        }
    }

    fn clip_polyline(&mut self, line: &[u32]) {
        let mut current: Vec<u32> = Vec::new();
        for pair in line.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (self.inside(a), self.inside(b)) {
                (true, true) => {
                    if current.is_empty() {
                        current.push(self.keep(a));
                    }
                    current.push(self.keep(b));
                }
                (true, false) => {
                    if current.is_empty() {
                        current.push(self.keep(a));
                    }
                    current.push(self.crossing(a, b));
                    self.flush(&mut current);
                }
                (false, true) => {
                    current.push(self.crossing(a, b));
                    current.push(self.keep(b));
                }
                (false, false) => self.flush(&mut current),
            }
        }
        self.flush(&mut current);
    }

    fn flush(&mut self, current: &mut Vec<u32>) {
        if current.len() >= 2 {
            self.output.lines.push(std::mem::take(current));
        } else {
            current.clear();
        }
    }
}
