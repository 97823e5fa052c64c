//! Plane / mesh intersection, joined into polylines.

use std::collections::HashMap;

use nalgebra::Point3;

use super::plane::Plane;
use crate::geometry::PolyData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CutPoint {
    /// An input vertex lying exactly on the plane
    Vertex(u32),
    /// Crossing of a sorted input edge
    Edge(u32, u32),
}

/// Intersect the triangles of `input` with `plane`.
///
/// Each crossed triangle contributes one segment; segments sharing an end
/// point are chained into polylines, closed loops repeat their first point.
/// Triangles lying in the plane contribute nothing.
pub fn cut_polydata(input: &PolyData, plane: &Plane) -> PolyData {
    let values: Vec<f32> = input.points.iter().map(|p| plane.evaluate(p)).collect();
    let mut output = PolyData::new();
    let mut ids: HashMap<CutPoint, u32> = HashMap::new();
    let mut segments: Vec<(u32, u32)> = Vec::new();

    for tri in &input.triangles {
        let mut hits: Vec<CutPoint> = Vec::with_capacity(3);
        for e in 0..3 {
            let (a, b) = (tri[e], tri[(e + 1) % 3]);
            let (va, vb) = (values[a as usize], values[b as usize]);
            let hit = if va == 0.0 {
                Some(CutPoint::Vertex(a))
            } else if (va < 0.0 && vb > 0.0) || (va > 0.0 && vb < 0.0) {
                Some(CutPoint::Edge(a.min(b), a.max(b)))
            } else {
                None
            };
            if let Some(hit) = hit {
                if !hits.contains(&hit) {
                    hits.push(hit);
                }
            }
        }
        if hits.len() != 2 {
            continue;
        }

        let [p, q] = [hits[0], hits[1]].map(|hit| {
            *ids.entry(hit).or_insert_with(|| {
                output.points.push(locate(input, &values, hit));
                (output.points.len() - 1) as u32
            })
        });
        segments.push((p, q));
    }

    output.lines = strip(&segments);
    output
}

fn locate(input: &PolyData, values: &[f32], hit: CutPoint) -> Point3<f32> {
    match hit {
        CutPoint::Vertex(id) => input.points[id as usize],
        CutPoint::Edge(a, b) => {
            let (va, vb) = (values[a as usize], values[b as usize]);
            let t = va / (va - vb);
            let (pa, pb) = (input.points[a as usize], input.points[b as usize]);
            Point3::from(pa.coords.lerp(&pb.coords, t))
        }
    }
}

/// Chain segments into polylines.
///
/// Open chains are walked from their end points first so they come out in
/// one piece; whatever remains belongs to closed loops.
pub fn strip(segments: &[(u32, u32)]) -> Vec<Vec<u32>> {
    let mut adjacency: HashMap<u32, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        adjacency.entry(a).or_default().push(i);
        adjacency.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    let mut starts: Vec<u32> = adjacency
        .iter()
        .filter(|(_, segs)| segs.len() == 1)
        .map(|(&p, _)| p)
        .collect();
    starts.sort_unstable();
    // Segments in input order seed the closed loops
    starts.extend(segments.iter().map(|&(a, _)| a));

    for start in starts {
        let Some(first) = next_segment(&adjacency, &used, start) else {
            continue;
        };
        let mut line = vec![start];
        let mut current = start;
        let mut segment = Some(first);
        while let Some(s) = segment {
            used[s] = true;
            let (a, b) = segments[s];
            current = if a == current { b } else { a };
            line.push(current);
            segment = next_segment(&adjacency, &used, current);
        }
        lines.push(line);
    }

    lines
}

fn next_segment(adjacency: &HashMap<u32, Vec<usize>>, used: &[bool], point: u32) -> Option<usize> {
    adjacency
        .get(&point)?
        .iter()
        .copied()
        .find(|&s| !used[s])
}
