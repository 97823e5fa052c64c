//! Transfer functions mapping scalar values to color and opacity.
use crate::color::Color;

/// Piecewise-linear scalar to color map, clamped outside its points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTransferFunction {
    points: Vec<(f32, Color)>,
}

impl ColorTransferFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control point; an existing point at `x` is replaced
    pub fn add_rgb_point(&mut self, x: f32, r: f32, g: f32, b: f32) -> &mut Self {
        insert_sorted(&mut self.points, x, Color::new(r, g, b));
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn color(&self, x: f32) -> Color {
        evaluate(&self.points, x, Color::lerp).unwrap_or(Color::BLACK)
    }
}

/// Piecewise-linear scalar to opacity map, clamped outside its points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PiecewiseFunction {
    points: Vec<(f32, f32)>,
}

impl PiecewiseFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, x: f32, y: f32) -> &mut Self {
        insert_sorted(&mut self.points, x, y);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value(&self, x: f32) -> f32 {
        evaluate(&self.points, x, |a, b, t| a + (b - a) * t).unwrap_or(0.0)
    }
}

fn insert_sorted<T>(points: &mut Vec<(f32, T)>, x: f32, value: T) {
    match points.binary_search_by(|(px, _)| px.total_cmp(&x)) {
        Ok(i) => points[i].1 = value,
        Err(i) => points.insert(i, (x, value)),
    }
}

fn evaluate<T: Copy>(points: &[(f32, T)], x: f32, lerp: impl Fn(T, T, f32) -> T) -> Option<T> {
    let (first, last) = (points.first()?, points.last()?);
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    let upper = points.partition_point(|(px, _)| *px <= x);
    let (x0, v0) = points[upper - 1];
    let (x1, v1) = points[upper];
    Some(lerp(v0, v1, (x - x0) / (x1 - x0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ct_color_ramp() {
        let mut color = ColorTransferFunction::new();
        color
            .add_rgb_point(0.0, 0.0, 0.0, 0.0)
            .add_rgb_point(255.0, 1.0, 0.5, 0.0);

        let mid = color.color(127.5);
        assert_relative_eq!(mid.r, 0.5);
        assert_relative_eq!(mid.g, 0.25);
        assert_eq!(color.color(-1000.0), Color::BLACK);
        assert_eq!(color.color(4000.0), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn opacity_ramp_clamps() {
        let mut opacity = PiecewiseFunction::new();
        opacity.add_point(255.0, 1.0).add_point(0.0, 0.0);
        assert_relative_eq!(opacity.value(51.0), 0.2);
        assert_eq!(opacity.value(-5.0), 0.0);
        assert_eq!(opacity.value(300.0), 1.0);
    }

    #[test]
    fn replacing_a_point() {
        let mut opacity = PiecewiseFunction::new();
        opacity.add_point(1.0, 0.1).add_point(1.0, 0.7);
        assert_eq!(opacity.len(), 1);
        assert_eq!(opacity.value(1.0), 0.7);
    }

    #[test]
    fn empty_functions_are_transparent_black() {
        assert_eq!(ColorTransferFunction::new().color(1.0), Color::BLACK);
        assert_eq!(PiecewiseFunction::new().value(1.0), 0.0);
    }
}
