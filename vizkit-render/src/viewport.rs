//! Normalized viewport rectangles and their pixel footprint.
use vizkit_core::{VizError, VizResult};

/// Rectangle `[x0, y0, x1, y1]` in normalized window coordinates.
///
/// The origin is the bottom-left corner of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Pixel rectangle, rows counted from the top of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

impl Viewport {
    /// The whole window
    pub const FULL: Viewport = Viewport {
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
    };

    /// Fails unless `0 <= x0 < x1 <= 1` and `0 <= y0 < y1 <= 1`
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> VizResult<Self> {
        let unit = 0.0..=1.0;
        let ok = |lo: f32, hi: f32| unit.contains(&lo) && unit.contains(&hi) && lo < hi;
        if !ok(x0, x1) || !ok(y0, y1) {
            return Err(VizError::configuration(format!(
                "viewport [{}, {}, {}, {}] is not inside [0,1]x[0,1]",
                x0, y0, x1, y1
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// `cols` x `rows` cells covering the window, row-major from the top-left
    pub fn grid(cols: usize, rows: usize) -> Vec<Viewport> {
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Viewport {
                    x0: col as f32 / cols as f32,
                    x1: (col + 1) as f32 / cols as f32,
                    y0: (rows - row - 1) as f32 / rows as f32,
                    y1: (rows - row) as f32 / rows as f32,
                });
            }
        }
        cells
    }

    /// `n` side by side strips, left to right
    pub fn row(n: usize) -> Vec<Viewport> {
        Self::grid(n, 1)
    }

    /// Pixel footprint in a `width` x `height` frame.
    ///
    /// Edges are rounded independently, so viewports sharing an edge share
    /// the same pixel boundary.
    pub fn pixel_rect(&self, width: u32, height: u32) -> PixelRect {
        let px = |v: f32, size: u32| (v * size as f32).round().clamp(0.0, size as f32) as u32;
        let left = px(self.x0, width);
        let right = px(self.x1, width);
        let top = height - px(self.y1, height);
        let bottom = height - px(self.y0, height);
        PixelRect {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub fn aspect(&self, width: u32, height: u32) -> f32 {
        let rect = self.pixel_rect(width, height);
        rect.width.max(1) as f32 / rect.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_rect() {
        assert!(Viewport::new(0.5, 0.0, 0.25, 1.0).is_err());
        assert!(Viewport::new(0.0, 0.0, 1.5, 1.0).is_err());
        assert!(Viewport::new(0.0, 0.5, 0.5, 1.0).is_ok());
    }

    #[test]
    fn grid_matches_quadrant_layout() {
        let cells = Viewport::grid(2, 2);
        // top-left, top-right, bottom-left, bottom-right
        assert_eq!(cells[0], Viewport::new(0.0, 0.5, 0.5, 1.0).unwrap());
        assert_eq!(cells[1], Viewport::new(0.5, 0.5, 1.0, 1.0).unwrap());
        assert_eq!(cells[2], Viewport::new(0.0, 0.0, 0.5, 0.5).unwrap());
        assert_eq!(cells[3], Viewport::new(0.5, 0.0, 1.0, 0.5).unwrap());
    }

    #[test]
    fn top_left_quadrant_pixels() {
        let rect = Viewport::new(0.0, 0.5, 0.5, 1.0).unwrap().pixel_rect(700, 700);
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 0,
                width: 350,
                height: 350
            }
        );
    }

    #[test]
    fn grid_partitions_odd_sized_frame() {
        let (w, h) = (701, 333);
        let mut hits = vec![0u8; (w * h) as usize];
        for cell in Viewport::grid(2, 2) {
            let r = cell.pixel_rect(w, h);
            for y in r.y..r.y + r.height {
                for x in r.x..r.x + r.width {
                    hits[(y * w + x) as usize] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&n| n == 1));
    }

    #[test]
    fn row_of_three() {
        let strips = Viewport::row(3);
        assert_eq!(strips.len(), 3);
        let widths: u32 = strips.iter().map(|v| v.pixel_rect(1500, 500).width).sum();
        assert_eq!(widths, 1500);
        assert_eq!(strips[2].pixel_rect(1500, 500).x, 1000);
    }
}
