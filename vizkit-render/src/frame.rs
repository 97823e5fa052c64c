//! Composed window pixels plus the shared depth buffer.
use crate::color::Color;
use crate::viewport::PixelRect;

/// Pixel layout of a captured buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    Rgb,
    Rgba,
}

impl BufferType {
    pub fn channels(self) -> usize {
        match self {
            BufferType::Rgb => 3,
            BufferType::Rgba => 4,
        }
    }
}

/// RGBA8 image, rows top to bottom, with one depth value per pixel.
///
/// Pixels no viewport covers stay transparent black.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    depth: Vec<f32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: vec![0; size * 4],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fill `rect` with an opaque background and reset its depth
    pub fn clear_rect(&mut self, rect: PixelRect, background: Color) {
        let [r, g, b] = background.to_rgb8();
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let i = self.index(x, y);
                self.rgba[i * 4..i * 4 + 4].copy_from_slice(&[r, g, b, 255]);
                self.depth[i] = f32::INFINITY;
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub fn color(&self, x: u32, y: u32) -> Color {
        let [r, g, b, _] = self.pixel(x, y);
        Color::from_rgb8(r, g, b)
    }

    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// Write an opaque pixel if `depth` passes the depth test
    pub(crate) fn plot(&mut self, x: u32, y: u32, depth: f32, color: Color) -> bool {
        let i = self.index(x, y);
        if depth >= self.depth[i] {
            return false;
        }
        self.depth[i] = depth;
        let [r, g, b] = color.to_rgb8();
        self.rgba[i * 4..i * 4 + 4].copy_from_slice(&[r, g, b, 255]);
        true
    }

    /// Composite a premultiplied color with coverage `alpha` over the pixel
    pub(crate) fn blend(&mut self, x: u32, y: u32, premultiplied: Color, alpha: f32) {
        let under = self.color(x, y);
        let out = premultiplied.add(under.scale(1.0 - alpha));
        let [r, g, b] = out.to_rgb8();
        let i = self.index(x, y) * 4;
        self.rgba[i..i + 3].copy_from_slice(&[r, g, b]);
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Copy the pixels out in the requested layout
    pub fn capture(&self, buffer: BufferType) -> Vec<u8> {
        match buffer {
            BufferType::Rgba => self.rgba.clone(),
            BufferType::Rgb => self
                .rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_transparent() {
        let frame = Frame::new(4, 3);
        assert_eq!(frame.pixel(3, 2), [0, 0, 0, 0]);
        assert_eq!(frame.capture(BufferType::Rgb).len(), 36);
        assert_eq!(frame.capture(BufferType::Rgba).len(), 48);
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let mut frame = Frame::new(2, 2);
        assert!(frame.plot(1, 1, 0.5, Color::WHITE));
        assert!(!frame.plot(1, 1, 0.7, Color::BLACK));
        assert_eq!(frame.pixel(1, 1), [255, 255, 255, 255]);
        assert!(frame.plot(1, 1, 0.2, Color::BLACK));
        assert_eq!(frame.pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn clear_rect_only_touches_rect() {
        let mut frame = Frame::new(4, 4);
        let rect = PixelRect {
            x: 2,
            y: 0,
            width: 2,
            height: 2,
        };
        frame.clear_rect(rect, Color::new(1.0, 0.0, 0.0));
        assert_eq!(frame.pixel(3, 1), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(1, 1), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(3, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn rgb_capture_drops_alpha() {
        let mut frame = Frame::new(1, 1);
        frame.plot(0, 0, 0.1, Color::new(0.0, 1.0, 0.0));
        assert_eq!(frame.capture(BufferType::Rgb), vec![0, 255, 0]);
    }
}
