/// Half-block terminal output for composed frames
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use vizkit_render::Frame;

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Character luminosity ramp for terminals without true color (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// How frame pixels become terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// Two pixels per cell in 24-bit color
    TrueColor,
    /// One pixel per cell as an ASCII luminosity character
    Ascii,
}

/// Writes frames to a terminal, one cell column per pixel column
pub struct TerminalRenderer {
    cols: u16,
    rows: u16,
    mode: CellMode,
}

impl TerminalRenderer {
    pub fn new(cols: u16, rows: u16, mode: CellMode) -> Self {
        Self { cols, rows, mode }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Frame size that exactly fills the terminal
    pub fn frame_size(&self) -> (u32, u32) {
        let rows = self.rows as u32;
        match self.mode {
            CellMode::TrueColor => (self.cols as u32, rows * 2),
            CellMode::Ascii => (self.cols as u32, rows),
        }
    }

    pub fn draw<W: Write>(&self, frame: &Frame, writer: &mut W) -> std::io::Result<()> {
        let width = frame.width().min(self.cols as u32);
        match self.mode {
            CellMode::TrueColor => {
                let rows = (frame.height() / 2).min(self.rows as u32);
                for row in 0..rows {
                    for x in 0..width {
                        let top = frame.pixel(x, row * 2);
                        let bottom = frame.pixel(x, row * 2 + 1);
                        writer.queue(SetForegroundColor(rgb(top)))?;
                        writer.queue(SetBackgroundColor(rgb(bottom)))?;
                        writer.queue(Print(HALF_BLOCK))?;
                    }
                    writer.queue(ResetColor)?;
                    writer.queue(Print("\r\n"))?;
                }
            }
            CellMode::Ascii => {
                let rows = frame.height().min(self.rows as u32);
                for y in 0..rows {
                    for x in 0..width {
                        writer.queue(Print(ramp(frame.color(x, y).luminance())))?;
                    }
                    writer.queue(Print("\r\n"))?;
                }
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn rgb([r, g, b, _]: [u8; 4]) -> Color {
    Color::Rgb { r, g, b }
}

fn ramp(brightness: f32) -> char {
    let index = (brightness.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizkit_core::Scene;
    use vizkit_render::{Color as VizColor, RenderWindow, Renderer};

    #[test]
    fn frame_size_doubles_rows_in_true_color() {
        assert_eq!(TerminalRenderer::new(80, 24, CellMode::TrueColor).frame_size(), (80, 48));
        assert_eq!(TerminalRenderer::new(80, 24, CellMode::Ascii).frame_size(), (80, 24));
    }

    #[test]
    fn ramp_ends() {
        assert_eq!(ramp(0.0), ' ');
        assert_eq!(ramp(1.0), '@');
        assert_eq!(ramp(7.0), '@');
    }

    #[test]
    fn ascii_draw_writes_one_line_per_row() {
        let mut window = RenderWindow::new(4, 3);
        window.add_renderer(Renderer::default().with_background(VizColor::WHITE));
        let frame = window.render(&Scene::new()).unwrap();

        let mut out = Vec::new();
        TerminalRenderer::new(4, 3, CellMode::Ascii)
            .draw(&frame, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("@@@@\r\n").count(), 3);
    }
}
