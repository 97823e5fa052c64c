//! The render window: a fixed-size frame composed from several renderers.
use tracing::info;
use vizkit_core::{Scene, VizError, VizResult};

use crate::frame::Frame;
use crate::renderer::Renderer;

/// Composes the renderers' viewports into one frame
#[derive(Debug, Clone)]
pub struct RenderWindow {
    width: u32,
    height: u32,
    pub title: String,
    renderers: Vec<Renderer>,
    render_count: usize,
}

impl RenderWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: String::from("vizkit"),
            renderers: Vec::new(),
            render_count: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn add_renderer(&mut self, renderer: Renderer) -> usize {
        self.renderers.push(renderer);
        self.renderers.len() - 1
    }

    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    pub fn renderers_mut(&mut self) -> &mut [Renderer] {
        &mut self.renderers
    }

    /// How many frames have been composed so far
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Reset every renderer's camera to its visible props
    pub fn reset_cameras(&mut self, scene: &Scene) -> VizResult<()> {
        for renderer in &mut self.renderers {
            renderer.reset_camera(scene)?;
        }
        Ok(())
    }

    /// Compose all renderers at the window size
    pub fn render(&mut self, scene: &Scene) -> VizResult<Frame> {
        self.render_with_size(scene, self.width, self.height)
    }

    /// Compose at an explicit size; viewports scale with it
    pub fn render_with_size(&mut self, scene: &Scene, width: u32, height: u32) -> VizResult<Frame> {
        if width == 0 || height == 0 {
            return Err(VizError::configuration(format!(
                "cannot render a {}x{} window",
                width, height
            )));
        }
        let mut frame = Frame::new(width, height);
        for renderer in &self.renderers {
            renderer.render(scene, &mut frame)?;
        }
        self.render_count += 1;
        info!(
            width,
            height,
            renderers = self.renderers.len(),
            frame = self.render_count,
            "Frame composed"
        );
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::viewport::Viewport;

    #[test]
    fn render_counts_frames() {
        let scene = Scene::new();
        let mut window = RenderWindow::new(8, 8);
        window.add_renderer(Renderer::default());
        assert_eq!(window.render_count(), 0);
        window.render(&scene).unwrap();
        window.render_with_size(&scene, 4, 2).unwrap();
        assert_eq!(window.render_count(), 2);
    }

    #[test]
    fn later_renderers_draw_on_top() {
        let scene = Scene::new();
        let mut window = RenderWindow::new(4, 4);
        window.add_renderer(Renderer::default().with_background(Color::WHITE));
        window.add_renderer(
            Renderer::new(Viewport::new(0.5, 0.5, 1.0, 1.0).unwrap()).with_background(Color::BLACK),
        );
        let frame = window.render(&scene).unwrap();
        assert_eq!(frame.pixel(3, 0), [0, 0, 0, 255]);
        assert_eq!(frame.pixel(0, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn zero_size_is_rejected() {
        let scene = Scene::new();
        let mut window = RenderWindow::new(0, 10);
        assert!(matches!(
            window.render(&scene),
            Err(VizError::Configuration { .. })
        ));
    }
}
