//! One viewport's camera, background and props.
use tracing::debug;
use vizkit_core::{Bounds, Camera, Scene, VizResult};

use crate::actor::{Actor, VolumeActor};
use crate::color::Color;
use crate::frame::Frame;
use crate::rasterizer::Rasterizer;
use crate::raycast::RayCaster;
use crate::viewport::Viewport;

/// Draws its actors and volumes into its viewport of the window
#[derive(Debug, Clone)]
pub struct Renderer {
    pub viewport: Viewport,
    pub background: Color,
    pub camera: Camera,
    actors: Vec<Actor>,
    volumes: Vec<VolumeActor>,
}

impl Renderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: Color::BLACK,
            camera: Camera::new(),
            actors: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    pub fn add_volume(&mut self, volume: VolumeActor) {
        self.volumes.push(volume);
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn volumes(&self) -> &[VolumeActor] {
        &self.volumes
    }

    /// Union of the bounds of every visible prop
    pub fn visible_bounds(&self, scene: &Scene) -> VizResult<Bounds> {
        let mut bounds = Bounds::empty();
        for actor in self.actors.iter().filter(|a| a.visible) {
            bounds = bounds.union(&scene.geometry(actor.geometry)?.bounds());
        }
        for volume in self.volumes.iter().filter(|v| v.visible) {
            bounds = bounds.union(&scene.volume(volume.volume)?.bounds());
        }
        Ok(bounds)
    }

    /// Point the camera at the visible props, keeping its view direction
    pub fn reset_camera(&mut self, scene: &Scene) -> VizResult<()> {
        let bounds = self.visible_bounds(scene)?;
        self.camera.reset(&bounds);
        Ok(())
    }

    /// Clear the viewport, then draw surfaces followed by volumes
    pub fn render(&self, scene: &Scene, frame: &mut Frame) -> VizResult<()> {
        let rect = self.viewport.pixel_rect(frame.width(), frame.height());
        frame.clear_rect(rect, self.background);
        if rect.is_empty() {
            return Ok(());
        }
        debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            actors = self.actors.len(),
            volumes = self.volumes.len(),
            "Rendering viewport"
        );

        let mut rasterizer = Rasterizer::new(frame, rect, &self.camera);
        for actor in self.actors.iter().filter(|a| a.visible) {
            rasterizer.render_polydata(scene.geometry(actor.geometry)?, &actor.property);
        }

        if self.volumes.iter().any(|v| v.visible) {
            if let Some(mut caster) = RayCaster::new(frame, rect, &self.camera) {
                for volume in self.volumes.iter().filter(|v| v.visible) {
                    caster.render_volume(scene.volume(volume.volume)?, &volume.property);
                }
            }
        }
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Viewport::FULL)
    }
}
