//! vizkit rendering - viewports, software rasterization and image export
//!
//! Renderers hold scene ids and draw into their viewport of a shared frame:
//! surfaces through a z-buffered rasterizer, volumes through a compositing
//! ray caster. The exporter writes the composed frame with a codec picked
//! from the file extension.

pub mod actor;
pub mod color;
pub mod export;
pub mod frame;
pub mod property;
pub mod rasterizer;
pub mod raycast;
pub mod renderer;
pub mod transfer;
pub mod viewport;
pub mod window;

// Re-export commonly used types
pub use actor::{Actor, VolumeActor};
pub use color::{Color, NamedColors};
pub use export::{export_image, ExportReport, ImageCodec};
pub use frame::{BufferType, Frame};
pub use property::{Interpolation, Property, Representation, VolumeInterpolation, VolumeProperty};
pub use renderer::Renderer;
pub use transfer::{ColorTransferFunction, PiecewiseFunction};
pub use viewport::{PixelRect, Viewport};
pub use window::RenderWindow;
