//! Writing a composed window to an image file.
//!
//! The codec follows the file extension. PostScript has no alpha channel,
//! so it always captures RGB; JPEG and PNM receive RGB after the alpha
//! channel is dropped.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};
use tracing::info;
use vizkit_core::{Scene, VizError, VizResult};

use crate::frame::{BufferType, Frame};
use crate::window::RenderWindow;

/// Output encoders, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCodec {
    Bmp,
    Jpeg,
    Png,
    Pnm,
    PostScript,
    Tiff,
}

impl ImageCodec {
    /// Codec for the lowercase extension of `path`; anything unknown is PNG
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("bmp") => ImageCodec::Bmp,
            Some("jpg") => ImageCodec::Jpeg,
            Some("png") => ImageCodec::Png,
            Some("pnm") => ImageCodec::Pnm,
            Some("ps") => ImageCodec::PostScript,
            Some("tiff") => ImageCodec::Tiff,
            _ => ImageCodec::Png,
        }
    }

    pub fn supports_alpha(self) -> bool {
        matches!(self, ImageCodec::Bmp | ImageCodec::Png | ImageCodec::Tiff)
    }

    /// Buffer written for this codec; alpha is dropped where the format has none
    pub fn buffer_type(self, rgba: bool) -> BufferType {
        if rgba && self.supports_alpha() {
            BufferType::Rgba
        } else {
            BufferType::Rgb
        }
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            ImageCodec::Bmp => Some(ImageFormat::Bmp),
            ImageCodec::Jpeg => Some(ImageFormat::Jpeg),
            ImageCodec::Png => Some(ImageFormat::Png),
            ImageCodec::Pnm => Some(ImageFormat::Pnm),
            ImageCodec::Tiff => Some(ImageFormat::Tiff),
            ImageCodec::PostScript => None,
        }
    }
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub codec: ImageCodec,
    pub buffer: BufferType,
    pub width: u32,
    pub height: u32,
}

/// Render `window` and write the frame to `path`.
///
/// An empty path fails with a configuration error before anything is
/// rendered.
pub fn export_image(
    window: &mut RenderWindow,
    scene: &Scene,
    path: impl AsRef<Path>,
    rgba: bool,
) -> VizResult<ExportReport> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(VizError::configuration("need a filename"));
    }

    let codec = ImageCodec::from_path(path);
    let buffer = codec.buffer_type(rgba);
    let frame = window.render(scene)?;
    write_frame(&frame, path, codec, buffer)?;

    info!(
        path = %path.display(),
        codec = ?codec,
        buffer = ?buffer,
        width = frame.width(),
        height = frame.height(),
        "Image exported"
    );
    Ok(ExportReport {
        path: path.to_path_buf(),
        codec,
        buffer,
        width: frame.width(),
        height: frame.height(),
    })
}

/// Encode an already composed frame
pub fn write_frame(
    frame: &Frame,
    path: &Path,
    codec: ImageCodec,
    buffer: BufferType,
) -> VizResult<()> {
    let (width, height) = (frame.width(), frame.height());

    let Some(format) = codec.image_format() else {
        let eps = encode_eps(&frame.capture(BufferType::Rgb), width, height);
        return fs::write(path, eps).map_err(VizError::Io);
    };

    let buffer = if codec.supports_alpha() {
        buffer
    } else {
        BufferType::Rgb
    };
    let color = match buffer {
        BufferType::Rgb => ColorType::Rgb8,
        BufferType::Rgba => ColorType::Rgba8,
    };
    image::save_buffer_with_format(path, &frame.capture(buffer), width, height, color, format)
        .map_err(|err| match err {
            image::ImageError::IoError(io) => VizError::Io(io),
            other => VizError::Io(io::Error::new(io::ErrorKind::Other, other)),
        })
}

/// Level-2 encapsulated PostScript holding one RGB image, rows top first
pub fn encode_eps(rgb: &[u8], width: u32, height: u32) -> String {
    let mut out = String::with_capacity(rgb.len() * 2 + 512);
    let _ = write!(
        out,
        "%!PS-Adobe-3.0 EPSF-3.0\n\
         %%Creator: vizkit\n\
         %%BoundingBox: 0 0 {w} {h}\n\
         %%LanguageLevel: 2\n\
         %%Pages: 1\n\
         %%EndComments\n\
         gsave\n\
         {w} {h} scale\n\
         /DeviceRGB setcolorspace\n\
         << /ImageType 1 /Width {w} /Height {h} /BitsPerComponent 8\n   \
         /Decode [0 1 0 1 0 1] /ImageMatrix [{w} 0 0 -{h} 0 {h}]\n   \
         /DataSource currentfile /ASCIIHexDecode filter >>\n\
         image\n",
        w = width,
        h = height
    );
    for line in rgb.chunks(36) {
        for byte in line {
            let _ = write!(out, "{:02x}", byte);
        }
        out.push('\n');
    }
    out.push_str(">\ngrestore\nshowpage\n%%EOF\n");
    out
}
