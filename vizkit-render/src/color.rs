//! RGB colors and the named color table.
use std::collections::HashMap;

use vizkit_core::{VizError, VizResult};

/// Linear RGB color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From 8-bit components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn add(self, other: Color) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        self.add(other.add(self.scale(-1.0)).scale(t))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Rec. 601 luma
    pub fn luminance(self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Color lookup by name.
///
/// Built explicitly and handed to whoever needs it; names match
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct NamedColors {
    colors: HashMap<String, Color>,
}

const STANDARD_COLORS: &[(&str, [u8; 3])] = &[
    ("Black", [0, 0, 0]),
    ("White", [255, 255, 255]),
    ("Red", [255, 0, 0]),
    ("Green", [0, 128, 0]),
    ("Blue", [0, 0, 255]),
    ("Yellow", [255, 255, 0]),
    ("Orange", [255, 165, 0]),
    ("Gold", [255, 215, 0]),
    ("SaddleBrown", [139, 69, 19]),
    ("Teal", [0, 128, 128]),
    ("Tomato", [255, 99, 71]),
    ("Peacock", [51, 161, 201]),
    ("Banana", [227, 207, 87]),
    ("Ivory", [255, 255, 240]),
    ("LightGray", [211, 211, 211]),
    ("SlateGray", [112, 128, 144]),
    ("MidnightBlue", [25, 25, 112]),
    ("Wheat", [245, 222, 179]),
];

impl NamedColors {
    /// The standard table
    pub fn new() -> Self {
        let mut colors = Self::empty();
        for (name, [r, g, b]) in STANDARD_COLORS {
            colors.insert(name, Color::from_rgb8(*r, *g, *b));
        }
        colors
    }

    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, color: Color) {
        self.colors.insert(name.to_ascii_lowercase(), color);
    }

    pub fn get(&self, name: &str) -> Option<Color> {
        self.colors.get(&name.to_ascii_lowercase()).copied()
    }

    /// Like [`NamedColors::get`], failing on unknown names
    pub fn color(&self, name: &str) -> VizResult<Color> {
        self.get(name)
            .ok_or_else(|| VizError::configuration(format!("unknown color name: {}", name)))
    }
}

impl Default for NamedColors {
    fn default() -> Self {
        Self::new()
    }
}
