//! Visual attributes bound to actors.
use crate::color::Color;
use crate::transfer::{ColorTransferFunction, PiecewiseFunction};

/// How polygons are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    Wireframe,
    #[default]
    Surface,
}

/// Shading model for surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// One lighting value per face
    Flat,
    /// Lighting at the vertices, colors interpolated
    #[default]
    Gouraud,
    /// Normals interpolated, lighting per pixel
    Phong,
}

/// Surface appearance
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub color: Color,
    pub representation: Representation,
    pub interpolation: Interpolation,
    /// Lighting on; with it off the color is drawn as is
    pub shading: bool,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_power: f32,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            representation: Representation::Surface,
            interpolation: Interpolation::Gouraud,
            shading: true,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            specular_power: 1.0,
        }
    }
}

impl Property {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.representation = Representation::Wireframe;
        self
    }

    pub fn surface(mut self, interpolation: Interpolation) -> Self {
        self.representation = Representation::Surface;
        self.interpolation = interpolation;
        self
    }

    pub fn with_specular(mut self, specular: f32, power: f32) -> Self {
        self.specular = specular;
        self.specular_power = power;
        self
    }
}

/// Sampling of volume scalars between grid points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeInterpolation {
    #[default]
    Nearest,
    Linear,
}

/// Volume appearance: transfer functions and sampling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeProperty {
    pub color: ColorTransferFunction,
    pub scalar_opacity: PiecewiseFunction,
    pub interpolation: VolumeInterpolation,
    /// Distance over which `scalar_opacity` applies unchanged
    pub opacity_unit_distance: f32,
}

impl VolumeProperty {
    pub fn new(color: ColorTransferFunction, scalar_opacity: PiecewiseFunction) -> Self {
        Self {
            color,
            scalar_opacity,
            interpolation: VolumeInterpolation::Nearest,
            opacity_unit_distance: 1.0,
        }
    }

    pub fn with_interpolation(mut self, interpolation: VolumeInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}
