//! Albedo lookup for materials.
//!
//! A texture maps a surface hit (texture coordinates and world point) to a
//! linear RGB color. Images are decoded by the caller; this module only
//! stores and samples linear pixels.

use std::sync::Arc;

use crate::noise::PerlinNoiseTexture;
use crate::Color;
use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while building an image texture.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TextureError {
    #[error("Texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Pixel buffer holds {len} values, expected {expected} for {width}x{height} RGBA")]
    SizeMismatch {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Source of albedo for a material.
#[derive(Clone, Debug)]
pub enum Texture {
    Solid(Color),
    Image(Arc<ImageTexture>),
    Noise(Arc<PerlinNoiseTexture>),
}

impl Texture {
    /// Color at a surface hit.
    #[inline]
    pub fn value(&self, uv: Vec2, point: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Image(image) => image.sample(uv.x, uv.y),
            Texture::Noise(noise) => noise.value(point),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(Arc::new(image))
    }
}

impl From<PerlinNoiseTexture> for Texture {
    fn from(noise: PerlinNoiseTexture) -> Self {
        Texture::Noise(Arc::new(noise))
    }
}

/// An image with pixel data.
///
/// Stores pixels in linear RGBA float format, row-major, top row first.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data as [R, G, B, A], linear 0-1 range
    pixels: Vec<[f32; 4]>,
}

impl ImageTexture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: pixels.len() * 4,
                expected: expected * 4,
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a texture from a flat linear RGBA float buffer.
    pub fn from_raw_rgba(width: u32, height: u32, data: &[f32]) -> TextureResult<Self> {
        let expected = width as usize * height as usize * 4;
        let pixels: &[[f32; 4]] = bytemuck::try_cast_slice(data).map_err(|_| TextureError::SizeMismatch {
            width,
            height,
            len: data.len(),
            expected,
        })?;

        Self::new(width, height, pixels.to_vec())
    }

    /// Create a texture from an 8-bit sRGB image.
    pub fn from_rgba8(image: &image::RgbaImage) -> TextureResult<Self> {
        let (width, height) = image.dimensions();

        // Convert to linear float RGBA
        let pixels = image
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                    p[3] as f32 / 255.0, // Alpha is linear
                ]
            })
            .collect();

        Self::new(width, height, pixels)
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x, color.y, color.z, 1.0]],
        }
    }

    /// Sample the texture at UV coordinates (bilinear filtering).
    ///
    /// UV coordinates wrap, with (0, 0) at bottom-left.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Flip V for image rows
        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0);

        let x0 = (x.floor() as u32).min(self.width - 1);
        let y0 = (y.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);

        top.lerp(bottom, fy)
    }

    /// RGB of the pixel at integer coordinates.
    fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = (y * self.width + x) as usize;
        let [r, g, b, _] = self.pixels.get(idx).copied().unwrap_or([0.0, 0.0, 0.0, 1.0]);
        Vec3::new(r, g, b)
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
