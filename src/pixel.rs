//! Color and pixel-grid value types shared by every pipeline stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradientError, Result};

/// An opaque sRGB color, one byte per channel.
///
/// Ordering is lexicographic on (r, g, b); the quantizer relies on it for
/// its tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `#rrggbb` or `#rgb`; the leading `#` is optional.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || GradientError::InvalidConfiguration(format!("invalid hex color {s:?}"));
        if !hex.is_ascii() {
            return Err(invalid());
        }
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, digit) in out.iter_mut().zip(hex.chars()) {
                    let v = digit.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = (v << 4) | v;
                }
                Ok(Self::new(out[0], out[1], out[2]))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
                let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
                let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(invalid()),
        }
    }

    /// Per-channel linear interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Pixel, t: f64) -> Pixel {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let a = f64::from(a);
            (a + t * (f64::from(b) - a)).round().clamp(0.0, 255.0) as u8
        };
        Pixel::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Composite a straight-alpha RGBA value over white.
    pub fn over_white(rgba: [u8; 4]) -> Pixel {
        let a = u32::from(rgba[3]);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Pixel::new(blend(rgba[0]), blend(rgba[1]), blend(rgba[2]))
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Pixel {
    type Err = GradientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<Pixel> for String {
    fn from(p: Pixel) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Pixel {
    type Error = GradientError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<[u8; 3]> for Pixel {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

// ------------------------------------------------------------
// Pixel grids
// ------------------------------------------------------------

/// A decoded source image: row-major opaque pixels.
///
/// Constructed once per user image; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self> {
        let expected = checked_area(width, height)?;
        if expected == 0 {
            return Err(GradientError::InvalidImage(format!(
                "image has zero pixels ({width}x{height})"
            )));
        }
        if pixels.len() != expected {
            return Err(GradientError::InvalidImage(format!(
                "{width}x{height} image needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from raw RGBA bytes, compositing any transparency over white.
    pub fn from_rgba8(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        if raw.len() % 4 != 0 {
            return Err(GradientError::InvalidImage(format!(
                "RGBA data length {} is not a multiple of 4",
                raw.len()
            )));
        }
        let pixels = raw
            .chunks_exact(4)
            .map(|c| Pixel::over_white([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// A rasterized gradient, independent of the image it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl OutputBuffer {
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// One row of the buffer; empty if `y` is out of range.
    pub fn row(&self, y: u32) -> &[Pixel] {
        if y >= self.height {
            return &[];
        }
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Packed RGB bytes, three per pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.channels()).collect()
    }
}

pub(crate) fn checked_area(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| {
            GradientError::InvalidConfiguration(format!("{width}x{height} overflows the address space"))
        })
}
