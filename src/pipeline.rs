//! One-call entry points chaining sample → quantize → build → rasterize.
//!
//! Every call starts from scratch and shares nothing with other calls, so
//! callers can run several pipelines on worker threads and drop stale
//! results without any cleanup.

use serde::{Deserialize, Serialize};

use crate::error::{GradientError, Result};
use crate::gradient::{self, Direction, GradientSpec};
use crate::pixel::{ImageBuffer, OutputBuffer};
use crate::quantize::{Palette, Quantizer};
use crate::raster;
use crate::sampler;

pub const DEFAULT_PALETTE_SIZE: usize = 5;
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of palette colors to extract (`k`).
    pub palette_size: usize,
    /// Upper bound on pixels handed to the quantizer.
    pub max_samples: usize,
    /// Output canvas width.
    pub width: u32,
    /// Output canvas height.
    pub height: u32,
    pub quantizer: Quantizer,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            max_samples: DEFAULT_MAX_SAMPLES,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            quantizer: Quantizer::default(),
        }
    }
}

impl PipelineConfig {
    /// # Errors
    ///
    /// [`GradientError::InvalidConfiguration`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max_samples == 0 {
            return Err(GradientError::InvalidConfiguration(
                "max_samples must be at least 1".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(GradientError::InvalidConfiguration(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        self.quantizer.validate(self.palette_size)
    }
}

/// Everything the front-end shows for one image and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub palette: Palette,
    pub gradient: GradientSpec,
    pub buffer: OutputBuffer,
}

impl Rendered {
    pub fn css(&self) -> String {
        self.gradient.css()
    }
}

/// Sample and quantize `image` into a palette.
pub fn extract_palette(image: &ImageBuffer, config: &PipelineConfig) -> Result<Palette> {
    config.validate()?;
    let samples = sampler::sample(image, config.max_samples)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        samples = samples.len(),
        "sampled image"
    );
    let palette = config.quantizer.quantize(&samples, config.palette_size)?;
    tracing::debug!(colors = ?palette.hex_codes(), "extracted palette");
    Ok(palette)
}

/// Build and rasterize the gradient for an already extracted palette.
pub fn render_palette(
    palette: &Palette,
    direction: Direction,
    config: &PipelineConfig,
) -> Result<(GradientSpec, OutputBuffer)> {
    config.validate()?;
    let spec = gradient::build(palette, direction, config.width, config.height)?;
    let buffer = raster::rasterize(&spec, config.width, config.height)?;
    Ok((spec, buffer))
}

/// Run the whole pipeline on `image`.
///
/// # Errors
///
/// Configuration problems surface before any work, then
/// [`GradientError::InvalidImage`] or
/// [`GradientError::InsufficientPalette`] as the stages hit them.
pub fn generate(
    image: &ImageBuffer,
    direction: Direction,
    config: &PipelineConfig,
) -> Result<Rendered> {
    let palette = extract_palette(image, config)?;
    let (gradient, buffer) = render_palette(&palette, direction, config)?;
    Ok(Rendered {
        palette,
        gradient,
        buffer,
    })
}
