//! Dominant-color extraction and two-stop gradient wallpapers.
//!
//! Decoded pixels flow through four stages:
//!
//! 1. [`sampler::sample`] caps the number of pixels looked at,
//! 2. [`quantize::Quantizer`] clusters them into a [`Palette`],
//! 3. [`gradient::build`] turns the two most prominent colors into a
//!    [`GradientSpec`] for a [`Direction`],
//! 4. [`raster::rasterize`] paints it into an [`OutputBuffer`].
//!
//! [`pipeline::generate`] runs all four. Every stage is a pure function;
//! identical inputs give bit-identical palettes and buffers.
//!
//! ```
//! use gradient_wallpaper::{generate, Direction, ImageBuffer, Pixel, PipelineConfig};
//!
//! let red = Pixel::new(255, 0, 0);
//! let blue = Pixel::new(0, 0, 255);
//! let image = ImageBuffer::new(2, 1, vec![red, blue]).unwrap();
//! let config = PipelineConfig { width: 4, height: 1, ..Default::default() };
//!
//! let out = generate(&image, Direction::LeftToRight, &config).unwrap();
//! assert_eq!(out.css(), "linear-gradient(to right, #0000ff, #ff0000)");
//! assert_eq!(out.buffer.get(3, 0), Some(red));
//! ```

pub mod codec;
pub mod error;
pub mod gradient;
pub mod pipeline;
pub mod pixel;
pub mod quantize;
pub mod raster;
pub mod sampler;
pub mod wasm;

pub use error::{GradientError, Result};
pub use gradient::{Direction, GradientSpec, Point};
pub use pipeline::{extract_palette, generate, render_palette, PipelineConfig, Rendered};
pub use pixel::{ImageBuffer, OutputBuffer, Pixel};
pub use quantize::{quantize, Palette, Quantizer, Swatch};
pub use raster::rasterize;
pub use sampler::sample;
