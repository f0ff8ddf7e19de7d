//! Bridges between encoded image files and the pipeline's pixel buffers.

use image::{ImageFormat, RgbImage};

use crate::error::{GradientError, Result};
use crate::pixel::{ImageBuffer, OutputBuffer};

/// Decode any format the `image` crate recognises into an [`ImageBuffer`].
///
/// Transparency is composited over white.
pub fn decode(input: &[u8]) -> Result<ImageBuffer> {
    let img = image::load_from_memory(input)?;
    let rgba8 = img.to_rgba8();
    let (width, height) = rgba8.dimensions();
    ImageBuffer::from_rgba8(width, height, rgba8.as_raw())
}

/// PNG-encode a rasterized gradient.
pub fn encode_png(buffer: &OutputBuffer) -> Result<Vec<u8>> {
    let img = RgbImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgb8())
        .ok_or_else(|| GradientError::InvalidImage("failed to rebuild image buffer".into()))?;

    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok(buf)
}
