//! Bounded, reproducible pixel sampling.

use crate::error::{GradientError, Result};
use crate::pixel::{ImageBuffer, Pixel};

/// Pick at most `max_samples` pixels from `image`.
///
/// Small images are returned whole, in row-major order. Larger ones are
/// sampled on a grid of `rows` × `cols` points, `rows * cols <= max_samples`,
/// with the grid shaped like the image. Row `i` sits at `floor(i * height /
/// rows)` and column `j` at `floor(j * width / cols)`, so both axes are
/// covered evenly whatever the image width is, and the result only depends
/// on the image and the cap.
pub fn sample(image: &ImageBuffer, max_samples: usize) -> Result<Vec<Pixel>> {
    if max_samples == 0 {
        return Err(GradientError::InvalidConfiguration(
            "max_samples must be at least 1".into(),
        ));
    }
    let pixels = image.pixels();
    if pixels.is_empty() {
        return Err(GradientError::InvalidImage("image has zero pixels".into()));
    }

    let total = pixels.len();
    if total <= max_samples {
        return Ok(pixels.to_vec());
    }

    let (width, height) = (image.width() as usize, image.height() as usize);
    let (rows, cols) = grid(width, height, max_samples);

    let mut picked = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        let y = i * height / rows;
        for j in 0..cols {
            let x = j * width / cols;
            picked.push(pixels[y * width + x]);
        }
    }

    tracing::trace!(total, rows, cols, sampled = picked.len(), "grid sample");
    Ok(picked)
}

/// Grid dimensions with `rows * cols <= max_samples`, `rows <= height` and
/// `cols <= width`, keeping roughly the image's aspect ratio.
fn grid(width: usize, height: usize, max_samples: usize) -> (usize, usize) {
    let ideal = (max_samples as f64 * width as f64 / height as f64).sqrt().round() as usize;
    let cols = ideal.clamp(1, width.min(max_samples));
    let rows = (max_samples / cols).clamp(1, height);
    (rows, cols)
}
