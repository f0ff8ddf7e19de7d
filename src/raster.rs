//! Painting a [`GradientSpec`] into a pixel grid.

use crate::error::{GradientError, Result};
use crate::gradient::GradientSpec;
use crate::pixel::{checked_area, OutputBuffer, Pixel};

/// Rasterize `spec` into a `width` × `height` buffer.
///
/// Each pixel's position is projected onto the axis from `start_point` to
/// `end_point`; the clamped projection `t` picks the color
/// `round(start + t * (end - start))` per channel. Pixel columns are spread
/// over `[0, width]` (column `x` sits at `x * width / (width - 1)`), rows
/// likewise, so the outermost pixels land exactly on the canvas edges where
/// the endpoints are anchored. A zero-length axis paints the start color.
///
/// # Errors
///
/// [`GradientError::InvalidConfiguration`] if either dimension is zero.
pub fn rasterize(spec: &GradientSpec, width: u32, height: u32) -> Result<OutputBuffer> {
    let area = checked_area(width, height)?;
    if area == 0 {
        return Err(GradientError::InvalidConfiguration(format!(
            "output must be non-empty, got {width}x{height}"
        )));
    }

    let (x0, y0) = (spec.start_point.x, spec.start_point.y);
    let dx = spec.end_point.x - x0;
    let dy = spec.end_point.y - y0;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return Ok(OutputBuffer::from_parts(
            width,
            height,
            vec![spec.start; area],
        ));
    }

    let x_scale = edge_scale(width);
    let y_scale = edge_scale(height);

    let mut pixels: Vec<Pixel> = Vec::with_capacity(area);
    for y in 0..height {
        let py = f64::from(y) * y_scale - y0;
        let row_term = py * dy;
        for x in 0..width {
            let px = f64::from(x) * x_scale - x0;
            let t = ((px * dx + row_term) / len_sq).clamp(0.0, 1.0);
            pixels.push(spec.start.lerp(spec.end, t));
        }
    }

    tracing::debug!(width, height, css = %spec.css(), "rasterized gradient");
    Ok(OutputBuffer::from_parts(width, height, pixels))
}

/// Factor mapping pixel indices `0..n` onto `[0, n]`.
fn edge_scale(n: u32) -> f64 {
    if n > 1 {
        f64::from(n) / f64::from(n - 1)
    } else {
        0.0
    }
}
