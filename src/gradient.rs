//! Two-stop linear gradients derived from a palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradientError, Result};
use crate::pixel::Pixel;
use crate::quantize::Palette;

/// Gradient axis, matching the four CSS directions offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
    DiagonalDownRight,
    DiagonalUpRight,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::LeftToRight,
        Direction::TopToBottom,
        Direction::DiagonalDownRight,
        Direction::DiagonalUpRight,
    ];

    /// The `linear-gradient()` direction keyword.
    pub const fn css_keyword(self) -> &'static str {
        match self {
            Direction::LeftToRight => "to right",
            Direction::TopToBottom => "to bottom",
            Direction::DiagonalDownRight => "to bottom right",
            Direction::DiagonalUpRight => "to top right",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::LeftToRight => "left-to-right",
            Direction::TopToBottom => "top-to-bottom",
            Direction::DiagonalDownRight => "diagonal-down-right",
            Direction::DiagonalUpRight => "diagonal-up-right",
        }
    }

    /// Axis endpoints on a `width` × `height` canvas.
    pub fn endpoints(self, width: f64, height: f64) -> (Point, Point) {
        match self {
            Direction::LeftToRight => (Point::new(0.0, 0.0), Point::new(width, 0.0)),
            Direction::TopToBottom => (Point::new(0.0, 0.0), Point::new(0.0, height)),
            Direction::DiagonalDownRight => (Point::new(0.0, 0.0), Point::new(width, height)),
            Direction::DiagonalUpRight => (Point::new(0.0, height), Point::new(width, 0.0)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = GradientError;

    /// Accepts either the kebab-case name or the CSS keyword.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.name() == needle || d.css_keyword() == needle)
            .ok_or_else(|| {
                GradientError::InvalidConfiguration(format!(
                    "unknown direction {s:?} (expected one of: {})",
                    Direction::ALL.map(Direction::name).join(", ")
                ))
            })
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Start and end colors anchored at the two ends of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientSpec {
    pub start: Pixel,
    pub end: Pixel,
    pub direction: Direction,
    pub start_point: Point,
    pub end_point: Point,
}

impl GradientSpec {
    /// CSS background value, e.g. `linear-gradient(to right, #ff0000, #0000ff)`.
    pub fn css(&self) -> String {
        format!(
            "linear-gradient({}, {}, {})",
            self.direction.css_keyword(),
            self.start,
            self.end
        )
    }
}

/// Build the gradient from the two most prominent palette colors.
///
/// # Errors
///
/// [`GradientError::InsufficientPalette`] when the palette holds fewer than
/// two colors, [`GradientError::InvalidConfiguration`] for a zero-sized
/// canvas.
pub fn build(
    palette: &Palette,
    direction: Direction,
    canvas_width: u32,
    canvas_height: u32,
) -> Result<GradientSpec> {
    if canvas_width == 0 || canvas_height == 0 {
        return Err(GradientError::InvalidConfiguration(format!(
            "canvas must be non-empty, got {canvas_width}x{canvas_height}"
        )));
    }
    let (Some(start), Some(end)) = (palette.get(0), palette.get(1)) else {
        return Err(GradientError::InsufficientPalette {
            found: palette.len(),
        });
    };

    let (start_point, end_point) =
        direction.endpoints(f64::from(canvas_width), f64::from(canvas_height));
    Ok(GradientSpec {
        start,
        end,
        direction,
        start_point,
        end_point,
    })
}
