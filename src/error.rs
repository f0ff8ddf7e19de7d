use thiserror::Error;

/// Everything the extraction and rendering pipeline can report.
///
/// All variants are plain values: the pipeline is deterministic, so
/// retrying with the same input produces the same error.
#[derive(Debug, Error)]
pub enum GradientError {
    /// The image has no pixels, or its pixel data does not match its size.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Fewer than two colors were extracted, so no gradient can be formed.
    #[error("palette has {found} color(s), at least 2 are needed for a gradient")]
    InsufficientPalette { found: usize },

    /// A size, count or name was rejected before any work started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Decoding the input or encoding the PNG failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GradientError>;
