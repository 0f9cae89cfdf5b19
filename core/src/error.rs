use thiserror::Error;

// Everything that can abort a generate/render run.
// Arithmetic anomalies inside the post-process stages are recovered in place
// and never show up here.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("size exponent must be between 1 and 12, got {0}")]
    InvalidSizeExponent(u32),
    #[error("roughness must be a finite value greater than 0, got {0}")]
    InvalidRoughness(f64),
    #[error("gradient needs at least one breakpoint")]
    EmptyGradient,
    #[error("gradient breakpoint {index} has position {position}, expected a value in [0, 1]")]
    InvalidBreakpoint { index: usize, position: f64 },
    #[error(
        "gradient breakpoint {index} at {position} does not come after the previous one at {previous}"
    )]
    UnorderedBreakpoints {
        index: usize,
        previous: f64,
        position: f64,
    },
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
