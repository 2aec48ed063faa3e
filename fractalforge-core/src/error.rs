use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid dimensions: {width}×{height} (both must be > 0)")]
    InvalidDimension { width: u32, height: u32 },

    #[error("invalid zoom scale: {0} (must be positive and finite)")]
    InvalidZoom(f64),

    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius: {0} (must be > 0.0)")]
    InvalidEscapeRadius(f64),

    #[error("unknown fractal id: {0:?}")]
    UnknownFractal(String),
}
