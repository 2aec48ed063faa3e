use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid supersampling factor: {0} (must be in 1..=8)")]
    InvalidSupersample(u32),

    #[error("unknown palette id: {0:?}")]
    UnknownPalette(String),

    #[error("worker pool: {0}")]
    ThreadPool(String),

    #[error("PNG export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Core(#[from] fractalforge_core::CoreError),
}
