pub mod complex;
pub mod error;
pub mod evaluator;
pub mod fractals;
pub mod registry;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use evaluator::{param, EscapeResult, FractalEvaluator, IterParams, ParamSet};
pub use registry::{DefaultRegion, FractalDescriptor, FractalRegistry};
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
