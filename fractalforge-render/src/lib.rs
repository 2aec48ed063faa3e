pub mod band;
pub mod engine;
pub mod error;
pub mod escape_buffer;
pub mod export;
pub mod palette;
pub mod pan;
pub mod pixel_buffer;

pub use band::{build_bands, Region};
pub use engine::{
    EngineConfig, Frame, JobHandle, JobOutcome, PanSeed, ProgressFn, RenderEngine, RenderRequest,
};
pub use error::RenderError;
pub use escape_buffer::EscapeBuffer;
pub use export::{export_png, ExportMetadata};
pub use palette::{builtin_palettes, ColorParams, Palette, PaletteRegistry, INTERIOR_COLOR};
pub use pan::{plan_pan, PanPlan};
pub use pixel_buffer::PixelBuffer;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
