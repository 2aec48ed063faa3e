//! PNG export with embedded metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::pixel_buffer::PixelBuffer;

/// Metadata to embed in an exported PNG as tEXt chunks.
pub struct ExportMetadata {
    pub fractal_id: String,
    pub center_re: f64,
    pub center_im: f64,
    pub scale: f64,
    pub max_iterations: u32,
    pub palette_id: String,
    pub supersample: u32,
}

/// Write an RGBA pixel buffer as a PNG file with embedded view metadata.
///
/// Uses the `png` crate directly (rather than `image`) to inject custom
/// tEXt chunks readable by exiftool and most image viewers.
pub fn export_png(
    buffer: &PixelBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let file =
        std::fs::File::create(path).map_err(|e| RenderError::Export(format!("create file: {e}")))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder
        .add_text_chunk("Software".to_string(), "FractalForge".to_string())
        .map_err(|e| RenderError::Export(format!("text chunk: {e}")))?;
    for (key, value) in metadata_pairs(metadata) {
        encoder
            .add_text_chunk(key, value)
            .map_err(|e| RenderError::Export(format!("text chunk: {e}")))?;
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| RenderError::Export(format!("write header: {e}")))?;
    png_writer
        .write_image_data(&buffer.pixels)
        .map_err(|e| RenderError::Export(format!("write image data: {e}")))?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

fn metadata_pairs(meta: &ExportMetadata) -> Vec<(String, String)> {
    vec![
        ("FractalForge.Fractal".into(), meta.fractal_id.clone()),
        ("FractalForge.CenterRe".into(), format!("{:.17}", meta.center_re)),
        ("FractalForge.CenterIm".into(), format!("{:.17}", meta.center_im)),
        ("FractalForge.Scale".into(), format!("{:e}", meta.scale)),
        (
            "FractalForge.MaxIterations".into(),
            meta.max_iterations.to_string(),
        ),
        ("FractalForge.Palette".into(), meta.palette_id.clone()),
        ("FractalForge.Supersample".into(), meta.supersample.to_string()),
    ]
}
