use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Defines the visible region of the complex plane.
///
/// The viewport maps pixel coordinates to complex plane coordinates.
/// It is centred on `center`, with `scale` defining how many
/// complex-plane units each pixel spans.
///
/// Zoom convention: zooming is a multiplication of `scale`, so a factor
/// **below 1 zooms in** (fewer units per pixel), above 1 zooms out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Centre of the viewport in the complex plane.
    pub center: Complex,

    /// Complex-plane units per pixel. Always positive and finite.
    pub scale: f64,

    /// Viewport width in pixels.
    pub width: u32,

    /// Viewport height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport with explicit parameters.
    pub fn new(center: Complex, scale: f64, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidZoom(scale));
        }
        Ok(Self {
            center,
            scale,
            width,
            height,
        })
    }

    /// Fit a complex-plane region of `re_span × im_span` centred on `center`
    /// into a `width × height` pixel frame, preserving aspect ratio.
    ///
    /// The scale is chosen so the whole region is visible regardless of the
    /// frame's aspect ratio.
    pub fn from_region(
        center: Complex,
        re_span: f64,
        im_span: f64,
        width: u32,
        height: u32,
    ) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        let scale = (re_span / width as f64).max(im_span / height as f64);
        Self::new(center, scale, width, height)
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `(0, 0)` is the top-left pixel. The y-axis is flipped so that
    /// increasing pixel-y moves downward (decreasing imaginary part).
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> Complex {
        self.subpixel_to_complex(px as f64, py as f64)
    }

    /// Map fractional pixel coordinates to a complex-plane point.
    ///
    /// Like [`pixel_to_complex`](Self::pixel_to_complex) but accepts `f64`
    /// coordinates for sub-pixel sampling (used by supersampling).
    #[inline]
    pub fn subpixel_to_complex(&self, px: f64, py: f64) -> Complex {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        Complex::new(
            self.center.re + (px - half_w) * self.scale,
            self.center.im - (py - half_h) * self.scale,
        )
    }

    /// Map a complex-plane point back to (fractional) pixel coordinates.
    ///
    /// Exact inverse of [`subpixel_to_complex`](Self::subpixel_to_complex)
    /// up to floating-point rounding.
    #[inline]
    pub fn complex_to_pixel(&self, c: Complex) -> (f64, f64) {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        (
            (c.re - self.center.re) / self.scale + half_w,
            (self.center.im - c.im) / self.scale + half_h,
        )
    }

    /// Rescale around the complex point under pixel `(px, py)`, keeping that
    /// point fixed on screen.
    ///
    /// `factor < 1` zooms in, `factor > 1` zooms out. Fails with
    /// [`CoreError::InvalidZoom`] when the factor (or the resulting scale)
    /// is non-positive or non-finite.
    pub fn zoom_at(&mut self, px: u32, py: u32, factor: f64) -> crate::Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(CoreError::InvalidZoom(factor));
        }
        let focus = self.pixel_to_complex(px, py);
        let new_scale = self.scale * factor;
        if new_scale <= 0.0 || !new_scale.is_finite() {
            return Err(CoreError::InvalidZoom(new_scale));
        }
        // Recenter so that `focus` still maps to (px, py) at the new scale.
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        self.center = Complex::new(
            focus.re - (px as f64 - half_w) * new_scale,
            focus.im + (py as f64 - half_h) * new_scale,
        );
        self.scale = new_scale;
        Ok(())
    }

    /// Shift the view by a pixel delta.
    ///
    /// `pan(dx, dy)` moves the view so that the point previously under
    /// pixel `(px + dx, py + dy)` is now under `(px, py)`, consistent
    /// with [`pixel_to_complex`](Self::pixel_to_complex) deltas.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.center.re += dx as f64 * self.scale;
        self.center.im -= dy as f64 * self.scale;
    }

    /// Same center and scale at a new pixel size.
    pub fn resized(&self, width: u32, height: u32) -> crate::Result<Self> {
        Self::new(self.center, self.scale, width, height)
    }

    /// Create a higher-resolution viewport covering the same complex-plane
    /// region, for supersampled rendering.
    ///
    /// Multiplies pixel dimensions by `factor` and shrinks the per-pixel
    /// spacing proportionally, so the visible complex region stays the same.
    pub fn supersampled(&self, factor: u32) -> Self {
        let f = factor.max(1);
        Self {
            center: self.center,
            scale: self.scale / f as f64,
            width: self.width * f,
            height: self.height * f,
        }
    }

    /// The total extent of the viewport in complex-plane units.
    pub fn complex_width(&self) -> f64 {
        self.width as f64 * self.scale
    }

    /// The total extent of the viewport in complex-plane units.
    pub fn complex_height(&self) -> f64 {
        self.height as f64 * self.scale
    }
}
