use std::collections::BTreeMap;

use rayon::prelude::*;

use fractalforge_core::EscapeResult;

use crate::error::RenderError;
use crate::escape_buffer::EscapeBuffer;
use crate::pixel_buffer::PixelBuffer;

const LUT_SIZE: usize = 256;

/// Interior pixels always map to this sentinel color.
pub const INTERIOR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Parameters for mapping escape results to palette colors.
#[derive(Debug, Clone, Copy)]
pub struct ColorParams {
    /// Use the logarithmic smooth-iteration value instead of the integer
    /// count, eliminating banding.
    pub smooth: bool,
    /// The palette repeats every this many iterations; `u32::MAX`
    /// effectively disables cycling.
    pub cycle_length: u32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            smooth: true,
            cycle_length: u32::MAX,
        }
    }
}

/// Continuous iteration value `ν = n + 1 − ln(ln|z|) / ln 2`.
///
/// Only meaningful for escaped orbits; clamped to `n` when the escape
/// magnitude is too small for the double logarithm.
#[inline]
fn smooth_iteration(iterations: u32, norm_sq: f64) -> f64 {
    let n = iterations as f64;
    if norm_sq <= 1.0 {
        return n;
    }
    // |z| = √norm_sq, so ln|z| = ln(norm_sq) / 2.
    let log_zn = norm_sq.ln() / 2.0;
    if log_zn <= 0.0 {
        return n;
    }
    let nu = (log_zn / std::f64::consts::LN_2).ln() / std::f64::consts::LN_2;
    if nu.is_finite() {
        n + 1.0 - nu
    } else {
        n
    }
}

/// A color palette backed by a gradient lookup table.
///
/// Each palette is a ring of `LUT_SIZE` RGBA colors. Escape results are
/// mapped to a fractional index and the final color is linearly
/// interpolated between adjacent entries.
#[derive(Clone)]
pub struct Palette {
    pub name: &'static str,
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Build a palette by interpolating gradient stops into the LUT.
    ///
    /// Stops are `(position in 0..=1, rgb)` and must be sorted ascending.
    pub fn from_stops(name: &'static str, stops: &[(f64, [u8; 3])]) -> Self {
        assert!(stops.len() >= 2, "a gradient needs at least two stops");
        let mut colors = Vec::with_capacity(LUT_SIZE);
        for i in 0..LUT_SIZE {
            let t = i as f64 / (LUT_SIZE - 1) as f64;
            let (lo, hi) = bracketing_stops(stops, t);
            let span = (hi.0 - lo.0).max(f64::EPSILON);
            let f = ((t - lo.0) / span).clamp(0.0, 1.0);
            colors.push([
                lerp_u8(lo.1[0], hi.1[0], f),
                lerp_u8(lo.1[1], hi.1[1], f),
                lerp_u8(lo.1[2], hi.1[2], f),
                255,
            ]);
        }
        Self { name, colors }
    }

    /// Sample the LUT ring at a fractional index with linear interpolation.
    fn sample(&self, t: f64) -> [u8; 4] {
        let len = self.colors.len();
        let wrapped = t.rem_euclid(len as f64);
        let i = wrapped as usize % len;
        let j = (i + 1) % len;
        let f = wrapped - wrapped.floor();
        let a = self.colors[i];
        let b = self.colors[j];
        [
            lerp_u8(a[0], b[0], f),
            lerp_u8(a[1], b[1], f),
            lerp_u8(a[2], b[2], f),
            255,
        ]
    }

    /// Map a single escape result to an RGBA color.
    ///
    /// Pure and invoked once per pixel after computation; swapping the
    /// palette never touches the render engine's scheduling.
    pub fn color_for(
        &self,
        result: EscapeResult,
        max_iterations: u32,
        params: &ColorParams,
    ) -> [u8; 4] {
        match result {
            EscapeResult::Interior => INTERIOR_COLOR,
            EscapeResult::Escaped {
                iterations,
                norm_sq,
            } => {
                let t = if params.smooth {
                    smooth_iteration(iterations, norm_sq)
                } else {
                    iterations as f64
                };
                let cycle = (params.cycle_length.min(max_iterations.max(1))) as f64;
                let pos = (t % cycle) / cycle;
                self.sample(pos * self.colors.len() as f64)
            }
        }
    }

    /// Colorize an entire escape buffer into an RGBA pixel buffer.
    pub fn colorize(&self, escape: &EscapeBuffer, params: &ColorParams) -> PixelBuffer {
        let len = escape.data.len();
        let max_iterations = escape.max_iterations;
        let mut pixels = vec![0u8; len * 4];
        pixels
            .par_chunks_mut(4)
            .zip(escape.data.par_iter())
            .for_each(|(pixel, &result)| {
                pixel.copy_from_slice(&self.color_for(result, max_iterations, params));
            });
        PixelBuffer {
            width: escape.width,
            height: escape.height,
            pixels,
        }
    }
}

fn bracketing_stops(stops: &[(f64, [u8; 3])], t: f64) -> ((f64, [u8; 3]), (f64, [u8; 3])) {
    let mut lo = stops[0];
    for &stop in stops {
        if stop.0 <= t {
            lo = stop;
        } else {
            return (lo, stop);
        }
    }
    (lo, *stops.last().unwrap_or(&lo))
}

#[inline]
fn lerp_u8(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round() as u8
}

// ---------------------------------------------------------------------------
// Palette registry
// ---------------------------------------------------------------------------

/// Explicit mapping from palette id to palette, populated at startup.
pub struct PaletteRegistry {
    entries: BTreeMap<&'static str, Palette>,
}

impl PaletteRegistry {
    /// A registry preloaded with the built-in palettes.
    pub fn with_builtins() -> Self {
        let mut entries = BTreeMap::new();
        for palette in builtin_palettes() {
            entries.insert(palette.name, palette);
        }
        Self { entries }
    }

    pub fn get(&self, id: &str) -> crate::Result<&Palette> {
        self.entries
            .get(id)
            .ok_or_else(|| RenderError::UnknownPalette(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// The built-in palette set.
pub fn builtin_palettes() -> Vec<Palette> {
    vec![
        Palette::from_stops(
            "classic",
            &[
                (0.0, [0, 7, 100]),
                (0.16, [32, 107, 203]),
                (0.42, [237, 255, 255]),
                (0.64, [255, 170, 0]),
                (0.86, [0, 2, 0]),
                (1.0, [0, 7, 100]),
            ],
        ),
        Palette::from_stops(
            "fire",
            &[
                (0.0, [20, 0, 0]),
                (0.3, [160, 20, 0]),
                (0.6, [255, 140, 0]),
                (0.85, [255, 255, 180]),
                (1.0, [20, 0, 0]),
            ],
        ),
        Palette::from_stops(
            "ice",
            &[
                (0.0, [0, 0, 40]),
                (0.35, [0, 80, 160]),
                (0.7, [120, 200, 255]),
                (0.9, [240, 250, 255]),
                (1.0, [0, 0, 40]),
            ],
        ),
        Palette::from_stops(
            "grayscale",
            &[(0.0, [0, 0, 0]), (0.5, [255, 255, 255]), (1.0, [0, 0, 0])],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Palette {
        builtin_palettes().into_iter().next().unwrap()
    }

    #[test]
    fn interior_maps_to_sentinel() {
        let p = classic();
        assert_eq!(
            p.color_for(EscapeResult::Interior, 256, &ColorParams::default()),
            INTERIOR_COLOR
        );
    }

    #[test]
    fn escaped_pixels_are_not_black() {
        let p = classic();
        let c = p.color_for(
            EscapeResult::Escaped {
                iterations: 10,
                norm_sq: 9.0,
            },
            256,
            &ColorParams::default(),
        );
        assert_ne!(&c[..3], &[0, 0, 0]);
    }

    #[test]
    fn smooth_value_sits_between_neighbours() {
        // Smooth iteration must land within ±1 of the integer count.
        for &(n, norm_sq) in &[(5u32, 4.5f64), (50, 16.0), (200, 5.0)] {
            let nu = smooth_iteration(n, norm_sq);
            assert!(nu > n as f64 - 1.0 && nu < n as f64 + 2.0, "ν = {nu} for n = {n}");
        }
    }

    #[test]
    fn registry_lookup() {
        let registry = PaletteRegistry::with_builtins();
        assert!(registry.get("classic").is_ok());
        assert!(registry.get("fire").is_ok());
        assert!(matches!(
            registry.get("neon"),
            Err(RenderError::UnknownPalette(_))
        ));
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["classic", "fire", "grayscale", "ice"]);
    }

    #[test]
    fn colorize_whole_buffer() {
        let mut escape = EscapeBuffer::new(4, 3, 100);
        escape.data[5] = EscapeResult::Escaped {
            iterations: 20,
            norm_sq: 8.0,
        };
        let out = classic().colorize(&escape, &ColorParams::default());
        assert_eq!(out.width, 4);
        assert_eq!(out.height, 3);
        assert_eq!(out.get(0, 0), INTERIOR_COLOR);
        assert_ne!(out.get(1, 1), INTERIOR_COLOR);
    }

    #[test]
    fn different_palettes_differ() {
        let palettes = builtin_palettes();
        let result = EscapeResult::Escaped {
            iterations: 30,
            norm_sq: 10.0,
        };
        let a = palettes[0].color_for(result, 256, &ColorParams::default());
        let b = palettes[1].color_for(result, 256, &ColorParams::default());
        assert_ne!(a, b);
    }
}
