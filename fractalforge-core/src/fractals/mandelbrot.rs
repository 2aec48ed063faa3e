use crate::complex::Complex;
use crate::evaluator::{EscapeResult, FractalEvaluator, IterParams};

/// The Mandelbrot set: `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
///
/// The point `c` is the coordinate on the complex plane.
#[derive(Debug, Clone)]
pub struct Mandelbrot {
    params: IterParams,
}

impl Mandelbrot {
    pub fn new(params: IterParams) -> Self {
        Self { params }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new(IterParams::default())
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
///
/// This is a closed-form check that avoids iterating ~30–40% of visible
/// points at the default zoom level.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

impl FractalEvaluator for Mandelbrot {
    fn evaluate(&self, c: Complex) -> EscapeResult {
        // Fast rejection: skip iteration for points known to be interior.
        if in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im) {
            return EscapeResult::Interior;
        }

        let escape_radius_sq = self.params.escape_radius_sq();
        let max_iter = self.params.max_iterations;

        let mut z = Complex::ZERO;

        for n in 0..max_iter {
            // z = z² + c
            z = Complex::new(z.re * z.re - z.im * z.im + c.re, 2.0 * z.re * z.im + c.im);

            let norm_sq = z.norm_sq();
            if norm_sq > escape_radius_sq {
                return EscapeResult::Escaped {
                    iterations: n,
                    norm_sq,
                };
            }
            if !norm_sq.is_finite() {
                return EscapeResult::Interior;
            }
        }

        EscapeResult::Interior
    }

    fn params(&self) -> &IterParams {
        &self.params
    }
}
