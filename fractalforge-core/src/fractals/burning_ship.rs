use crate::complex::Complex;
use crate::evaluator::{EscapeResult, FractalEvaluator, IterParams};

/// The Burning Ship: `z_{n+1} = (|Re z_n| + i·|Im z_n|)² + c`.
///
/// Taking component-wise absolute values before squaring breaks the
/// symmetry of the Mandelbrot recurrence and produces the "ship" shape
/// below the real axis.
#[derive(Debug, Clone)]
pub struct BurningShip {
    params: IterParams,
}

impl BurningShip {
    pub fn new(params: IterParams) -> Self {
        Self { params }
    }
}

impl Default for BurningShip {
    fn default() -> Self {
        Self::new(IterParams::default())
    }
}

impl FractalEvaluator for BurningShip {
    fn evaluate(&self, c: Complex) -> EscapeResult {
        let escape_radius_sq = self.params.escape_radius_sq();
        let max_iter = self.params.max_iterations;

        let mut z = Complex::ZERO;

        for n in 0..max_iter {
            let a = z.abs_components();
            z = Complex::new(
                a.re * a.re - a.im * a.im + c.re,
                2.0 * a.re * a.im + c.im,
            );

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
