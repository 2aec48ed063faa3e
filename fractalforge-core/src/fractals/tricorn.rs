use crate::complex::Complex;
use crate::evaluator::{EscapeResult, FractalEvaluator, IterParams};

/// The Tricorn (Mandelbar): `z_{n+1} = conj(z_n)² + c`.
#[derive(Debug, Clone)]
pub struct Tricorn {
    params: IterParams,
}

impl Tricorn {
    pub fn new(params: IterParams) -> Self {
        Self { params }
    }
}

impl Default for Tricorn {
    fn default() -> Self {
        Self::new(IterParams::default())
    }
}

impl FractalEvaluator for Tricorn {
    fn evaluate(&self, c: Complex) -> EscapeResult {
        let escape_radius_sq = self.params.escape_radius_sq();
        let max_iter = self.params.max_iterations;

        let mut z = Complex::ZERO;

        for n in 0..max_iter {
            let zc = z.conj();
            z = zc * zc + c;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_interior() {
        assert_eq!(
            Tricorn::default().evaluate(Complex::ZERO),
            EscapeResult::Interior
        );
    }

    #[test]
    fn far_point_escapes() {
        assert!(matches!(
            Tricorn::default().evaluate(Complex::new(2.0, 2.0)),
            EscapeResult::Escaped { .. }
        ));
    }

    #[test]
    fn real_axis_matches_mandelbrot() {
        // On the real axis conjugation is a no-op, so the tricorn and
        // Mandelbrot recurrences coincide exactly.
        let params = IterParams::new(300, 2.0).unwrap();
        let tri = Tricorn::new(params);
        let mandel = crate::fractals::Mandelbrot::new(params);
        for i in 0..20 {
            let re = -2.0 + i as f64 * 0.15;
            let c = Complex::new(re, 0.0);
            assert_eq!(
                tri.evaluate(c).iterations_or(300),
                mandel.evaluate(c).iterations_or(300),
                "mismatch at re = {re}"
            );
        }
    }
}
