use crate::complex::Complex;
use crate::evaluator::{EscapeResult, FractalEvaluator, IterParams};

/// The Multibrot family: `z_{n+1} = z_n^d + c` for a real exponent `d`
/// (parameter `power`, default 3).
///
/// The power step goes through polar form, so non-integer exponents work;
/// a degenerate orbit (NaN from `powf`/`atan2` at extreme magnitudes) is
/// sentineled as interior instead of poisoning the buffer.
#[derive(Debug, Clone)]
pub struct Multibrot {
    power: f64,
    params: IterParams,
}

impl Multibrot {
    pub const DEFAULT_POWER: f64 = 3.0;

    pub fn new(power: f64, params: IterParams) -> Self {
        Self { power, params }
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    /// `z^d` via polar decomposition. `z = 0` maps to 0 for positive `d`.
    #[inline]
    fn pow(&self, z: Complex) -> Complex {
        let r_sq = z.norm_sq();
        if r_sq == 0.0 {
            return Complex::ZERO;
        }
        let r_d = r_sq.sqrt().powf(self.power);
        let theta = z.im.atan2(z.re) * self.power;
        Complex::new(r_d * theta.cos(), r_d * theta.sin())
    }
}

impl Default for Multibrot {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POWER, IterParams::default())
    }
}

impl FractalEvaluator for Multibrot {
    fn evaluate(&self, c: Complex) -> EscapeResult {
        let escape_radius_sq = self.params.escape_radius_sq();
        let max_iter = self.params.max_iterations;

        let mut z = Complex::ZERO;

        for n in 0..max_iter {
            z = self.pow(z) + c;

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
            Multibrot::default().evaluate(Complex::ZERO),
            EscapeResult::Interior
        );
    }

    #[test]
    fn far_point_escapes() {
        assert!(matches!(
            Multibrot::default().evaluate(Complex::new(2.0, 2.0)),
            EscapeResult::Escaped { .. }
        ));
    }

    #[test]
    fn power_two_matches_mandelbrot() {
        let params = IterParams::new(200, 2.0).unwrap();
        let multi = Multibrot::new(2.0, params);
        let mandel = crate::fractals::Mandelbrot::new(params);
        // Points away from the cardioid boundary so rounding in the polar
        // path cannot flip the classification.
        for &(re, im) in &[(0.5, 0.5), (1.0, 1.0), (-2.5, 0.3), (0.4, 0.0)] {
            let c = Complex::new(re, im);
            assert_eq!(
                multi.evaluate(c).iterations_or(200),
                mandel.evaluate(c).iterations_or(200),
                "mismatch at ({re}, {im})"
            );
        }
    }
}
