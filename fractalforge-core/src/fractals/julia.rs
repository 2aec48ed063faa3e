use crate::complex::Complex;
use crate::evaluator::{EscapeResult, FractalEvaluator, IterParams};

/// A Julia set: `z_{n+1} = z_n² + k` for a fixed constant `k`.
///
/// The pixel coordinate is the starting point `z₀`; `k` selects which
/// Julia set is drawn (parameters `julia_re` / `julia_im`).
#[derive(Debug, Clone)]
pub struct Julia {
    k: Complex,
    params: IterParams,
}

impl Julia {
    /// The classic dendrite-ish default constant.
    pub const DEFAULT_K: Complex = Complex {
        re: -0.7,
        im: 0.27015,
    };

    pub fn new(k: Complex, params: IterParams) -> Self {
        Self { k, params }
    }

    pub fn k(&self) -> Complex {
        self.k
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(Self::DEFAULT_K, IterParams::default())
    }
}

impl FractalEvaluator for Julia {
    fn evaluate(&self, c: Complex) -> EscapeResult {
        let escape_radius_sq = self.params.escape_radius_sq();
        let max_iter = self.params.max_iterations;

        let mut z = c;

        for n in 0..max_iter {
            z = z * z + self.k;

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
    fn far_seed_escapes() {
        let j = Julia::default();
        match j.evaluate(Complex::new(3.0, 3.0)) {
            EscapeResult::Escaped { iterations, .. } => assert!(iterations <= 3),
            EscapeResult::Interior => panic!("|z₀| far outside the bailout must escape"),
        }
    }

    #[test]
    fn fixed_point_of_zero_constant_is_interior() {
        // With k = 0 the orbit of z₀ = 0 never moves.
        let j = Julia::new(Complex::ZERO, IterParams::default());
        assert_eq!(j.evaluate(Complex::ZERO), EscapeResult::Interior);
    }

    #[test]
    fn unit_disc_boundary_with_zero_constant() {
        // k = 0: |z₀| < 1 contracts to 0 (interior), |z₀| > 1 blows up.
        let j = Julia::new(Complex::ZERO, IterParams::default());
        assert_eq!(j.evaluate(Complex::new(0.5, 0.0)), EscapeResult::Interior);
        assert!(matches!(
            j.evaluate(Complex::new(1.2, 0.0)),
            EscapeResult::Escaped { .. }
        ));
    }
}
