use std::collections::BTreeMap;

use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::evaluator::{param, FractalEvaluator, IterParams, ParamSet};
use crate::fractals::{BurningShip, Julia, Mandelbrot, Multibrot, Tricorn};

/// The default visible region for a fractal, in complex-plane units.
///
/// Different escape sets occupy different parts of the plane, so each
/// fractal declares where its interesting region lives.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRegion {
    pub center: Complex,
    pub re_span: f64,
    pub im_span: f64,
}

/// Builds a boxed evaluator from a parameter set and iteration params.
pub type EvaluatorBuilder = fn(&ParamSet, IterParams) -> Box<dyn FractalEvaluator>;

/// Everything the session layer needs to know about a registered fractal.
pub struct FractalDescriptor {
    /// Human-readable display name.
    pub name: &'static str,
    /// Default visible region for a fresh view of this fractal.
    pub region: DefaultRegion,
    /// Default iteration cap for a fresh view.
    pub max_iterations: u32,
    /// Formula parameters and their defaults (may be empty).
    pub default_params: &'static [(&'static str, f64)],
    builder: EvaluatorBuilder,
}

impl FractalDescriptor {
    pub fn new(
        name: &'static str,
        region: DefaultRegion,
        max_iterations: u32,
        default_params: &'static [(&'static str, f64)],
        builder: EvaluatorBuilder,
    ) -> Self {
        Self {
            name,
            region,
            max_iterations,
            default_params,
            builder,
        }
    }

    /// Materialize the default parameter set.
    pub fn param_set(&self) -> ParamSet {
        self.default_params
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// Explicit mapping from fractal id to descriptor.
///
/// Populated by explicit `register` calls at startup, no implicit
/// side-effect registration. Iteration order is stable (sorted by id).
#[derive(Default)]
pub struct FractalRegistry {
    entries: BTreeMap<String, FractalDescriptor>,
}

impl FractalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in fractal set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(
            "mandelbrot",
            FractalDescriptor::new(
                "Mandelbrot",
                DefaultRegion {
                    center: Complex::new(-0.75, 0.0),
                    re_span: 3.6,
                    im_span: 2.6,
                },
                256,
                &[],
                |_, params| Box::new(Mandelbrot::new(params)),
            ),
        );

        registry.register(
            "julia",
            FractalDescriptor::new(
                "Julia",
                DefaultRegion {
                    center: Complex::ZERO,
                    re_span: 4.2,
                    im_span: 4.2,
                },
                256,
                &[
                    ("julia_re", Julia::DEFAULT_K.re),
                    ("julia_im", Julia::DEFAULT_K.im),
                ],
                |set, params| {
                    let k = Complex::new(
                        param(set, "julia_re", Julia::DEFAULT_K.re),
                        param(set, "julia_im", Julia::DEFAULT_K.im),
                    );
                    Box::new(Julia::new(k, params))
                },
            ),
        );

        registry.register(
            "burning_ship",
            FractalDescriptor::new(
                "Burning Ship",
                DefaultRegion {
                    center: Complex::new(-0.65, -0.7),
                    re_span: 2.7,
                    im_span: 2.6,
                },
                256,
                &[],
                |_, params| Box::new(BurningShip::new(params)),
            ),
        );

        registry.register(
            "tricorn",
            FractalDescriptor::new(
                "Tricorn",
                DefaultRegion {
                    center: Complex::ZERO,
                    re_span: 4.2,
                    im_span: 4.2,
                },
                256,
                &[],
                |_, params| Box::new(Tricorn::new(params)),
            ),
        );

        registry.register(
            "multibrot",
            FractalDescriptor::new(
                "Multibrot",
                DefaultRegion {
                    center: Complex::ZERO,
                    re_span: 3.4,
                    im_span: 3.4,
                },
                200,
                &[("power", Multibrot::DEFAULT_POWER)],
                |set, params| {
                    let power = param(set, "power", Multibrot::DEFAULT_POWER);
                    Box::new(Multibrot::new(power, params))
                },
            ),
        );

        registry
    }

    /// Register (or replace) a fractal descriptor.
    pub fn register(&mut self, id: impl Into<String>, descriptor: FractalDescriptor) {
        let id = id.into();
        debug!(id = %id, name = descriptor.name, "Registered fractal");
        self.entries.insert(id, descriptor);
    }

    pub fn descriptor(&self, id: &str) -> crate::Result<&FractalDescriptor> {
        self.entries
            .get(id)
            .ok_or_else(|| CoreError::UnknownFractal(id.to_string()))
    }

    /// Construct an evaluator for `id` with the given parameters.
    pub fn build_evaluator(
        &self,
        id: &str,
        set: &ParamSet,
        params: IterParams,
    ) -> crate::Result<Box<dyn FractalEvaluator>> {
        let descriptor = self.descriptor(id)?;
        Ok((descriptor.builder)(set, params))
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EscapeResult;

    #[test]
    fn builtins_are_present() {
        let registry = FractalRegistry::with_builtins();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(
            ids,
            vec!["burning_ship", "julia", "mandelbrot", "multibrot", "tricorn"]
        );
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = FractalRegistry::with_builtins();
        assert!(matches!(
            registry.descriptor("nova"),
            Err(CoreError::UnknownFractal(_))
        ));
        assert!(registry
            .build_evaluator("nova", &ParamSet::new(), IterParams::default())
            .is_err());
    }

    #[test]
    fn julia_builder_reads_params() {
        let registry = FractalRegistry::with_builtins();
        let mut set = ParamSet::new();
        set.insert("julia_re".into(), 0.0);
        set.insert("julia_im".into(), 0.0);
        let evaluator = registry
            .build_evaluator("julia", &set, IterParams::default())
            .unwrap();
        // k = 0 ⇒ the unit disc is interior.
        assert_eq!(
            evaluator.evaluate(Complex::new(0.3, 0.0)),
            EscapeResult::Interior
        );
        assert!(matches!(
            evaluator.evaluate(Complex::new(1.5, 0.0)),
            EscapeResult::Escaped { .. }
        ));
    }

    #[test]
    fn descriptor_defaults_materialize() {
        let registry = FractalRegistry::with_builtins();
        let julia = registry.descriptor("julia").unwrap();
        let set = julia.param_set();
        assert!(set.contains_key("julia_re"));
        assert!(set.contains_key("julia_im"));
        assert_eq!(registry.descriptor("mandelbrot").unwrap().param_set().len(), 0);
    }

    #[test]
    fn custom_registration() {
        let mut registry = FractalRegistry::new();
        registry.register(
            "plain_mandelbrot",
            FractalDescriptor::new(
                "Plain Mandelbrot",
                DefaultRegion {
                    center: Complex::ZERO,
                    re_span: 4.0,
                    im_span: 4.0,
                },
                128,
                &[],
                |_, params| Box::new(Mandelbrot::new(params)),
            ),
        );
        assert!(registry.descriptor("plain_mandelbrot").is_ok());
        assert!(registry.descriptor("mandelbrot").is_err());
    }
}
