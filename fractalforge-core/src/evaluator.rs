use std::collections::BTreeMap;

use crate::complex::Complex;
use crate::error::CoreError;

/// The outcome of iterating a single point.
///
/// The engine stores only raw escape data. The smooth coloring formula
/// (`ν = n + 1 − ln(ln|z|) / ln(2)`) is deferred to the coloring pass in
/// `fractalforge-render`, keeping the hot loop lean.
///
/// `Interior` doubles as the per-pixel fault sentinel: an evaluator that
/// hits a non-finite intermediate value reports the point as interior
/// rather than aborting the job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EscapeResult {
    /// The orbit escaped after `iterations` steps.
    /// `norm_sq` is `|z|²` at the moment of escape.
    Escaped { iterations: u32, norm_sq: f64 },

    /// The point is (likely) inside the set: it did not escape within
    /// `max_iterations`, or the orbit degenerated numerically.
    Interior,
}

impl EscapeResult {
    /// The iteration count viewed against a cap: interior points report the
    /// cap itself, escaped points their escape iteration.
    #[inline]
    pub fn iterations_or(&self, max_iterations: u32) -> u32 {
        match self {
            Self::Escaped { iterations, .. } => *iterations,
            Self::Interior => max_iterations,
        }
    }
}

/// Named formula parameters carried by requests and snapshots
/// (e.g. `julia_re`, `julia_im`, `power`).
pub type ParamSet = BTreeMap<String, f64>;

/// Look up a named parameter, falling back to a default.
pub fn param(set: &ParamSet, name: &str, default: f64) -> f64 {
    set.get(name).copied().unwrap_or(default)
}

/// Parameters controlling fractal iteration.
///
/// The cached `escape_radius_sq` field is automatically recomputed on
/// deserialization so persisted sessions always stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct IterParams {
    /// Maximum number of iterations before declaring a point interior.
    pub max_iterations: u32,

    /// Bailout radius. If `|z|` exceeds this, the orbit has escaped.
    /// Stored directly; the iteration loop compares against `escape_radius²`.
    pub escape_radius: f64,

    /// Cached `escape_radius * escape_radius`, precomputed to avoid
    /// redundant multiplication on every `evaluate()` call.
    #[serde(skip)]
    escape_radius_sq: f64,
}

/// Helper for deserialization: recomputes the cached square on load.
impl<'de> serde::Deserialize<'de> for IterParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            max_iterations: u32,
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            max_iterations: raw.max_iterations,
            escape_radius: raw.escape_radius,
            escape_radius_sq: raw.escape_radius * raw.escape_radius,
        })
    }
}

impl IterParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

    pub fn new(max_iterations: u32, escape_radius: f64) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        if escape_radius <= 0.0 || !escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(escape_radius));
        }
        Ok(Self {
            max_iterations,
            escape_radius,
            escape_radius_sq: escape_radius * escape_radius,
        })
    }

    /// Pre-computed squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for IterParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}

/// Capability implemented by every escape-time fractal formula.
///
/// `evaluate` must be pure, side-effect free, and total: it terminates
/// within `max_iterations` steps for any input. Designed so the render
/// engine stays agnostic to the specific formula; workers share the
/// evaluator read-only, hence the `Send + Sync` bound.
pub trait FractalEvaluator: Send + Sync {
    /// Iterate a single point of the complex plane and classify it.
    fn evaluate(&self, c: Complex) -> EscapeResult;

    /// Access the iteration parameters.
    fn params(&self) -> &IterParams;
}
