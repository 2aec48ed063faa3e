use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use fractalforge_core::{EscapeResult, FractalEvaluator, IterParams, ParamSet, Viewport};

use crate::band::{build_bands, Region, UNITS_PER_WORKER};
use crate::error::RenderError;
use crate::escape_buffer::EscapeBuffer;
use crate::palette::{ColorParams, Palette};
use crate::pan::plan_pan;
use crate::pixel_buffer::PixelBuffer;

// ---------------------------------------------------------------------------
// Configuration & requests
// ---------------------------------------------------------------------------

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Worker thread count; `None` = available cores minus one (UI headroom).
    pub threads: Option<usize>,
    /// Work units per worker per job; more units = finer load balancing.
    pub units_per_worker: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            units_per_worker: UNITS_PER_WORKER,
        }
    }
}

/// A previously rendered escape buffer plus the content shift that maps it
/// into the new frame, in final-resolution pixels.
pub struct PanSeed {
    pub escape: EscapeBuffer,
    pub dx: i32,
    pub dy: i32,
}

/// Immutable description of one rendering job.
pub struct RenderRequest {
    pub viewport: Viewport,
    pub fractal_id: String,
    pub params: ParamSet,
    pub iter: IterParams,
    pub palette_id: String,
    pub color: ColorParams,
    /// Supersampling factor, 1 = off. Pixels are evaluated on a
    /// `factor × factor` subgrid and box-filtered down.
    pub supersample: u32,
    /// Optional pan-reuse seed; ignored when dimensions or supersampling
    /// no longer match.
    pub seed: Option<PanSeed>,
}

/// Progress observer, called once per completed work unit with
/// `(completed_units, total_units)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

// ---------------------------------------------------------------------------
// Job handle & outcome
// ---------------------------------------------------------------------------

/// A completed frame: raw escape data plus the colored pixels.
pub struct Frame {
    /// Escape data at render (supersampled) resolution; doubles as the
    /// pan-reuse seed for the next frame.
    pub escape: EscapeBuffer,
    /// The supersampling factor `escape` was rendered at.
    pub supersample: u32,
    /// Colored pixels at final resolution.
    pub pixels: PixelBuffer,
    pub generation: u64,
    pub elapsed: Duration,
    pub bands_computed: usize,
    pub pixels_reused: usize,
}

/// How a job resolved. A handle resolves exactly once.
pub enum JobOutcome {
    Completed(Box<Frame>),
    /// Cancelled or superseded by a newer job. Not an error.
    Cancelled,
}

/// Handle to an in-flight render job.
pub struct JobHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    rx: mpsc::Receiver<JobOutcome>,
}

impl JobHandle {
    /// The job-generation token this handle was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request cancellation: not-yet-started units are skipped, in-flight
    /// units finish but their output is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Poll for the outcome without blocking. Returns `Some` exactly once.
    pub fn try_outcome(&mut self) -> Option<JobOutcome> {
        self.rx.try_recv().ok()
    }

    /// Block until the job resolves.
    pub fn wait(self) -> JobOutcome {
        self.rx.recv().unwrap_or(JobOutcome::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Parallel chunked render engine.
///
/// Work units (row bands) are pulled from the pool's shared work queue so
/// slow bands never stall fast ones. A monotonically increasing generation
/// counter orders jobs: a completed frame is published only when its
/// generation is still the latest, so a slow superseded job can never
/// overwrite the result of a job submitted after it.
pub struct RenderEngine {
    pool: rayon::ThreadPool,
    workers: usize,
    units_per_worker: usize,
    latest: Arc<AtomicU64>,
}

impl RenderEngine {
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        let workers = config.threads.unwrap_or_else(default_worker_count).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("forge-render-{i}"))
            .build()
            .map_err(|e| RenderError::ThreadPool(e.to_string()))?;
        debug!(workers, "Render engine started");
        Ok(Self {
            pool,
            workers,
            units_per_worker: config.units_per_worker.max(1),
            latest: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The most recently issued job generation.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Decompose `request` into work units and dispatch them across the
    /// worker pool. Returns immediately with a handle; the caller polls or
    /// waits for the outcome.
    ///
    /// Submitting a new job supersedes all earlier ones: their results are
    /// discarded even if their pixels were already computed.
    pub fn submit(
        &self,
        request: RenderRequest,
        evaluator: Arc<dyn FractalEvaluator>,
        palette: Palette,
        progress: Option<ProgressFn>,
    ) -> crate::Result<JobHandle> {
        if request.supersample == 0 || request.supersample > 8 {
            return Err(RenderError::InvalidSupersample(request.supersample));
        }

        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let latest = Arc::clone(&self.latest);
        let cancel_flag = Arc::clone(&cancelled);
        let unit_target = self.workers * self.units_per_worker;

        debug!(
            generation,
            fractal = %request.fractal_id,
            width = request.viewport.width,
            height = request.viewport.height,
            supersample = request.supersample,
            "Submitting render job"
        );

        self.pool.spawn(move || {
            let outcome = run_job(
                request,
                evaluator.as_ref(),
                &palette,
                generation,
                &latest,
                &cancel_flag,
                progress.as_deref(),
                unit_target,
            );
            // The handle may already be dropped; that is fine.
            let _ = tx.send(outcome);
        });

        Ok(JobHandle {
            generation,
            cancelled,
            rx,
        })
    }
}

/// Available cores minus one, keeping a core free for the UI thread.
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

// ---------------------------------------------------------------------------
// Job execution
// ---------------------------------------------------------------------------

/// Evaluate every pixel of a band.
///
/// A non-finite escape magnitude from the evaluator is mapped to the
/// interior sentinel here, so a single bad pixel never aborts the job.
fn compute_band(
    evaluator: &dyn FractalEvaluator,
    viewport: &Viewport,
    band: &Region,
) -> Vec<EscapeResult> {
    let mut data = Vec::with_capacity(band.pixel_count());
    for py in band.y..band.y + band.height {
        for px in band.x..band.x + band.width {
            let c = viewport.pixel_to_complex(px, py);
            let result = match evaluator.evaluate(c) {
                EscapeResult::Escaped { norm_sq, .. } if !norm_sq.is_finite() => {
                    EscapeResult::Interior
                }
                other => other,
            };
            data.push(result);
        }
    }
    data
}

/// Distribute `unit_target` bands across the regions in proportion to area.
fn bands_for_regions(regions: &[Region], unit_target: usize) -> Vec<Region> {
    let total_area: usize = regions.iter().map(|r| r.pixel_count()).sum();
    if total_area == 0 {
        return Vec::new();
    }
    let mut bands = Vec::new();
    for region in regions {
        let share = region.pixel_count() as f64 / total_area as f64;
        let units = ((unit_target as f64 * share).round() as usize).max(1);
        bands.extend(build_bands(*region, units));
    }
    bands
}

#[allow(clippy::too_many_arguments)]
fn run_job(
    request: RenderRequest,
    evaluator: &dyn FractalEvaluator,
    palette: &Palette,
    generation: u64,
    latest: &AtomicU64,
    cancelled: &AtomicBool,
    progress: Option<&(dyn Fn(usize, usize) + Send + Sync)>,
    unit_target: usize,
) -> JobOutcome {
    let start = Instant::now();
    let ss = request.supersample;
    let render_vp = request.viewport.supersampled(ss);

    let superseded = || cancelled.load(Ordering::SeqCst) || latest.load(Ordering::SeqCst) != generation;

    // Seed the frame from the previous buffer when the pan plan says any
    // of it survives; otherwise start blank and compute everything.
    let mut escape = EscapeBuffer::new(render_vp.width, render_vp.height, request.iter.max_iterations);
    let mut pixels_reused = 0usize;
    let mut regions = vec![Region::full(render_vp.width, render_vp.height)];

    if let Some(seed) = request.seed {
        let sdx = seed.dx.saturating_mul(ss as i32);
        let sdy = seed.dy.saturating_mul(ss as i32);
        let compatible = seed.escape.width == render_vp.width
            && seed.escape.height == render_vp.height
            && seed.escape.max_iterations == request.iter.max_iterations;
        if compatible {
            let plan = plan_pan(render_vp.width, render_vp.height, sdx, sdy);
            if let Some(reusable) = plan.reusable {
                let mut shifted = seed.escape;
                shifted.shift(sdx, sdy);
                escape = shifted;
                pixels_reused = reusable.pixel_count();
                regions = plan.exposed;
            }
        }
    }

    let bands = bands_for_regions(&regions, unit_target);
    let total = bands.len();
    let done = AtomicUsize::new(0);
    debug!(generation, bands = total, pixels_reused, "Starting banded render");

    // A zero-shift seed reuses everything and leaves no bands to compute;
    // observers still expect the terminal update.
    if total == 0 {
        if let Some(report) = progress {
            report(0, 0);
        }
    }

    let results: Vec<Option<(Region, Vec<EscapeResult>)>> = bands
        .par_iter()
        .map(|band| {
            if superseded() {
                return None;
            }
            let data = compute_band(evaluator, &render_vp, band);
            let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(report) = progress {
                report(completed, total);
            }
            Some((*band, data))
        })
        .collect();

    if superseded() || results.iter().any(Option::is_none) {
        info!(generation, "Render cancelled");
        return JobOutcome::Cancelled;
    }

    let bands_computed = results.len();
    for (band, data) in results.into_iter().flatten() {
        escape.blit_region(&band, &data);
    }

    // Color at render resolution, then box-filter down to final size.
    let pixels = palette.colorize(&escape, &request.color).downsampled(ss);

    let elapsed = start.elapsed();
    info!(
        generation,
        elapsed_ms = elapsed.as_millis() as u64,
        bands_computed,
        pixels_reused,
        "Render complete"
    );

    JobOutcome::Completed(Box::new(Frame {
        escape,
        supersample: ss,
        pixels,
        generation,
        elapsed,
        bands_computed,
        pixels_reused,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalforge_core::{fractals::Mandelbrot, Complex};
    use crate::palette::builtin_palettes;

    fn engine() -> RenderEngine {
        RenderEngine::new(EngineConfig {
            threads: Some(2),
            units_per_worker: 4,
        })
        .unwrap()
    }

    fn mandelbrot_request(width: u32, height: u32) -> RenderRequest {
        RenderRequest {
            viewport: Viewport::from_region(Complex::new(-0.75, 0.0), 3.6, 2.6, width, height)
                .unwrap(),
            fractal_id: "mandelbrot".into(),
            params: ParamSet::new(),
            iter: IterParams::default(),
            palette_id: "classic".into(),
            color: ColorParams::default(),
            supersample: 1,
            seed: None,
        }
    }

    fn classic() -> Palette {
        builtin_palettes().into_iter().next().unwrap()
    }

    #[test]
    fn basic_render_completes() {
        let engine = engine();
        let evaluator: Arc<dyn FractalEvaluator> = Arc::new(Mandelbrot::default());
        let handle = engine
            .submit(mandelbrot_request(96, 64), evaluator, classic(), None)
            .unwrap();

        match handle.wait() {
            JobOutcome::Completed(frame) => {
                assert_eq!(frame.escape.data.len(), 96 * 64);
                assert_eq!(frame.pixels.width, 96);
                assert_eq!(frame.pixels.height, 64);
                assert!(frame.bands_computed > 0);
                assert_eq!(frame.generation, 1);
            }
            JobOutcome::Cancelled => panic!("uncontested job must complete"),
        }
    }

    #[test]
    fn invalid_supersample_rejected() {
        let engine = engine();
        let mut request = mandelbrot_request(32, 32);
        request.supersample = 0;
        let evaluator: Arc<dyn FractalEvaluator> = Arc::new(Mandelbrot::default());
        assert!(matches!(
            engine.submit(request, evaluator, classic(), None),
            Err(RenderError::InvalidSupersample(0))
        ));
    }

    #[test]
    fn supersampled_render_downsamples_to_final_size() {
        let engine = engine();
        let mut request = mandelbrot_request(40, 30);
        request.supersample = 2;
        let evaluator: Arc<dyn FractalEvaluator> = Arc::new(Mandelbrot::default());
        let handle = engine.submit(request, evaluator, classic(), None).unwrap();

        match handle.wait() {
            JobOutcome::Completed(frame) => {
                assert_eq!(frame.escape.width, 80);
                assert_eq!(frame.escape.height, 60);
                assert_eq!(frame.pixels.width, 40);
                assert_eq!(frame.pixels.height, 30);
                assert_eq!(frame.supersample, 2);
            }
            JobOutcome::Cancelled => panic!("uncontested job must complete"),
        }
    }

    #[test]
    fn generations_increase_monotonically() {
        let engine = engine();
        let evaluator: Arc<dyn FractalEvaluator> = Arc::new(Mandelbrot::default());
        let h1 = engine
            .submit(mandelbrot_request(16, 16), Arc::clone(&evaluator), classic(), None)
            .unwrap();
        let h2 = engine
            .submit(mandelbrot_request(16, 16), evaluator, classic(), None)
            .unwrap();
        assert!(h2.generation() > h1.generation());
        assert_eq!(engine.latest_generation(), h2.generation());
    }
}
