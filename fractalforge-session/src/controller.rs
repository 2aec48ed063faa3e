use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use fractalforge_core::{
    FractalEvaluator, FractalRegistry, IterParams,
};
use fractalforge_render::{
    ColorParams, EngineConfig, Frame, JobHandle, JobOutcome, PaletteRegistry, PanSeed, ProgressFn,
    RenderEngine, RenderError, RenderRequest,
};

use crate::session::{FractalSession, SessionState};

pub const DEFAULT_FRACTAL: &str = "mandelbrot";
pub const DEFAULT_PALETTE: &str = "classic";

/// Render lifecycle state as seen by the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rendering,
    Completed,
    Cancelled,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Rendering => "Rendering\u{2026}",
            Self::Completed => "Done",
            Self::Cancelled => "Render superseded",
        }
    }
}

/// Orchestrates engine invocation, cancellation of stale jobs, and frame
/// publication.
///
/// Single-threaded by design: all session state lives here and every
/// mutation happens on the owning thread. The engine runs jobs on its own
/// pool; `tick()` polls for outcomes without ever blocking.
///
/// Pan reuse is tracked as two content offsets. `display_offset` maps the
/// published frame onto the current viewport and is what seeds a job, so
/// it stays correct no matter how many intermediate jobs were cancelled
/// before publishing. `since_submit` maps the active job's viewport onto
/// the current one; when that job publishes it becomes the new
/// `display_offset`. Any non-pan mutation clears both: the view is no
/// longer a pure translation of anything rendered.
pub struct RenderController {
    engine: RenderEngine,
    registry: FractalRegistry,
    palettes: PaletteRegistry,
    sessions: SessionState,
    active_fractal: String,
    width: u32,
    height: u32,
    supersample: u32,
    color: ColorParams,
    phase: Phase,
    active: Option<JobHandle>,
    /// A render of the latest session state is wanted; rapid successive
    /// mutations collapse into one submission.
    pending: bool,
    display: Option<Frame>,
    /// Content shift mapping `display` onto the current viewport.
    display_offset: Option<(i32, i32)>,
    /// Content shift mapping the active job's viewport onto the current one.
    since_submit: Option<(i32, i32)>,
    progress: Arc<(AtomicUsize, AtomicUsize)>,
    last_error: Option<String>,
}

impl RenderController {
    /// Build a controller with the built-in fractal and palette registries,
    /// an initial Mandelbrot session, and a queued first render.
    pub fn new(config: EngineConfig, width: u32, height: u32) -> fractalforge_render::Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let mut controller = Self {
            engine: RenderEngine::new(config)?,
            registry: FractalRegistry::with_builtins(),
            palettes: PaletteRegistry::with_builtins(),
            sessions: SessionState::new(),
            active_fractal: DEFAULT_FRACTAL.to_string(),
            width,
            height,
            supersample: 1,
            color: ColorParams::default(),
            phase: Phase::Idle,
            active: None,
            pending: false,
            display: None,
            display_offset: None,
            since_submit: None,
            progress: Arc::new((AtomicUsize::new(0), AtomicUsize::new(0))),
            last_error: None,
        };
        controller.select_fractal(DEFAULT_FRACTAL)?;
        Ok(controller)
    }

    // -- accessors ---------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The authoritative published frame, if any.
    pub fn display(&self) -> Option<&Frame> {
        self.display.as_ref()
    }

    /// Current render progress as `(completed_units, total_units)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress.0.load(Ordering::Relaxed),
            self.progress.1.load(Ordering::Relaxed),
        )
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn active_fractal(&self) -> &str {
        &self.active_fractal
    }

    pub fn current_session(&self) -> Option<&FractalSession> {
        self.sessions.get(&self.active_fractal)
    }

    pub fn registry(&self) -> &FractalRegistry {
        &self.registry
    }

    pub fn latest_generation(&self) -> u64 {
        self.engine.latest_generation()
    }

    // -- mutations ---------------------------------------------------------

    /// Switch the active fractal, lazily creating its session from
    /// registry defaults. Histories stay independent per fractal.
    pub fn select_fractal(&mut self, id: &str) -> fractalforge_core::Result<()> {
        self.registry.descriptor(id)?;
        self.active_fractal = id.to_string();
        let (width, height) = (self.width, self.height);
        let session = self.active_session()?;
        if session.viewport.width != width || session.viewport.height != height {
            session.viewport = session.viewport.resized(width, height)?;
        }
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Pan the view by a pixel delta; surviving pixels of the published
    /// frame are reused when the render starts.
    pub fn pan(&mut self, dx: i32, dy: i32) -> fractalforge_core::Result<()> {
        let session = self.active_session()?;
        session.viewport.pan(dx, dy);
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.note_pan(dx, dy);
        self.queue_render();
        Ok(())
    }

    /// Zoom keeping the point under `(px, py)` fixed; `factor < 1` zooms in.
    pub fn zoom_at(&mut self, px: u32, py: u32, factor: f64) -> fractalforge_core::Result<()> {
        let session = self.active_session()?;
        session.viewport.zoom_at(px, py, factor)?;
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) -> fractalforge_core::Result<()> {
        let session = self.active_session()?;
        session.iter = IterParams::new(max_iterations, session.iter.escape_radius)?;
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Set a formula parameter (e.g. `julia_re`) for the active fractal.
    pub fn set_param(&mut self, name: &str, value: f64) -> fractalforge_core::Result<()> {
        let session = self.active_session()?;
        session.params.insert(name.to_string(), value);
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Switch palettes. Recolors the published frame in place when one
    /// exists; no re-iteration needed.
    pub fn set_palette(&mut self, id: &str) -> fractalforge_render::Result<()> {
        let palette = self.palettes.get(id)?.clone();
        let session = self.active_session()?;
        session.palette_id = id.to_string();
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        if let Some(frame) = &mut self.display {
            frame.pixels = palette
                .colorize(&frame.escape, &self.color)
                .downsampled(frame.supersample);
        } else {
            self.queue_render();
        }
        Ok(())
    }

    /// Set the supersampling factor for subsequent renders.
    pub fn set_supersample(&mut self, factor: u32) -> fractalforge_render::Result<()> {
        if factor == 0 || factor > 8 {
            return Err(RenderError::InvalidSupersample(factor));
        }
        self.supersample = factor;
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Step back in the active fractal's history. Returns `false` (no-op)
    /// when already at the oldest snapshot.
    pub fn undo(&mut self) -> fractalforge_core::Result<bool> {
        let session = self.active_session()?;
        let Some(snapshot) = session.history.undo().cloned() else {
            return Ok(false);
        };
        session.restore(&snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(true)
    }

    /// Step forward in the active fractal's history. Returns `false`
    /// (no-op) when already at the newest snapshot.
    pub fn redo(&mut self) -> fractalforge_core::Result<bool> {
        let session = self.active_session()?;
        let Some(snapshot) = session.history.redo().cloned() else {
            return Ok(false);
        };
        session.restore(&snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(true)
    }

    /// Jump to an explicit complex-plane region (bookmark restore).
    pub fn set_region(
        &mut self,
        center: fractalforge_core::Complex,
        re_span: f64,
        im_span: f64,
    ) -> fractalforge_core::Result<()> {
        let (width, height) = (self.width, self.height);
        let session = self.active_session()?;
        session.viewport =
            fractalforge_core::Viewport::from_region(center, re_span, im_span, width, height)?;
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Reset the active fractal to its registry default region.
    pub fn reset_view(&mut self) -> fractalforge_core::Result<()> {
        let region = self.registry.descriptor(&self.active_fractal)?.region;
        let (width, height) = (self.width, self.height);
        let session = self.active_session()?;
        session.viewport = fractalforge_core::Viewport::from_region(
            region.center,
            region.re_span,
            region.im_span,
            width,
            height,
        )?;
        let snapshot = session.snapshot();
        session.history.push(snapshot);
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Resize the frame, keeping center and scale.
    pub fn resize(&mut self, width: u32, height: u32) -> fractalforge_core::Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let session = self.active_session()?;
        session.viewport = session.viewport.resized(width, height)?;
        self.width = width;
        self.height = height;
        self.invalidate_reuse();
        self.queue_render();
        Ok(())
    }

    /// Explicitly request a full re-render of the current state.
    pub fn submit_render(&mut self) {
        self.invalidate_reuse();
        self.queue_render();
    }

    /// Cancel the in-flight render (if any) and drop pending work.
    pub fn cancel_render(&mut self) {
        if let Some(handle) = &self.active {
            handle.cancel();
            info!("Render cancelled by user");
        }
        self.pending = false;
        self.phase = Phase::Cancelled;
    }

    // -- pump --------------------------------------------------------------

    /// Pump the state machine: poll the active job, publish a completed
    /// frame, and submit coalesced pending work. Never blocks.
    ///
    /// Returns `true` when the display buffer was replaced.
    pub fn tick(&mut self) -> bool {
        let mut updated = false;

        if let Some(mut handle) = self.active.take() {
            match handle.try_outcome() {
                None => {
                    // Still rendering.
                    self.active = Some(handle);
                }
                Some(JobOutcome::Completed(frame)) => {
                    // Publish only results from the most recent job; a slow
                    // superseded job can never overwrite a newer frame.
                    if frame.generation == self.engine.latest_generation() {
                        info!(
                            generation = frame.generation,
                            elapsed_ms = frame.elapsed.as_millis() as u64,
                            pixels_reused = frame.pixels_reused,
                            "Publishing frame"
                        );
                        self.display = Some(*frame);
                        // The published frame matches the viewport at submit
                        // time; pans made while it rendered carry over.
                        self.display_offset = self.since_submit;
                        self.phase = Phase::Completed;
                        self.progress.0.store(0, Ordering::Relaxed);
                        self.progress.1.store(0, Ordering::Relaxed);
                        updated = true;
                    } else {
                        debug!(generation = frame.generation, "Discarding stale frame");
                    }
                }
                Some(JobOutcome::Cancelled) => {
                    if !self.pending {
                        self.phase = Phase::Cancelled;
                    }
                }
            }
        }

        if self.active.is_none() && self.pending {
            self.pending = false;
            if let Err(e) = self.start_job() {
                warn!(error = %e, "Failed to start render job");
                self.last_error = Some(e.to_string());
                // Revert to the last successfully published buffer.
                self.phase = if self.display.is_some() {
                    Phase::Completed
                } else {
                    Phase::Idle
                };
            }
        }

        updated
    }

    // -- internals ---------------------------------------------------------

    fn active_session(&mut self) -> fractalforge_core::Result<&mut FractalSession> {
        self.sessions.session_mut(
            &self.active_fractal,
            &self.registry,
            self.width,
            self.height,
            DEFAULT_PALETTE,
        )
    }

    /// Record a render request for the current state, cancelling any job in
    /// flight. Consecutive calls coalesce: only the latest state renders.
    fn queue_render(&mut self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
        self.pending = true;
    }

    /// The view panned by `(dx, dy)`; rendered content shifts the other way.
    fn note_pan(&mut self, dx: i32, dy: i32) {
        self.display_offset = self.display_offset.map(|(ax, ay)| (ax - dx, ay - dy));
        self.since_submit = self.since_submit.map(|(ax, ay)| (ax - dx, ay - dy));
    }

    /// The current view is no longer a pure translation of any rendered
    /// frame; nothing can be reused until the next publish.
    fn invalidate_reuse(&mut self) {
        self.display_offset = None;
        self.since_submit = None;
    }

    fn start_job(&mut self) -> fractalforge_render::Result<()> {
        let supersample = self.supersample;
        let snapshot = self.active_session()?.snapshot();

        // Seed against the published frame, not the last queued state:
        // `display_offset` already accounts for jobs cancelled in between.
        let seed = self.display_offset.and_then(|(dx, dy)| {
            self.display
                .as_ref()
                .filter(|frame| frame.supersample == supersample)
                .map(|frame| PanSeed {
                    escape: frame.escape.clone(),
                    dx,
                    dy,
                })
        });

        let evaluator: Arc<dyn FractalEvaluator> = Arc::from(self.registry.build_evaluator(
            &self.active_fractal,
            &snapshot.params,
            snapshot.iter,
        )?);
        let palette = self.palettes.get(&snapshot.palette_id)?.clone();

        let request = RenderRequest {
            viewport: snapshot.viewport,
            fractal_id: self.active_fractal.clone(),
            params: snapshot.params,
            iter: snapshot.iter,
            palette_id: snapshot.palette_id,
            color: self.color,
            supersample,
            seed,
        };

        let counters = Arc::clone(&self.progress);
        let progress: ProgressFn = Arc::new(move |done, total| {
            counters.0.store(done, Ordering::Relaxed);
            counters.1.store(total, Ordering::Relaxed);
        });

        let handle = self.engine.submit(request, evaluator, palette, Some(progress))?;
        debug!(generation = handle.generation(), fractal = %self.active_fractal, "Job started");
        self.active = Some(handle);
        self.since_submit = Some((0, 0));
        self.phase = Phase::Rendering;
        Ok(())
    }
}
