use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fractalforge_core::{FractalRegistry, IterParams, ParamSet, Viewport};

use crate::history::{ViewHistory, ViewSnapshot};

/// Per-fractal view state plus its independent undo/redo history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FractalSession {
    pub viewport: Viewport,
    pub iter: IterParams,
    pub palette_id: String,
    pub params: ParamSet,
    pub history: ViewHistory,
}

impl FractalSession {
    /// The current state as a full snapshot.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            viewport: self.viewport,
            iter: self.iter,
            palette_id: self.palette_id.clone(),
            params: self.params.clone(),
        }
    }

    /// Replace the current state from a snapshot (undo/redo restore).
    pub fn restore(&mut self, snapshot: &ViewSnapshot) {
        self.viewport = snapshot.viewport;
        self.iter = snapshot.iter;
        self.palette_id = snapshot.palette_id.clone();
        self.params = snapshot.params.clone();
    }
}

/// All per-fractal sessions, keyed by fractal id.
///
/// Sessions are created lazily on first selection of a fractal id, seeded
/// from the registry's defaults for that fractal; switching ids never
/// cross-contaminates view state or history. Serializable as a whole for
/// the persistence boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    sessions: BTreeMap<String, FractalSession>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for `fractal_id`, creating it from registry
    /// defaults at the given frame size if this is the first visit.
    pub fn session_mut(
        &mut self,
        fractal_id: &str,
        registry: &FractalRegistry,
        width: u32,
        height: u32,
        default_palette: &str,
    ) -> fractalforge_core::Result<&mut FractalSession> {
        if !self.sessions.contains_key(fractal_id) {
            let descriptor = registry.descriptor(fractal_id)?;
            let region = descriptor.region;
            let viewport =
                Viewport::from_region(region.center, region.re_span, region.im_span, width, height)?;
            let iter = IterParams::default().with_max_iterations(descriptor.max_iterations);
            let mut session = FractalSession {
                viewport,
                iter,
                palette_id: default_palette.to_string(),
                params: descriptor.param_set(),
                history: ViewHistory::new(),
            };
            session.history.push(session.snapshot());
            debug!(fractal = fractal_id, "Created session");
            self.sessions.insert(fractal_id.to_string(), session);
        }
        // The entry is guaranteed present; descriptor lookup above is the
        // only fallible path.
        self.sessions
            .get_mut(fractal_id)
            .ok_or_else(|| fractalforge_core::CoreError::UnknownFractal(fractal_id.to_string()))
    }

    pub fn get(&self, fractal_id: &str) -> Option<&FractalSession> {
        self.sessions.get(fractal_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }
}
