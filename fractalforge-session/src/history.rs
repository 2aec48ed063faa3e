use serde::{Deserialize, Serialize};

use fractalforge_core::{IterParams, ParamSet, Viewport};

/// A full view snapshot, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub viewport: Viewport,
    pub iter: IterParams,
    pub palette_id: String,
    pub params: ParamSet,
}

/// Bounded linear undo/redo history of view snapshots.
///
/// The cursor points at the current snapshot. Pushing while undone
/// truncates the redo branch; identical consecutive snapshots are
/// deduplicated; beyond capacity the oldest entries are evicted first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewHistory {
    entries: Vec<ViewSnapshot>,
    cursor: usize,
    capacity: usize,
}

impl ViewHistory {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// The snapshot the cursor currently points at.
    pub fn current(&self) -> Option<&ViewSnapshot> {
        self.entries.get(self.cursor)
    }

    /// Append a snapshot, discarding any redo branch.
    ///
    /// A snapshot identical to the current one is a no-op, so a no-op
    /// pan/zoom gesture does not pollute history.
    pub fn push(&mut self, snapshot: ViewSnapshot) {
        if self.current() == Some(&snapshot) {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one snapshot; `None` at the oldest entry (no-op).
    pub fn undo(&mut self) -> Option<&ViewSnapshot> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot; `None` at the newest entry (no-op).
    pub fn redo(&mut self) -> Option<&ViewSnapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ViewHistory {
    fn default() -> Self {
        Self::new()
    }
}
