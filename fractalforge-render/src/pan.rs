//! Pan-reuse planning: pure geometry, no pixel evaluation.
//!
//! After a directional pan most previously rendered pixels are still valid
//! at a translated location; only the newly exposed edge strips need fresh
//! evaluation. `plan_pan` partitions the frame accordingly; the caller
//! shifts the old buffer and feeds the exposed regions to the render
//! engine as work.

use crate::band::Region;

/// The outcome of planning a pan of `(dx, dy)` pixels.
///
/// Coordinates follow [`EscapeBuffer::shift`](crate::EscapeBuffer::shift):
/// `dx > 0` means the old content moves right within the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanPlan {
    /// Where the surviving old content lands in the new frame, or `None`
    /// when the shift is at least a full frame in either axis.
    pub reusable: Option<Region>,
    /// The exposed strips requiring fresh evaluation: one vertical
    /// (full height) and/or one horizontal (excluding the corner overlap),
    /// or a single full-frame region when nothing is reusable.
    pub exposed: Vec<Region>,
}

/// Partition a `width × height` frame after a content shift of `(dx, dy)`.
pub fn plan_pan(width: u32, height: u32, dx: i32, dy: i32) -> PanPlan {
    let w = width as i64;
    let h = height as i64;
    let adx = dx.unsigned_abs() as i64;
    let ady = dy.unsigned_abs() as i64;

    if adx >= w || ady >= h {
        // Nothing survives: full re-render.
        return PanPlan {
            reusable: None,
            exposed: vec![Region::full(width, height)],
        };
    }

    if dx == 0 && dy == 0 {
        // No movement: whole frame is reusable, nothing exposed.
        return PanPlan {
            reusable: Some(Region::full(width, height)),
            exposed: Vec::new(),
        };
    }

    let keep_w = (w - adx) as u32;
    let keep_h = (h - ady) as u32;
    let keep_x = dx.max(0) as u32;
    let keep_y = dy.max(0) as u32;

    let reusable = Region {
        x: keep_x,
        y: keep_y,
        width: keep_w,
        height: keep_h,
    };

    let mut exposed = Vec::with_capacity(2);

    // Vertical strip on the side the content moved away from, full height.
    if dx != 0 {
        let strip_x = if dx > 0 { 0 } else { keep_w };
        exposed.push(Region {
            x: strip_x,
            y: 0,
            width: adx as u32,
            height,
        });
    }

    // Horizontal strip over the reusable columns only, so the two strips
    // never overlap in the corner.
    if dy != 0 {
        let strip_y = if dy > 0 { 0 } else { keep_h };
        exposed.push(Region {
            x: keep_x,
            y: strip_y,
            width: keep_w,
            height: ady as u32,
        });
    }

    PanPlan {
        reusable: Some(reusable),
        exposed,
    }
}
