/// How many work units each worker should see on average.
///
/// Several units per worker lets the shared queue rebalance when some
/// screen regions iterate far deeper than others (boundary zooms).
pub const UNITS_PER_WORKER: usize = 4;

/// A rectangular pixel region within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Pixel x of the top-left corner.
    pub x: u32,
    /// Pixel y of the top-left corner.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Number of pixels in this region.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Split a region into at most `unit_count` horizontal bands of
/// near-equal height.
///
/// Bands cover the region exactly with no overlap. Regions shorter than
/// `unit_count` rows yield one band per row.
pub fn build_bands(region: Region, unit_count: usize) -> Vec<Region> {
    if region.is_empty() {
        return Vec::new();
    }
    let count = unit_count.max(1).min(region.height as usize) as u32;
    let base = region.height / count;
    let remainder = region.height % count;

    let mut bands = Vec::with_capacity(count as usize);
    let mut y = region.y;
    for i in 0..count {
        // The first `remainder` bands absorb the leftover rows.
        let h = base + u32::from(i < remainder);
        bands.push(Region {
            x: region.x,
            y,
            width: region.width,
            height: h,
        });
        y += h;
    }
    bands
}
