use fractalforge_core::EscapeResult;

use crate::band::Region;

/// Stores per-pixel [`EscapeResult`] data for a full frame.
///
/// This is the raw output of the renderer before coloring. Keeping escape
/// data separate from colored pixels enables instant palette switching
/// without re-computing iterations, and is what pan-reuse shifts around.
#[derive(Clone)]
pub struct EscapeBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub data: Vec<EscapeResult>,
}

impl EscapeBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![EscapeResult::Interior; size],
        }
    }

    /// Copy band escape data into the matching region of the buffer.
    ///
    /// `band_data` is row-major with the band's own width as stride.
    pub fn blit_region(&mut self, region: &Region, band_data: &[EscapeResult]) {
        debug_assert_eq!(band_data.len(), region.pixel_count());
        for row in 0..region.height {
            let buf_y = region.y + row;
            if buf_y >= self.height {
                break;
            }
            let dst_start = (buf_y * self.width + region.x) as usize;
            let src_start = (row * region.width) as usize;
            let copy_w = region.width.min(self.width - region.x) as usize;
            self.data[dst_start..dst_start + copy_w]
                .copy_from_slice(&band_data[src_start..src_start + copy_w]);
        }
    }

    /// Shift the buffer content by a pixel offset, preserving overlapping
    /// data.
    ///
    /// `dx > 0` means content moves right (left edge exposed).
    /// `dy > 0` means content moves down (top edge exposed).
    /// Exposed regions are filled with `Interior` until recomputed.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let w = self.width as i32;
        let h = self.height as i32;
        let mut new_data = vec![EscapeResult::Interior; self.data.len()];

        let x_start = dx.clamp(0, w) as usize;
        let x_end = (w + dx).clamp(0, w) as usize;
        if x_start < x_end {
            let count = x_end - x_start;
            let src_x_start = (x_start as i32 - dx) as usize;

            for dst_y in 0..h as usize {
                let src_y = dst_y as i32 - dy;
                if src_y < 0 || src_y >= h {
                    continue;
                }
                let dst_row = dst_y * self.width as usize;
                let src_row = src_y as usize * self.width as usize;
                new_data[dst_row + x_start..dst_row + x_end].copy_from_slice(
                    &self.data[src_row + src_x_start..src_row + src_x_start + count],
                );
            }
        }

        self.data = new_data;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> EscapeResult {
        self.data[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(n: u32) -> EscapeResult {
        EscapeResult::Escaped {
            iterations: n,
            norm_sq: 5.0,
        }
    }

    /// A buffer whose every pixel encodes its own (x, y) position.
    fn tagged(width: u32, height: u32) -> EscapeBuffer {
        let mut buf = EscapeBuffer::new(width, height, 100);
        for y in 0..height {
            for x in 0..width {
                buf.data[(y * width + x) as usize] = escaped(y * width + x);
            }
        }
        buf
    }

    #[test]
    fn blit_region_writes_in_place() {
        let mut buf = EscapeBuffer::new(8, 8, 100);
        let region = Region {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };
        let data = vec![escaped(7); region.pixel_count()];
        buf.blit_region(&region, &data);

        assert_eq!(buf.get(2, 3), escaped(7));
        assert_eq!(buf.get(5, 4), escaped(7));
        assert_eq!(buf.get(1, 3), EscapeResult::Interior);
        assert_eq!(buf.get(2, 5), EscapeResult::Interior);
    }

    #[test]
    fn shift_right_down_preserves_overlap() {
        let mut buf = tagged(6, 5);
        buf.shift(2, 1);

        // Content at (x, y) came from (x−2, y−1).
        assert_eq!(buf.get(2, 1), escaped(0));
        assert_eq!(buf.get(5, 4), escaped(3 * 6 + 3));

        // Exposed left strip and top row are interior.
        assert_eq!(buf.get(0, 3), EscapeResult::Interior);
        assert_eq!(buf.get(1, 3), EscapeResult::Interior);
        assert_eq!(buf.get(4, 0), EscapeResult::Interior);
    }

    #[test]
    fn shift_left_up() {
        let mut buf = tagged(6, 5);
        buf.shift(-1, -2);

        assert_eq!(buf.get(0, 0), escaped(2 * 6 + 1));
        assert_eq!(buf.get(4, 2), escaped(4 * 6 + 5));
        assert_eq!(buf.get(5, 0), EscapeResult::Interior);
        assert_eq!(buf.get(2, 3), EscapeResult::Interior);
    }

    #[test]
    fn shift_entire_width_clears_buffer() {
        let mut buf = tagged(4, 4);
        buf.shift(4, 0);
        assert!(buf.data.iter().all(|&r| r == EscapeResult::Interior));

        let mut buf = tagged(4, 4);
        buf.shift(0, -7);
        assert!(buf.data.iter().all(|&r| r == EscapeResult::Interior));
    }

    #[test]
    fn zero_shift_is_noop() {
        let mut buf = tagged(4, 4);
        let before = buf.data.clone();
        buf.shift(0, 0);
        assert_eq!(buf.data, before);
    }
}
