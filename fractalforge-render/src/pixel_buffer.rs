/// An RGBA pixel buffer representing a rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer filled with black (opaque).
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        // Set alpha to 255 for all pixels.
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Box-filter the buffer down by an integer factor.
    ///
    /// Each output pixel is the channel-wise mean of a `factor × factor`
    /// block. Dimensions must be exact multiples of `factor`; a factor of
    /// 1 returns the buffer unchanged.
    pub fn downsampled(self, factor: u32) -> Self {
        if factor <= 1 {
            return self;
        }
        debug_assert_eq!(self.width % factor, 0);
        debug_assert_eq!(self.height % factor, 0);

        let out_w = self.width / factor;
        let out_h = self.height / factor;
        let samples = (factor * factor) as u32;
        let mut out = vec![0u8; out_w as usize * out_h as usize * 4];

        for oy in 0..out_h {
            for ox in 0..out_w {
                let mut acc = [0u32; 4];
                for sy in 0..factor {
                    for sx in 0..factor {
                        let px = self.get(ox * factor + sx, oy * factor + sy);
                        for ch in 0..4 {
                            acc[ch] += px[ch] as u32;
                        }
                    }
                }
                let idx = ((oy * out_w + ox) * 4) as usize;
                for ch in 0..4 {
                    out[idx + ch] = (acc[ch] / samples) as u8;
                }
            }
        }

        Self {
            width: out_w,
            height: out_h,
            pixels: out,
        }
    }
}
