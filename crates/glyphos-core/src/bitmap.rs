//! Minimal 1 bpp bitmap
//!
//! Just enough pixel storage for the split strategies and pixel unions:
//! foreground bounds, cropping, OR-compositing, and row/column projections.
//! Production feature extraction lives behind the [`FeatureService`] seam.
//!
//! [`FeatureService`]: crate::features::FeatureService

use crate::geometry::BBox;

/// A binary image, row-major, one byte per 8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Creates an all-background bitmap
    pub fn new(width: u32, height: u32) -> Self {
        let stride = Self::stride_for(width);
        Self {
            width,
            height,
            data: vec![0; stride * height as usize],
        }
    }

    fn stride_for(width: u32) -> usize {
        (width as usize).div_ceil(8)
    }

    fn stride(&self) -> usize {
        Self::stride_for(self.width)
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads the pixel at `(x, y)`; out-of-bounds reads are background
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y as usize * self.stride() + (x / 8) as usize];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Writes the pixel at `(x, y)`; out-of-bounds writes are ignored
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let stride = self.stride();
        let byte = &mut self.data[y as usize * stride + (x / 8) as usize];
        let mask = 0x80 >> (x % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> u64 {
        self.data.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// Tight bounds of the foreground, relative to this bitmap.
    ///
    /// Returns `None` for an all-background image.
    pub fn foreground_bounds(&self) -> Option<BBox> {
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        let mut found = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    found = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if !found {
            return None;
        }
        Some(BBox::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        ))
    }

    /// Copies out the rectangle `(x, y, w, h)`; out-of-range pixels read as
    /// background
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Bitmap {
        let mut out = Bitmap::new(w, h);
        for dy in 0..h {
            for dx in 0..w {
                if self.get(x + dx, y + dy) {
                    out.set(dx, dy, true);
                }
            }
        }
        out
    }

    /// ORs `src` into this bitmap with its top-left corner at `(x, y)`
    pub fn blit(&mut self, src: &Bitmap, x: u32, y: u32) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                if src.get(sx, sy) {
                    self.set(x + sx, y + sy, true);
                }
            }
        }
    }

    /// Foreground pixel count per column
    pub fn column_projection(&self) -> Vec<u32> {
        let mut cols = vec![0u32; self.width as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    cols[x as usize] += 1;
                }
            }
        }
        cols
    }

    /// Foreground pixel count per row
    pub fn row_projection(&self) -> Vec<u32> {
        let mut rows = vec![0u32; self.height as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    rows[y as usize] += 1;
                }
            }
        }
        rows
    }
}
