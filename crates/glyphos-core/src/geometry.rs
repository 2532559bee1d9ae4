//! Bounding box geometry
//!
//! Integer rectangles in page coordinates, used by the proximity predicates
//! of the grouping engine and to position glyphs on the page.

/// An axis-aligned integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BBox {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width (>= 0)
    pub w: i32,
    /// Height (>= 0)
    pub h: i32,
}

impl BBox {
    /// Creates a new bounding box
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Area in pixels
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Returns true if the box has zero area
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Returns true if the two boxes share at least one pixel
    pub fn intersects(&self, other: &BBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns the box grown by `margin` on every side.
    ///
    /// Coordinates may go negative; callers compare expanded boxes against
    /// each other, not against image bounds.
    pub fn expand(&self, margin: i32) -> BBox {
        BBox {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2 * margin,
            h: self.h + 2 * margin,
        }
    }

    /// Smallest box containing both inputs
    pub fn union(&self, other: &BBox) -> BBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        BBox::new(x, y, r - x, b - y)
    }

    /// True when `(px, py)` lies inside the box
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}
