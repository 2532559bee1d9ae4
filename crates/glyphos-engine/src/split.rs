//! Split strategies
//!
//! Decomposition of one glyph into child glyphs. Strategies form a closed
//! enumeration resolved from the `<method>` part of a `"_split.<method>"`
//! label at the split site; an unknown name is a configuration error, while
//! a cut that fails to produce at least two non-empty parts is a
//! segmentation failure the classification engine recovers from by demoting
//! the label.

use glyphos_core::{BBox, Glyph, GlyphRef};
use thiserror::Error;

/// Errors from a split attempt
#[derive(Debug, Error)]
pub enum SplitError {
    /// The method name does not map to any known strategy
    #[error("unknown split strategy: {0}")]
    UnknownStrategy(String),

    /// This particular glyph cannot be split this way
    #[error("segmentation failed: {0}")]
    Segmentation(String),
}

/// A named decomposition operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Vertical cut at the horizontal midpoint
    SplitX,
    /// Vertical cut at one quarter of the width
    SplitXLeft,
    /// Vertical cut at three quarters of the width
    SplitXRight,
    /// Horizontal cut at the vertical midpoint
    SplitY,
    /// Horizontal cut at one quarter of the height
    SplitYTop,
    /// Horizontal cut at three quarters of the height
    SplitYBottom,
}

impl SplitStrategy {
    /// All strategies, in name order
    pub const ALL: [SplitStrategy; 6] = [
        SplitStrategy::SplitX,
        SplitStrategy::SplitXLeft,
        SplitStrategy::SplitXRight,
        SplitStrategy::SplitY,
        SplitStrategy::SplitYTop,
        SplitStrategy::SplitYBottom,
    ];

    /// The method name as it appears in `"_split.<method>"` labels
    pub fn name(&self) -> &'static str {
        match self {
            SplitStrategy::SplitX => "splitx",
            SplitStrategy::SplitXLeft => "splitx-left",
            SplitStrategy::SplitXRight => "splitx-right",
            SplitStrategy::SplitY => "splity",
            SplitStrategy::SplitYTop => "splity-top",
            SplitStrategy::SplitYBottom => "splity-bottom",
        }
    }

    /// Resolves a method name to a strategy
    pub fn from_name(name: &str) -> Option<SplitStrategy> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Cut axis and position as a fraction of the cut dimension
    fn cut_spec(&self) -> (Axis, u32, u32) {
        match self {
            SplitStrategy::SplitX => (Axis::Vertical, 1, 2),
            SplitStrategy::SplitXLeft => (Axis::Vertical, 1, 4),
            SplitStrategy::SplitXRight => (Axis::Vertical, 3, 4),
            SplitStrategy::SplitY => (Axis::Horizontal, 1, 2),
            SplitStrategy::SplitYTop => (Axis::Horizontal, 1, 4),
            SplitStrategy::SplitYBottom => (Axis::Horizontal, 3, 4),
        }
    }

    /// Applies the cut, returning child glyphs in page coordinates.
    ///
    /// Each child is clipped to its own foreground and starts out
    /// unclassified. Fails with [`SplitError::Segmentation`] if fewer than
    /// two non-empty parts result.
    pub fn apply(&self, glyph: &Glyph) -> Result<Vec<GlyphRef>, SplitError> {
        let w = glyph.image.width();
        let h = glyph.image.height();
        let (axis, num, den) = self.cut_spec();
        let dim = match axis {
            Axis::Vertical => w,
            Axis::Horizontal => h,
        };
        if dim < 2 {
            return Err(SplitError::Segmentation(format!(
                "glyph too small to cut with {}",
                self.name()
            )));
        }
        let cut = (dim as u64 * num as u64 / den as u64).clamp(1, dim as u64 - 1) as u32;
        let regions = match axis {
            Axis::Vertical => [(0, 0, cut, h), (cut, 0, w - cut, h)],
            Axis::Horizontal => [(0, 0, w, cut), (0, cut, w, h - cut)],
        };

        let mut children = Vec::new();
        for (rx, ry, rw, rh) in regions {
            let piece = glyph.image.crop(rx, ry, rw, rh);
            let Some(fb) = piece.foreground_bounds() else {
                continue;
            };
            let bbox = BBox::new(
                glyph.bbox.x + rx as i32 + fb.x,
                glyph.bbox.y + ry as i32 + fb.y,
                fb.w,
                fb.h,
            );
            let image = piece.crop(fb.x as u32, fb.y as u32, fb.w as u32, fb.h as u32);
            children.push(Glyph::new_ref(bbox, image));
        }
        if children.len() < 2 {
            return Err(SplitError::Segmentation(format!(
                "{} produced {} part(s)",
                self.name(),
                children.len()
            )));
        }
        Ok(children)
    }
}

/// Cut orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Vertical,
    Horizontal,
}

/// Looks up and applies a strategy by method name
pub fn split(glyph: &Glyph, method: &str) -> Result<Vec<GlyphRef>, SplitError> {
    let strategy = SplitStrategy::from_name(method)
        .ok_or_else(|| SplitError::UnknownStrategy(method.to_string()))?;
    strategy.apply(glyph)
}
