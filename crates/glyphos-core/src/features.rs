//! Feature generation seam
//!
//! The engine never computes pixel features itself; it talks to a
//! [`FeatureService`]. The service also owns pixel unions, since the union
//! glyph must carry pixels the feature functions can run on.
//! [`BasicImageService`] is a bundled minimal implementation, sufficient for
//! the engines and their tests; production feature sets plug in behind the
//! same trait.

use crate::bitmap::Bitmap;
use crate::error::{CoreError, CoreResult};
use crate::glyph::{FeatureVector, Glyph, GlyphRef};

/// External feature/geometry collaborator
pub trait FeatureService {
    /// Identity of the active feature-function set.
    ///
    /// Cached [`FeatureVector`]s carrying a different identity are stale and
    /// must be regenerated.
    fn set_id(&self) -> &str;

    /// Computes feature values for one glyph
    fn compute(&self, glyph: &Glyph) -> CoreResult<Vec<f64>>;

    /// Builds a new unclassified glyph whose geometry and pixels are the
    /// union of the inputs
    fn union_image(&self, parts: &[GlyphRef]) -> CoreResult<Glyph>;

    /// Ensures the glyph's feature cache is current, computing if needed.
    ///
    /// Idempotent: a cache built by the active set is left untouched.
    fn generate_features(&self, glyph: &mut Glyph) -> CoreResult<()> {
        if glyph.features_current(self.set_id()) {
            return Ok(());
        }
        let values = self.compute(glyph)?;
        glyph.features = Some(FeatureVector {
            values,
            set_id: self.set_id().to_string(),
        });
        Ok(())
    }
}

/// Minimal bundled feature service: box dimensions, aspect ratio, foreground
/// density and normalized centroid
#[derive(Debug, Default)]
pub struct BasicImageService;

impl BasicImageService {
    /// Feature-set identity reported by this service
    pub const SET_ID: &'static str = "basic/1";
}

impl FeatureService for BasicImageService {
    fn set_id(&self) -> &str {
        Self::SET_ID
    }

    fn compute(&self, glyph: &Glyph) -> CoreResult<Vec<f64>> {
        let w = glyph.image.width();
        let h = glyph.image.height();
        if w == 0 || h == 0 {
            return Err(CoreError::FeatureFailed("empty image".to_string()));
        }
        let area = (w as f64) * (h as f64);
        let fg = glyph.image.foreground_count() as f64;

        let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);
        for y in 0..h {
            for x in 0..w {
                if glyph.image.get(x, y) {
                    sum_x += x as f64;
                    sum_y += y as f64;
                }
            }
        }
        let (cx, cy) = if fg > 0.0 {
            (sum_x / fg / w as f64, sum_y / fg / h as f64)
        } else {
            (0.5, 0.5)
        };

        Ok(vec![
            w as f64,
            h as f64,
            w as f64 / h as f64,
            fg / area,
            cx,
            cy,
        ])
    }

    fn union_image(&self, parts: &[GlyphRef]) -> CoreResult<Glyph> {
        let first = parts.first().ok_or(CoreError::EmptyUnion)?;
        let mut bbox = first.borrow().bbox;
        for p in &parts[1..] {
            bbox = bbox.union(&p.borrow().bbox);
        }
        let mut image = Bitmap::new(bbox.w as u32, bbox.h as u32);
        for p in parts {
            let g = p.borrow();
            image.blit(&g.image, (g.bbox.x - bbox.x) as u32, (g.bbox.y - bbox.y) as u32);
        }
        Ok(Glyph::new(bbox, image))
    }
}
