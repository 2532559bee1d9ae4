//! Shared fixtures for engine regression tests

#![allow(dead_code)]

use std::collections::HashMap;

use glyphos_core::{
    BBox, BasicImageService, Bitmap, Glyph, GlyphRef, Hypothesis, TrainingStore,
};
use glyphos_engine::{Engine, Oracle, OracleError};

/// Deterministic oracle scripted by bounding box.
///
/// Glyph geometry is stable across a test, so keying responses on the
/// bounding box gives full control over every classification the engine
/// performs, including unions and split children.
pub struct ScriptedOracle {
    responses: HashMap<BBox, Vec<Hypothesis>>,
    fallback: Vec<Hypothesis>,
}

impl ScriptedOracle {
    pub fn new(fallback: Vec<Hypothesis>) -> Self {
        Self {
            responses: HashMap::new(),
            fallback,
        }
    }

    pub fn respond(mut self, bbox: BBox, hypotheses: Vec<Hypothesis>) -> Self {
        self.responses.insert(bbox, hypotheses);
        self
    }
}

impl Oracle for ScriptedOracle {
    fn classify(
        &self,
        store: &TrainingStore,
        glyph: &Glyph,
    ) -> Result<Vec<Hypothesis>, OracleError> {
        if store.is_empty() {
            return Err(OracleError::EmptyStore);
        }
        Ok(self
            .responses
            .get(&glyph.bbox)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Interactive engine around the scripted oracle, with one seed glyph in the
/// store so classification is permitted
pub fn seeded_engine(oracle: ScriptedOracle) -> Engine {
    let mut engine = Engine::interactive(Box::new(oracle), Box::new(BasicImageService));
    let seed = solid_glyph(-100, -100, 2, 2);
    seed.borrow_mut().set_manual("seed.x");
    engine
        .store_mut()
        .insert(seed)
        .expect("seed glyph is classified");
    engine
}

/// Engine with an empty store
pub fn empty_engine(oracle: ScriptedOracle) -> Engine {
    Engine::interactive(Box::new(oracle), Box::new(BasicImageService))
}

/// All-foreground glyph at the given page position
pub fn solid_glyph(x: i32, y: i32, w: u32, h: u32) -> GlyphRef {
    let mut bm = Bitmap::new(w, h);
    for yy in 0..h {
        for xx in 0..w {
            bm.set(xx, yy, true);
        }
    }
    Glyph::new_ref(BBox::new(x, y, w as i32, h as i32), bm)
}

/// Glyph with two 2x2 blobs stacked vertically in a 2x10 box, so that
/// `splity` cuts it into children at `(x, y, 2, 2)` and `(x, y+8, 2, 2)`
pub fn stacked_blobs(x: i32, y: i32) -> GlyphRef {
    let mut bm = Bitmap::new(2, 10);
    for yy in 0..2 {
        for xx in 0..2 {
            bm.set(xx, yy, true);
            bm.set(xx, yy + 8, true);
        }
    }
    Glyph::new_ref(BBox::new(x, y, 2, 10), bm)
}

/// Single-pixel glyph: no split strategy can cut it
pub fn unsplittable_glyph(x: i32, y: i32) -> GlyphRef {
    let mut bm = Bitmap::new(1, 1);
    bm.set(0, 0, true);
    Glyph::new_ref(BBox::new(x, y, 1, 1), bm)
}

pub fn hyp(confidence: f32, label: &str) -> Hypothesis {
    Hypothesis::new(confidence, label)
}

/// Ids of a glyph slice, for set comparisons
pub fn ids(glyphs: &[GlyphRef]) -> Vec<glyphos_core::GlyphId> {
    let mut v: Vec<_> = glyphs.iter().map(|g| g.borrow().id()).collect();
    v.sort();
    v
}
