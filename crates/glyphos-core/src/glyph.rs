//! The Glyph entity
//!
//! A glyph is an image region (typically a connected component of a scanned
//! page) carrying an ordered list of label hypotheses, a classification
//! state, the children produced by its most recent split, and a feature
//! cache. Glyphs are shared between the working set, the training store and
//! parent/child links, so they are handled as `Rc<RefCell<Glyph>>`
//! ([`GlyphRef`]); the engine is single-threaded by contract.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bitmap::Bitmap;
use crate::geometry::BBox;

/// Shared handle to a glyph
pub type GlyphRef = Rc<RefCell<Glyph>>;

/// Process-unique glyph identity, used for set membership and dedup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl GlyphId {
    fn next() -> Self {
        GlyphId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a glyph acquired its current label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationState {
    /// Never classified; `id_name` is empty
    #[default]
    Unclassified = 0,
    /// Labeled by the classification engine
    Automatic = 1,
    /// Labeled by a heuristic outside the engine
    Heuristic = 2,
    /// Labeled by a human; sticky until explicitly unclassified
    Manual = 3,
}

/// A single `(confidence, label)` guess from the oracle
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Certainty in [0, 1]
    pub confidence: f32,
    /// Class label
    pub label: String,
}

impl Hypothesis {
    /// Creates a hypothesis
    pub fn new(confidence: f32, label: impl Into<String>) -> Self {
        Self {
            confidence,
            label: label.into(),
        }
    }
}

/// Cached feature values plus the identity of the feature-function set that
/// produced them
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Opaque feature values
    pub values: Vec<f64>,
    /// Identity of the generating feature-function set; a mismatch against
    /// the active set means the cache is stale
    pub set_id: String,
}

/// An image region carrying label hypotheses and split-produced children
#[derive(Debug)]
pub struct Glyph {
    id: GlyphId,
    /// Position on the page
    pub bbox: BBox,
    /// Pixel content, relative to `bbox`
    pub image: Bitmap,
    /// Label hypotheses, sorted descending by confidence; element 0 is the
    /// most confident. Non-empty whenever `state != Unclassified`.
    id_name: Vec<Hypothesis>,
    state: ClassificationState,
    /// Parts produced by the most recent split (empty if never split)
    pub children: Vec<GlyphRef>,
    /// Feature cache; `None` until generated
    pub features: Option<FeatureVector>,
}

impl Glyph {
    /// Creates an unclassified glyph from its page position and pixels
    pub fn new(bbox: BBox, image: Bitmap) -> Self {
        Self {
            id: GlyphId::next(),
            bbox,
            image,
            id_name: Vec::new(),
            state: ClassificationState::Unclassified,
            children: Vec::new(),
            features: None,
        }
    }

    /// Creates an unclassified glyph wrapped in a shared handle
    pub fn new_ref(bbox: BBox, image: Bitmap) -> GlyphRef {
        Rc::new(RefCell::new(Self::new(bbox, image)))
    }

    /// Stable identity of this glyph
    pub fn id(&self) -> GlyphId {
        self.id
    }

    /// Current classification state
    pub fn state(&self) -> ClassificationState {
        self.state
    }

    /// All current hypotheses, most confident first
    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.id_name
    }

    /// The most confident hypothesis, if any
    pub fn main_hypothesis(&self) -> Option<&Hypothesis> {
        self.id_name.first()
    }

    /// The most confident label, if any
    pub fn main_label(&self) -> Option<&str> {
        self.id_name.first().map(|h| h.label.as_str())
    }

    /// Confidence of the most confident hypothesis, or 0.0
    pub fn main_confidence(&self) -> f32 {
        self.id_name.first().map(|h| h.confidence).unwrap_or(0.0)
    }

    /// Replaces the hypotheses and state.
    ///
    /// Hypotheses are sorted descending by confidence (stable), pinning the
    /// "element 0 is most confident" convention regardless of oracle order.
    pub fn set_hypotheses(&mut self, mut hypotheses: Vec<Hypothesis>, state: ClassificationState) {
        hypotheses.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.id_name = hypotheses;
        self.state = state;
    }

    /// Marks the glyph as automatically classified with the given guesses
    pub fn set_automatic(&mut self, hypotheses: Vec<Hypothesis>) {
        self.set_hypotheses(hypotheses, ClassificationState::Automatic);
    }

    /// Marks the glyph as manually labeled with full confidence
    pub fn set_manual(&mut self, label: impl Into<String>) {
        self.set_hypotheses(
            vec![Hypothesis::new(1.0, label)],
            ClassificationState::Manual,
        );
    }

    /// Drops the top hypothesis, returning it.
    ///
    /// Used by the classification engine to fall back to the next-best label
    /// after a failed split attempt.
    pub fn demote(&mut self) -> Option<Hypothesis> {
        if self.id_name.is_empty() {
            return None;
        }
        Some(self.id_name.remove(0))
    }

    /// Returns true if no hypotheses remain
    pub fn has_hypotheses(&self) -> bool {
        !self.id_name.is_empty()
    }

    /// Resets to the unclassified state, clearing all hypotheses.
    ///
    /// Children are left in place; the caller decides their fate.
    pub fn unclassify(&mut self) {
        self.id_name.clear();
        self.state = ClassificationState::Unclassified;
    }

    /// Drops the feature cache, forcing regeneration on next use
    pub fn invalidate_features(&mut self) {
        self.features = None;
    }

    /// Returns true if cached features match the given feature-set identity
    pub fn features_current(&self, set_id: &str) -> bool {
        self.features
            .as_ref()
            .is_some_and(|f| f.set_id == set_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph() -> Glyph {
        Glyph::new(BBox::new(0, 0, 4, 4), Bitmap::new(4, 4))
    }

    #[test]
    fn test_new_glyph_is_unclassified() {
        let g = glyph();
        assert_eq!(g.state(), ClassificationState::Unclassified);
        assert!(g.hypotheses().is_empty());
        assert!(g.main_label().is_none());
        assert_eq!(g.main_confidence(), 0.0);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(glyph().id(), glyph().id());
    }

    #[test]
    fn test_hypotheses_sorted_descending() {
        // Regression for the upstream ordering ambiguity: element 0 must be
        // the most confident guess no matter what order the oracle returns.
        let mut g = glyph();
        g.set_automatic(vec![
            Hypothesis::new(0.2, "low"),
            Hypothesis::new(0.9, "high"),
            Hypothesis::new(0.5, "mid"),
        ]);
        assert_eq!(g.main_label(), Some("high"));
        assert_eq!(g.hypotheses()[1].label, "mid");
        assert_eq!(g.hypotheses()[2].label, "low");
        assert_eq!(g.state(), ClassificationState::Automatic);
    }

    #[test]
    fn test_set_manual() {
        let mut g = glyph();
        g.set_manual("x.y");
        assert_eq!(g.state(), ClassificationState::Manual);
        assert_eq!(g.main_label(), Some("x.y"));
        assert_eq!(g.main_confidence(), 1.0);
    }

    #[test]
    fn test_demote() {
        let mut g = glyph();
        g.set_automatic(vec![
            Hypothesis::new(0.9, "a"),
            Hypothesis::new(0.4, "b"),
        ]);
        let dropped = g.demote().unwrap();
        assert_eq!(dropped.label, "a");
        assert_eq!(g.main_label(), Some("b"));
        g.demote();
        assert!(g.demote().is_none());
        assert!(!g.has_hypotheses());
    }

    #[test]
    fn test_unclassify_clears_label() {
        let mut g = glyph();
        g.set_manual("x");
        g.unclassify();
        assert_eq!(g.state(), ClassificationState::Unclassified);
        assert!(g.hypotheses().is_empty());
    }

    #[test]
    fn test_feature_cache_identity() {
        let mut g = glyph();
        assert!(!g.features_current("basic/1"));
        g.features = Some(FeatureVector {
            values: vec![1.0],
            set_id: "basic/1".into(),
        });
        assert!(g.features_current("basic/1"));
        assert!(!g.features_current("basic/2"));
        g.invalidate_features();
        assert!(!g.features_current("basic/1"));
    }
}
