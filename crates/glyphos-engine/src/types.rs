//! Engine state and result types

use std::collections::HashSet;
use std::rc::Rc;

use glyphos_core::{FeatureService, Glyph, GlyphId, GlyphRef, StoreDiscipline, TrainingStore};

use crate::oracle::Oracle;

/// Default recursion cap for classification
pub const DEFAULT_MAX_RECURSION: u32 = 10;

/// Default bounding-box expansion margin for the grouping predicate
pub const DEFAULT_GROUP_MARGIN: i32 = 4;

/// Default maximum number of glyphs merged into one group
pub const DEFAULT_MAX_PARTS_PER_GROUP: usize = 5;

/// Default maximum candidacy-graph component size searched for groups
pub const DEFAULT_MAX_GRAPH_SIZE: usize = 16;

/// Hard bitmask bound on the partition search, independent of
/// [`GroupingOptions::max_graph_size`]
pub const MAX_SEARCHABLE_COMPONENT: usize = 20;

/// The classification/splitting/grouping engine.
///
/// Owns the training store and the two external collaborators. Automatic
/// classification and grouping take `&self`; only the manual training API
/// mutates the store and takes `&mut self`.
pub struct Engine {
    pub(crate) oracle: Box<dyn Oracle>,
    pub(crate) features: Box<dyn FeatureService>,
    pub(crate) store: TrainingStore,
}

impl Engine {
    /// Creates an engine around an existing store
    pub fn new(
        oracle: Box<dyn Oracle>,
        features: Box<dyn FeatureService>,
        store: TrainingStore,
    ) -> Self {
        Self {
            oracle,
            features,
            store,
        }
    }

    /// Interactive flavor: set-like training store
    pub fn interactive(oracle: Box<dyn Oracle>, features: Box<dyn FeatureService>) -> Self {
        Self::new(oracle, features, TrainingStore::new(StoreDiscipline::Unique))
    }

    /// Non-interactive flavor: list-like training store
    pub fn noninteractive(oracle: Box<dyn Oracle>, features: Box<dyn FeatureService>) -> Self {
        Self::new(
            oracle,
            features,
            TrainingStore::new(StoreDiscipline::Ordered),
        )
    }

    /// The training store
    pub fn store(&self) -> &TrainingStore {
        &self.store
    }

    /// Mutable access to the training store, e.g. for preloading persisted
    /// training data
    pub fn store_mut(&mut self) -> &mut TrainingStore {
        &mut self.store
    }
}

/// Result of an engine operation: glyphs to add to and remove from the
/// caller's working set.
///
/// The caller reconstructs its state as `(input - removed) + added`; the
/// input collection itself is never mutated. Once normalized, `added` never
/// contains a glyph that also appears in `removed`.
#[derive(Default)]
pub struct EngineOutput {
    added: Vec<GlyphRef>,
    removed: Vec<GlyphRef>,
    added_ids: HashSet<GlyphId>,
    removed_ids: HashSet<GlyphId>,
}

impl EngineOutput {
    /// Glyphs the caller must add to its working set
    pub fn added(&self) -> &[GlyphRef] {
        &self.added
    }

    /// Glyphs the caller must discard
    pub fn removed(&self) -> &[GlyphRef] {
        &self.removed
    }

    /// Consumes the output into `(added, removed)`
    pub fn into_parts(self) -> (Vec<GlyphRef>, Vec<GlyphRef>) {
        (self.added, self.removed)
    }

    /// Returns true if nothing was added or removed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Records a glyph as added (idempotent per glyph)
    pub fn push_added(&mut self, glyph: GlyphRef) {
        let id = glyph.borrow().id();
        if self.added_ids.insert(id) {
            self.added.push(glyph);
        }
    }

    /// Records a glyph as removed (idempotent per glyph)
    pub fn push_removed(&mut self, glyph: GlyphRef) {
        let id = glyph.borrow().id();
        if self.removed_ids.insert(id) {
            self.removed.push(glyph);
        }
    }

    /// Returns true if the glyph with this identity was recorded as removed
    pub fn is_removed(&self, id: GlyphId) -> bool {
        self.removed_ids.contains(&id)
    }

    /// Drops from `added` everything that was later removed (a glyph both
    /// produced and superseded within one operation must not reappear in the
    /// caller's working set)
    pub fn normalize(&mut self) {
        if self.removed_ids.is_empty() {
            return;
        }
        let removed_ids = &self.removed_ids;
        self.added.retain(|g| !removed_ids.contains(&g.borrow().id()));
        self.added_ids
            .retain(|id| !removed_ids.contains(id));
    }
}

impl std::fmt::Debug for EngineOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOutput")
            .field("added", &self.added.len())
            .field("removed", &self.removed.len())
            .finish()
    }
}

/// Pair-eligibility predicate for the candidacy graph
#[derive(Clone)]
pub enum GroupingPolicy {
    /// Edge when both bounding boxes, each expanded by `margin`, intersect
    BoundingBox {
        /// Expansion margin in pixels
        margin: i32,
    },
    /// Caller-supplied predicate
    Custom(Rc<dyn Fn(&Glyph, &Glyph) -> bool>),
}

impl GroupingPolicy {
    /// Returns true when the pair may belong to the same group
    pub fn eligible(&self, a: &Glyph, b: &Glyph) -> bool {
        match self {
            GroupingPolicy::BoundingBox { margin } => {
                a.bbox.expand(*margin).intersects(&b.bbox.expand(*margin))
            }
            GroupingPolicy::Custom(f) => f(a, b),
        }
    }
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        GroupingPolicy::BoundingBox {
            margin: DEFAULT_GROUP_MARGIN,
        }
    }
}

impl std::fmt::Debug for GroupingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingPolicy::BoundingBox { margin } => {
                f.debug_struct("BoundingBox").field("margin", margin).finish()
            }
            GroupingPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Scoring policy for candidate subsets in the partition search
#[derive(Clone, Default)]
pub enum EvalPolicy {
    /// Singletons score their current top confidence (0 if consumed by a
    /// prior group); merged subsets are classified through the oracle and
    /// score their top confidence, with `"_split"`/`"skip"` results vetoed
    /// to 0
    #[default]
    OracleConfidence,
    /// Caller-supplied scorer over the subset's members
    Custom(Rc<dyn Fn(&[GlyphRef]) -> f32>),
}

impl std::fmt::Debug for EvalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalPolicy::OracleConfidence => f.write_str("OracleConfidence"),
            EvalPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options for [`Engine::group_many`]
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    /// Maximum number of glyphs merged into one group
    pub max_parts_per_group: usize,
    /// Candidacy-graph components larger than this are skipped entirely
    pub max_graph_size: usize,
    /// Recursion cap for the classification pass that precedes grouping
    pub max_recursion: u32,
    /// Pair-eligibility predicate
    pub grouping: GroupingPolicy,
    /// Subset scoring policy
    pub eval: EvalPolicy,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            max_parts_per_group: DEFAULT_MAX_PARTS_PER_GROUP,
            max_graph_size: DEFAULT_MAX_GRAPH_SIZE,
            max_recursion: DEFAULT_MAX_RECURSION,
            grouping: GroupingPolicy::default(),
            eval: EvalPolicy::default(),
        }
    }
}

impl GroupingOptions {
    /// Sets the maximum group size
    pub fn with_max_parts_per_group(mut self, n: usize) -> Self {
        self.max_parts_per_group = n;
        self
    }

    /// Sets the component-size bound
    pub fn with_max_graph_size(mut self, n: usize) -> Self {
        self.max_graph_size = n;
        self
    }

    /// Sets the recursion cap for the classification pass
    pub fn with_max_recursion(mut self, n: u32) -> Self {
        self.max_recursion = n;
        self
    }

    /// Sets the pair-eligibility predicate
    pub fn with_grouping(mut self, grouping: GroupingPolicy) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the subset scoring policy
    pub fn with_eval(mut self, eval: EvalPolicy) -> Self {
        self.eval = eval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphos_core::{BBox, Bitmap};

    fn glyph_at(x: i32, y: i32, w: i32, h: i32) -> GlyphRef {
        Glyph::new_ref(BBox::new(x, y, w, h), Bitmap::new(w as u32, h as u32))
    }

    #[test]
    fn test_output_dedups_and_normalizes() {
        let mut out = EngineOutput::default();
        let a = glyph_at(0, 0, 2, 2);
        let b = glyph_at(4, 0, 2, 2);
        out.push_added(a.clone());
        out.push_added(a.clone());
        out.push_added(b.clone());
        out.push_removed(b.clone());
        assert_eq!(out.added().len(), 2);
        assert_eq!(out.removed().len(), 1);
        out.normalize();
        assert_eq!(out.added().len(), 1);
        assert_eq!(out.added()[0].borrow().id(), a.borrow().id());
        assert!(out.is_removed(b.borrow().id()));
    }

    #[test]
    fn test_bounding_box_policy() {
        let policy = GroupingPolicy::BoundingBox { margin: 2 };
        let a = glyph_at(0, 0, 10, 10);
        let near = glyph_at(12, 0, 10, 10);
        let far = glyph_at(30, 0, 10, 10);
        assert!(policy.eligible(&a.borrow(), &near.borrow()));
        assert!(!policy.eligible(&a.borrow(), &far.borrow()));
    }

    #[test]
    fn test_options_builders() {
        let opts = GroupingOptions::default()
            .with_max_parts_per_group(3)
            .with_max_graph_size(8)
            .with_max_recursion(2);
        assert_eq!(opts.max_parts_per_group, 3);
        assert_eq!(opts.max_graph_size, 8);
        assert_eq!(opts.max_recursion, 2);
    }
}
