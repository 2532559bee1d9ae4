//! Training store
//!
//! The collection of labeled glyphs used as the classification oracle's
//! knowledge base. Membership changes toggle a dirty flag so callers know
//! when derived oracle state (caches, indexes) must be rebuilt.

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::glyph::{ClassificationState, GlyphId, GlyphRef};

/// Access discipline for the training store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreDiscipline {
    /// Set-like: `insert` silently refuses duplicates (interactive flavor)
    #[default]
    Unique,
    /// List-like: insertion order preserved, duplicates are the caller's
    /// responsibility (non-interactive flavor)
    Ordered,
}

/// Collection of classified glyphs backing the oracle
#[derive(Debug, Default)]
pub struct TrainingStore {
    glyphs: Vec<GlyphRef>,
    ids: HashSet<GlyphId>,
    discipline: StoreDiscipline,
    dirty: bool,
}

impl TrainingStore {
    /// Creates an empty store with the given discipline
    pub fn new(discipline: StoreDiscipline) -> Self {
        Self {
            glyphs: Vec::new(),
            ids: HashSet::new(),
            discipline,
            dirty: false,
        }
    }

    /// The discipline this store was created with
    pub fn discipline(&self) -> StoreDiscipline {
        self.discipline
    }

    /// Number of stored glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if the store holds no glyphs
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Returns true if a glyph with this identity is stored
    pub fn contains(&self, id: GlyphId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterates the stored glyphs in insertion order
    pub fn glyphs(&self) -> impl Iterator<Item = &GlyphRef> {
        self.glyphs.iter()
    }

    /// Inserts a glyph, returning whether the membership changed.
    ///
    /// Unclassified glyphs are rejected. Under [`StoreDiscipline::Unique`] a
    /// duplicate insert is a no-op returning `Ok(false)`; under
    /// [`StoreDiscipline::Ordered`] the caller must avoid duplicates (use
    /// [`TrainingStore::contains`]).
    pub fn insert(&mut self, glyph: GlyphRef) -> CoreResult<bool> {
        let id = {
            let g = glyph.borrow();
            if g.state() == ClassificationState::Unclassified {
                return Err(CoreError::UnclassifiedGlyph);
            }
            g.id()
        };
        if self.discipline == StoreDiscipline::Unique && self.ids.contains(&id) {
            return Ok(false);
        }
        self.ids.insert(id);
        self.glyphs.push(glyph);
        self.dirty = true;
        Ok(true)
    }

    /// Removes the glyph with this identity, returning whether it was present
    pub fn remove(&mut self, id: GlyphId) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        self.glyphs.retain(|g| g.borrow().id() != id);
        self.dirty = true;
        true
    }

    /// Inserts every glyph from the iterator, skipping ids already stored.
    ///
    /// Returns the number of glyphs actually inserted.
    pub fn merge(&mut self, glyphs: impl IntoIterator<Item = GlyphRef>) -> CoreResult<usize> {
        let mut inserted = 0;
        for g in glyphs {
            let id = g.borrow().id();
            if self.ids.contains(&id) {
                continue;
            }
            if self.insert(g)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Removes everything
    pub fn clear(&mut self) {
        if !self.glyphs.is_empty() {
            self.dirty = true;
        }
        self.glyphs.clear();
        self.ids.clear();
    }

    /// Returns true if membership changed since the last [`mark_clean`]
    ///
    /// [`mark_clean`]: TrainingStore::mark_clean
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledges the current contents (typically after the oracle rebuilt
    /// its derived state)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
