//! Manual training
//!
//! Direct (non-automatic) labeling and manual grouping. These entry points
//! share the split machinery with automatic classification so that a manual
//! `"_split.<method>"` label leaves the glyph tree in exactly the state an
//! automatic split would have, and they are the only operations that write
//! to the training store.

use std::cell::RefCell;
use std::rc::Rc;

use glyphos_core::{ClassificationState, GlyphRef};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::labels;
use crate::progress::NoProgress;
use crate::split::{SplitError, SplitStrategy};
use crate::types::{DEFAULT_MAX_RECURSION, Engine, EngineOutput};

impl Engine {
    /// Manually labels one glyph and inserts it into the training store.
    ///
    /// Labels beginning with `"_group"` are rejected; groups go through
    /// [`classify_many_manual`]. A `"_split.<method>"` label triggers the
    /// split: the children land in `added` and are classified automatically,
    /// while the glyph's previous children are removed from the store and
    /// land in `removed`.
    ///
    /// [`classify_many_manual`]: Engine::classify_many_manual
    pub fn classify_manual(&mut self, glyph: &GlyphRef, label: &str) -> EngineResult<EngineOutput> {
        if labels::is_group_label(label) {
            return Err(EngineError::GroupLabelRequiresBatch(label.to_string()));
        }
        let mut out = EngineOutput::default();
        self.manual_label_one(glyph, label, &mut out)?;
        self.store.insert(glyph.clone())?;
        self.classify_new_children(&mut out)?;
        out.normalize();
        Ok(out)
    }

    /// Manually labels a batch, or forms a manual group.
    ///
    /// With a `"_group.<suffix>"` label: requires more than one glyph
    /// (grouping a single glyph is a rejected, no-op request returning an
    /// empty output); forms the pixel union, sentinels each member as
    /// consumed, manually classifies the union under `<suffix>`, and returns
    /// that result plus the union itself.
    ///
    /// With any other label: labels each input glyph (skipping glyphs a
    /// split within this call already superseded), bulk-inserts the newly
    /// labeled glyphs into the store, and classifies split-produced children
    /// automatically.
    pub fn classify_many_manual(
        &mut self,
        glyphs: &[GlyphRef],
        label: &str,
    ) -> EngineResult<EngineOutput> {
        if labels::is_group_label(label) {
            return self.manual_group(glyphs, label);
        }

        let mut out = EngineOutput::default();
        let mut newly_labeled = Vec::new();
        for g in glyphs {
            if out.is_removed(g.borrow().id()) {
                continue;
            }
            self.manual_label_one(g, label, &mut out)?;
            newly_labeled.push(g.clone());
        }
        self.store.merge(newly_labeled)?;
        self.classify_new_children(&mut out)?;
        out.normalize();
        Ok(out)
    }

    /// Removes the glyph from the training store and resets it to the
    /// unclassified state. This is the only way out of `Manual`.
    pub fn unclassify(&mut self, glyph: &GlyphRef) {
        self.store.remove(glyph.borrow().id());
        glyph.borrow_mut().unclassify();
    }

    fn manual_group(&mut self, glyphs: &[GlyphRef], label: &str) -> EngineResult<EngineOutput> {
        if glyphs.len() <= 1 {
            debug!(%label, "manual group of fewer than two glyphs rejected");
            return Ok(EngineOutput::default());
        }
        let suffix = labels::group_suffix(label)
            .ok_or_else(|| EngineError::InvalidLabel(format!("group label without a suffix: {label}")))?
            .to_string();
        // Resolve a split suffix up front: once the members are rewritten
        // below there is no clean way to fail.
        if let Some(method) = labels::split_method(&suffix) {
            SplitStrategy::from_name(method)
                .ok_or_else(|| EngineError::UnknownSplitStrategy(method.to_string()))?;
        }

        let union = Rc::new(RefCell::new(self.features.union_image(glyphs)?));

        let sentinel = labels::group_part_label(&suffix);
        for m in glyphs {
            {
                let mut g = m.borrow_mut();
                g.set_manual(sentinel.clone());
                g.invalidate_features();
            }
            self.ensure_features(m)?;
        }

        let mut out = self.classify_manual(&union, &suffix)?;
        out.push_added(union);
        Ok(out)
    }

    /// The shared manual-label step: supersede existing children, set the
    /// manual label, refresh features, and expand a `"_split."` label.
    fn manual_label_one(
        &mut self,
        glyph: &GlyphRef,
        label: &str,
        out: &mut EngineOutput,
    ) -> EngineResult<()> {
        let old_children = std::mem::take(&mut glyph.borrow_mut().children);
        for c in old_children {
            self.store.remove(c.borrow().id());
            out.push_removed(c);
        }

        {
            let mut g = glyph.borrow_mut();
            g.set_manual(label);
            g.invalidate_features();
        }
        self.ensure_features(glyph)?;

        if let Some(method) = labels::split_method(label) {
            let strategy = SplitStrategy::from_name(method)
                .ok_or_else(|| EngineError::UnknownSplitStrategy(method.to_string()))?;
            // the borrow must end here; the arms below re-borrow mutably
            let attempt = strategy.apply(&glyph.borrow());
            match attempt {
                Ok(children) => {
                    glyph.borrow_mut().children = children.clone();
                    for c in children {
                        out.push_added(c);
                    }
                }
                Err(SplitError::Segmentation(reason)) => {
                    // A manual label is never demoted; keep it, just without
                    // children.
                    debug!(%label, %reason, "manual split failed; label kept without children");
                }
                Err(SplitError::UnknownStrategy(name)) => {
                    return Err(EngineError::UnknownSplitStrategy(name));
                }
            }
        }
        Ok(())
    }

    /// Classifies split-produced children once the store is guaranteed
    /// non-empty
    fn classify_new_children(&self, out: &mut EngineOutput) -> EngineResult<()> {
        let pending: Vec<GlyphRef> = out
            .added()
            .iter()
            .filter(|g| g.borrow().state() == ClassificationState::Unclassified)
            .cloned()
            .collect();
        if pending.is_empty() || self.store.is_empty() {
            return Ok(());
        }
        self.classify_batch(&pending, DEFAULT_MAX_RECURSION, 0, out, &mut NoProgress)
    }
}
