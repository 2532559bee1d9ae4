//! Automatic classification
//!
//! The recursive classify/split procedure. Recursion is modeled as an
//! explicit work queue of `(glyph, depth)` entries, so the depth cap bounds
//! the queue rather than the call stack. Reaching the cap is normal
//! truncation: the glyph keeps its unexpanded split guess and nothing is
//! reported to the caller.

use std::collections::{HashSet, VecDeque};

use glyphos_core::{ClassificationState, GlyphId, GlyphRef, Hypothesis};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::labels;
use crate::progress::{NoProgress, ProgressObserver};
use crate::split::{SplitError, SplitStrategy};
use crate::types::{Engine, EngineOutput};

impl Engine {
    /// Classifies one glyph, recursively expanding split verdicts up to
    /// `max_recursion` levels.
    ///
    /// Only glyphs in the `Unclassified` or `Automatic` state are touched;
    /// `Heuristic` and `Manual` glyphs are left alone. Errors with
    /// [`EngineError::EmptyTrainingStore`] when there is nothing to classify
    /// against.
    pub fn classify_one(&self, glyph: &GlyphRef, max_recursion: u32) -> EngineResult<EngineOutput> {
        if self.store.is_empty() {
            return Err(EngineError::EmptyTrainingStore);
        }
        let mut out = EngineOutput::default();
        let mut queue: VecDeque<(GlyphRef, u32)> = VecDeque::new();
        queue.push_back((glyph.clone(), 0));
        while let Some((g, depth)) = queue.pop_front() {
            let children = self.classify_step(&g, depth < max_recursion, &mut out)?;
            for c in children {
                out.push_added(c.clone());
                queue.push_back((c, depth + 1));
            }
        }
        out.normalize();
        Ok(out)
    }

    /// Classifies a batch of glyphs.
    ///
    /// The input collection is never mutated; apply the result as
    /// `(input - removed) + added`.
    pub fn classify_many(
        &self,
        glyphs: &[GlyphRef],
        max_recursion: u32,
    ) -> EngineResult<EngineOutput> {
        self.classify_many_with_progress(glyphs, max_recursion, &mut NoProgress)
    }

    /// [`classify_many`] with advisory progress reporting
    ///
    /// [`classify_many`]: Engine::classify_many
    pub fn classify_many_with_progress(
        &self,
        glyphs: &[GlyphRef],
        max_recursion: u32,
        progress: &mut dyn ProgressObserver,
    ) -> EngineResult<EngineOutput> {
        if self.store.is_empty() {
            return Err(EngineError::EmptyTrainingStore);
        }
        let mut out = EngineOutput::default();
        self.classify_batch(glyphs, max_recursion, 0, &mut out, progress)?;
        progress.finish();
        out.normalize();
        Ok(out)
    }

    /// One level of the batch procedure; re-applies itself to the glyphs a
    /// split produced, one depth level down.
    pub(crate) fn classify_batch(
        &self,
        glyphs: &[GlyphRef],
        max_recursion: u32,
        depth: u32,
        out: &mut EngineOutput,
        progress: &mut dyn ProgressObserver,
    ) -> EngineResult<()> {
        // Children of any reclassifiable glyph in the batch are about to be
        // superseded by a fresh split; don't classify them directly.
        let superseded: HashSet<GlyphId> = glyphs
            .iter()
            .filter(|g| reclassifiable(g))
            .flat_map(|g| {
                let g = g.borrow();
                g.children.iter().map(|c| c.borrow().id()).collect::<Vec<_>>()
            })
            .collect();

        let batch: Vec<&GlyphRef> = glyphs
            .iter()
            .filter(|g| !superseded.contains(&g.borrow().id()))
            .collect();
        progress.extend(batch.len());

        let mut produced = Vec::new();
        for g in batch {
            let children = self.classify_step(g, depth < max_recursion, out)?;
            for c in children {
                out.push_added(c.clone());
                produced.push(c);
            }
            progress.step();
        }

        if !produced.is_empty() {
            self.classify_batch(&produced, max_recursion, depth + 1, out, progress)?;
        }
        Ok(())
    }

    /// Classifies one glyph and expands at most one split level.
    ///
    /// Returns the new children (empty when no split happened). `allow_split`
    /// gates split expansion: when false, a split verdict is left in place
    /// unexpanded (silent truncation).
    pub(crate) fn classify_step(
        &self,
        glyph: &GlyphRef,
        allow_split: bool,
        out: &mut EngineOutput,
    ) -> EngineResult<Vec<GlyphRef>> {
        if !reclassifiable(glyph) {
            return Ok(Vec::new());
        }
        self.ensure_features(glyph)?;
        let hypotheses = {
            let g = glyph.borrow();
            self.oracle.classify(&self.store, &g)?
        };
        glyph.borrow_mut().set_automatic(hypotheses);
        self.expand_split(glyph, allow_split, out)
    }

    /// Split handling with demotion: while the top label asks for a split,
    /// try it; a segmentation failure drops the label and retries with the
    /// next-best one, ending at the `"_error"` sentinel when none remain.
    fn expand_split(
        &self,
        glyph: &GlyphRef,
        allow_split: bool,
        out: &mut EngineOutput,
    ) -> EngineResult<Vec<GlyphRef>> {
        loop {
            let method = {
                let g = glyph.borrow();
                g.main_label().and_then(labels::split_method).map(String::from)
            };
            let Some(method) = method else {
                return Ok(Vec::new());
            };
            if !allow_split {
                debug!(%method, "recursion cap reached; leaving split guess unexpanded");
                return Ok(Vec::new());
            }
            let strategy = SplitStrategy::from_name(&method)
                .ok_or_else(|| EngineError::UnknownSplitStrategy(method.clone()))?;
            // the borrow must end here; the arms below re-borrow mutably
            let attempt = strategy.apply(&glyph.borrow());
            match attempt {
                Ok(children) => {
                    // The previous children are superseded only now that the
                    // split actually succeeded.
                    let old = std::mem::take(&mut glyph.borrow_mut().children);
                    for c in old {
                        out.push_removed(c);
                    }
                    glyph.borrow_mut().children = children.clone();
                    return Ok(children);
                }
                Err(SplitError::Segmentation(reason)) => {
                    debug!(%method, %reason, "split attempt failed; demoting label");
                    let mut g = glyph.borrow_mut();
                    g.demote();
                    if !g.has_hypotheses() {
                        g.set_hypotheses(
                            vec![Hypothesis::new(0.0, labels::ERROR_LABEL)],
                            ClassificationState::Automatic,
                        );
                        return Ok(Vec::new());
                    }
                }
                Err(SplitError::UnknownStrategy(name)) => {
                    return Err(EngineError::UnknownSplitStrategy(name));
                }
            }
        }
    }

    /// Brings the glyph's feature cache up to date against the active
    /// feature-function set
    pub(crate) fn ensure_features(&self, glyph: &GlyphRef) -> EngineResult<()> {
        let mut g = glyph.borrow_mut();
        self.features.generate_features(&mut g)?;
        Ok(())
    }
}

/// Only unclassified and automatically classified glyphs may be
/// (re)classified; heuristic and manual labels are sticky
fn reclassifiable(glyph: &GlyphRef) -> bool {
    matches!(
        glyph.borrow().state(),
        ClassificationState::Unclassified | ClassificationState::Automatic
    )
}
