//! Automatic grouping
//!
//! Searches combinations of adjacent glyphs for merges that classify with
//! higher confidence than their parts alone. Candidate pairs form an
//! undirected candidacy graph; each connected component (up to a size bound)
//! is searched exhaustively for the best partition into subsets, scored by
//! the oracle. Subsets are represented as bitmasks over the component, so
//! the search memoizes by subset identity for free. This is a deliberate
//! bounded approximation: components above the bound are skipped, never
//! searched partially.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glyphos_core::{ClassificationState, GlyphId, GlyphRef, Hypothesis};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::labels;
use crate::progress::{NoProgress, ProgressObserver};
use crate::types::{Engine, EngineOutput, EvalPolicy, GroupingOptions, MAX_SEARCHABLE_COMPONENT};

impl Engine {
    /// Classifies the batch, then merges adjacent glyphs where the merged
    /// whole classifies better than its parts.
    ///
    /// A single-glyph input is a rejected no-op request and returns an empty
    /// output.
    pub fn group_many(
        &self,
        glyphs: &[GlyphRef],
        options: &GroupingOptions,
    ) -> EngineResult<EngineOutput> {
        self.group_many_with_progress(glyphs, options, &mut NoProgress)
    }

    /// [`group_many`] with advisory progress reporting
    ///
    /// [`group_many`]: Engine::group_many
    pub fn group_many_with_progress(
        &self,
        glyphs: &[GlyphRef],
        options: &GroupingOptions,
        progress: &mut dyn ProgressObserver,
    ) -> EngineResult<EngineOutput> {
        if glyphs.len() < 2 {
            return Ok(EngineOutput::default());
        }
        if self.store.is_empty() {
            return Err(EngineError::EmptyTrainingStore);
        }

        let mut out = EngineOutput::default();
        self.classify_batch(glyphs, options.max_recursion, 0, &mut out, progress)?;

        // Working set after classification: (input - removed) + added,
        // minus anything a split already resolved.
        let mut seen: HashSet<GlyphId> = HashSet::new();
        let working: Vec<GlyphRef> = glyphs
            .iter()
            .chain(out.added().iter())
            .filter(|g| {
                let g_ref = g.borrow();
                !out.is_removed(g_ref.id())
                    && seen.insert(g_ref.id())
                    && !g_ref.main_label().is_some_and(labels::is_split_resolved)
            })
            .cloned()
            .collect();

        let adj = build_adjacency(&working, options);
        let components = connected_components(&adj);
        progress.extend(components.len());
        for comp in components {
            if comp.len() > options.max_graph_size || comp.len() > MAX_SEARCHABLE_COMPONENT {
                debug!(size = comp.len(), "skipping oversized candidacy component");
                progress.step();
                continue;
            }
            if comp.len() >= 2 {
                self.merge_component(&working, &comp, &adj, options, &mut out)?;
            }
            progress.step();
        }
        progress.finish();
        out.normalize();
        Ok(out)
    }

    /// Exhaustive partition search over one candidacy component.
    ///
    /// Every connected subset of up to `max_parts_per_group` members is
    /// scored once; a dynamic program over bitmasks then picks the partition
    /// maximizing the total. Merged subsets scoring zero or less are
    /// structurally ineligible, so a vetoed union can never be chosen no
    /// matter how the alternatives score.
    fn merge_component(
        &self,
        working: &[GlyphRef],
        comp: &[usize],
        adj: &[Vec<usize>],
        options: &GroupingOptions,
        out: &mut EngineOutput,
    ) -> EngineResult<()> {
        let n = comp.len();
        let full: u32 = (1u32 << n) - 1;

        // adjacency restricted to the component, as bitmasks
        let mut ladj = vec![0u32; n];
        for (li, &gi) in comp.iter().enumerate() {
            for (lj, &gj) in comp.iter().enumerate() {
                if li != lj && adj[gi].contains(&gj) {
                    ladj[li] |= 1 << lj;
                }
            }
        }

        let mut scores = vec![f32::NEG_INFINITY; (full as usize) + 1];
        let mut unions: Vec<Option<GlyphRef>> = vec![None; (full as usize) + 1];
        for mask in 1..=full {
            let k = mask.count_ones() as usize;
            if k > options.max_parts_per_group {
                continue;
            }
            if k == 1 {
                let g = &working[comp[mask.trailing_zeros() as usize]];
                scores[mask as usize] = singleton_score(g);
                continue;
            }
            if !mask_connected(mask, &ladj) {
                continue;
            }
            let members = mask_members(mask, working, comp);
            match &options.eval {
                EvalPolicy::OracleConfidence => {
                    let (score, union) = self.evaluate_union(&members);
                    scores[mask as usize] = score;
                    unions[mask as usize] = union;
                }
                EvalPolicy::Custom(f) => {
                    scores[mask as usize] = f(&members);
                }
            }
        }

        // best[mask]: top total score for partitioning exactly `mask`;
        // choice[mask]: the subset containing mask's lowest bit that
        // achieves it. `>=` lets later (smaller) subsets win ties, so equal
        // scores fall back to the less-merged partition.
        let size = (full as usize) + 1;
        let mut best = vec![f32::NEG_INFINITY; size];
        let mut choice = vec![0u32; size];
        best[0] = 0.0;
        for mask in 1..=full {
            let low = mask & mask.wrapping_neg();
            let mut sub = mask;
            while sub != 0 {
                if sub & low != 0 {
                    let s = scores[sub as usize];
                    let eligible = if sub.count_ones() > 1 {
                        s > 0.0
                    } else {
                        s > f32::NEG_INFINITY
                    };
                    if eligible && best[(mask ^ sub) as usize] > f32::NEG_INFINITY {
                        let total = s + best[(mask ^ sub) as usize];
                        if total >= best[mask as usize] {
                            best[mask as usize] = total;
                            choice[mask as usize] = sub;
                        }
                    }
                }
                sub = (sub - 1) & mask;
            }
        }

        let mut mask = full;
        while mask != 0 {
            let sub = choice[mask as usize];
            debug_assert_ne!(sub, 0, "singleton scores keep every mask partitionable");
            if sub.count_ones() > 1 {
                let members = mask_members(sub, working, comp);
                self.apply_merge(members, unions[sub as usize].clone(), out)?;
            }
            mask ^= sub;
        }
        Ok(())
    }

    /// Scores a candidate union through the oracle.
    ///
    /// Every failure on this path resolves to a score of 0 so the search can
    /// keep evaluating alternatives; nothing here is an error.
    fn evaluate_union(&self, members: &[GlyphRef]) -> (f32, Option<GlyphRef>) {
        let union = match self.features.union_image(members) {
            Ok(u) => Rc::new(RefCell::new(u)),
            Err(e) => {
                debug!(error = %e, "union image failed; candidate scored 0");
                return (0.0, None);
            }
        };
        if let Err(e) = self.ensure_features(&union) {
            debug!(error = %e, "union features failed; candidate scored 0");
            return (0.0, None);
        }
        let hypotheses = match self.oracle.classify(&self.store, &union.borrow()) {
            Ok(h) => h,
            Err(e) => {
                debug!(error = %e, "union classification failed; candidate scored 0");
                return (0.0, None);
            }
        };
        union.borrow_mut().set_automatic(hypotheses);
        let verdict = {
            let g = union.borrow();
            g.main_hypothesis()
                .map(|h| (h.confidence, labels::is_group_veto(&h.label)))
        };
        match verdict {
            Some((_, true)) | None => (0.0, None),
            Some((confidence, false)) => (confidence, Some(union)),
        }
    }

    /// Adds the union glyph to the output and sentinels its members as
    /// consumed by the group
    fn apply_merge(
        &self,
        members: Vec<GlyphRef>,
        union: Option<GlyphRef>,
        out: &mut EngineOutput,
    ) -> EngineResult<()> {
        let union = match union {
            Some(u) => u,
            None => {
                // custom evaluator accepted the subset; classify the union now
                let u = Rc::new(RefCell::new(self.features.union_image(&members)?));
                self.ensure_features(&u)?;
                let hypotheses = {
                    let g = u.borrow();
                    self.oracle.classify(&self.store, &g)?
                };
                u.borrow_mut().set_automatic(hypotheses);
                u
            }
        };
        let (confidence, resolved) = {
            let g = union.borrow();
            (
                g.main_confidence(),
                g.main_label().unwrap_or(labels::ERROR_LABEL).to_string(),
            )
        };
        out.push_added(union.clone());

        let sentinel = labels::group_part_label(&resolved);
        for m in &members {
            {
                let mut g = m.borrow_mut();
                let state = match g.state() {
                    ClassificationState::Unclassified => ClassificationState::Automatic,
                    s => s,
                };
                g.set_hypotheses(vec![Hypothesis::new(confidence, sentinel.clone())], state);
                g.invalidate_features();
            }
            self.ensure_features(m)?;
        }
        Ok(())
    }
}

/// Adjacency lists under the pair-eligibility predicate
fn build_adjacency(working: &[GlyphRef], options: &GroupingOptions) -> Vec<Vec<usize>> {
    let n = working.len();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let eligible = options
                .grouping
                .eligible(&working[i].borrow(), &working[j].borrow());
            if eligible {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }
    adj
}

/// Connected components of the candidacy graph, by breadth-first search
fn connected_components(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut comp = vec![start];
        let mut frontier = vec![start];
        while let Some(i) = frontier.pop() {
            for &j in &adj[i] {
                if !visited[j] {
                    visited[j] = true;
                    comp.push(j);
                    frontier.push(j);
                }
            }
        }
        comp.sort_unstable();
        components.push(comp);
    }
    components
}

/// True when the masked vertices induce a connected subgraph
fn mask_connected(mask: u32, ladj: &[u32]) -> bool {
    let mut reached = mask & mask.wrapping_neg();
    loop {
        let mut next = reached;
        let mut bits = reached;
        while bits != 0 {
            let i = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            next |= ladj[i] & mask;
        }
        if next == reached {
            break;
        }
        reached = next;
    }
    reached == mask
}

/// The glyphs selected by a component-local bitmask
fn mask_members(mask: u32, working: &[GlyphRef], comp: &[usize]) -> Vec<GlyphRef> {
    let mut members = Vec::with_capacity(mask.count_ones() as usize);
    let mut bits = mask;
    while bits != 0 {
        let li = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        members.push(working[comp[li]].clone());
    }
    members
}

/// A singleton keeps its current confidence, unless a prior group already
/// consumed it
fn singleton_score(glyph: &GlyphRef) -> f32 {
    let g = glyph.borrow();
    match g.main_label() {
        Some(label) if labels::is_group_part(label) => 0.0,
        Some(_) => g.main_confidence(),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_components() {
        // 0-1, 2 alone, 3-4-5 chain
        let adj = vec![vec![1], vec![0], vec![], vec![4], vec![3, 5], vec![4]];
        let comps = connected_components(&adj);
        assert_eq!(comps, vec![vec![0, 1], vec![2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_mask_connected() {
        // path 0-1-2
        let ladj = vec![0b010, 0b101, 0b010];
        assert!(mask_connected(0b111, &ladj));
        assert!(mask_connected(0b011, &ladj));
        assert!(!mask_connected(0b101, &ladj)); // endpoints without the middle
        assert!(mask_connected(0b100, &ladj));
    }
}
