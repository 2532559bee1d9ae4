//! Grouping engine regression tests

mod common;

use std::rc::Rc;

use common::*;
use glyphos_core::{BBox, ClassificationState};
use glyphos_engine::{EvalPolicy, GroupingOptions, GroupingPolicy};

#[test]
fn test_single_glyph_request_is_a_noop() {
    let engine = seeded_engine(ScriptedOracle::new(vec![hyp(0.8, "lower.a")]));
    let g = solid_glyph(0, 0, 4, 4);
    let out = engine
        .group_many(&[g.clone()], &GroupingOptions::default())
        .unwrap();
    assert!(out.is_empty());
    // not even classified: the request itself is rejected
    assert_eq!(g.borrow().state(), ClassificationState::Unclassified);
}

#[test]
fn test_ligature_merge() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let union_bbox = BBox::new(0, 0, 9, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(a.borrow().bbox, vec![hyp(0.4, "lower.f")])
        .respond(b.borrow().bbox, vec![hyp(0.4, "lower.t")])
        .respond(union_bbox, vec![hyp(0.9, "ligature.ft")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[a.clone(), b.clone()], &GroupingOptions::default())
        .unwrap();

    assert!(out.removed().is_empty());
    assert_eq!(out.added().len(), 1);
    let union = out.added()[0].borrow();
    assert_eq!(union.bbox, union_bbox);
    assert_eq!(union.main_label(), Some("ligature.ft"));
    assert_eq!(union.main_confidence(), 0.9);
    assert_eq!(union.state(), ClassificationState::Automatic);

    for part in [&a, &b] {
        let part = part.borrow();
        assert_eq!(part.main_label(), Some("_group._part.ligature.ft"));
        assert_eq!(part.main_confidence(), 0.9);
    }
}

#[test]
fn test_group_veto_on_split_label() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(a.borrow().bbox, vec![hyp(0.1, "lower.f")])
        .respond(b.borrow().bbox, vec![hyp(0.1, "lower.t")])
        .respond(BBox::new(0, 0, 9, 6), vec![hyp(0.99, "_split.splitx")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[a.clone(), b.clone()], &GroupingOptions::default())
        .unwrap();

    // the vetoed union must never be selected, even though nothing else
    // scores higher
    assert!(out.added().is_empty());
    assert_eq!(a.borrow().main_label(), Some("lower.f"));
    assert_eq!(b.borrow().main_label(), Some("lower.t"));
}

#[test]
fn test_group_veto_on_skip_label() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(a.borrow().bbox, vec![hyp(0.1, "lower.f")])
        .respond(b.borrow().bbox, vec![hyp(0.1, "lower.t")])
        .respond(BBox::new(0, 0, 9, 6), vec![hyp(0.99, "skip.noise")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[a, b], &GroupingOptions::default())
        .unwrap();
    assert!(out.added().is_empty());
}

#[test]
fn test_tie_keeps_parts_separate() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(a.borrow().bbox, vec![hyp(0.4, "lower.f")])
        .respond(b.borrow().bbox, vec![hyp(0.4, "lower.t")])
        .respond(BBox::new(0, 0, 9, 6), vec![hyp(0.8, "ligature.ft")]);
    let engine = seeded_engine(oracle);

    // union confidence exactly equals the sum of the parts: no merge
    let out = engine
        .group_many(&[a.clone(), b.clone()], &GroupingOptions::default())
        .unwrap();
    assert!(out.added().is_empty());
    assert_eq!(a.borrow().main_label(), Some("lower.f"));
}

#[test]
fn test_distant_glyphs_never_paired() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(100, 0, 4, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.2, "lower.o")])
        .respond(BBox::new(0, 0, 104, 6), vec![hyp(0.99, "ligature.xx")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[a, b], &GroupingOptions::default())
        .unwrap();
    assert!(out.added().is_empty());
}

#[test]
fn test_three_way_merge() {
    let a = solid_glyph(0, 0, 4, 4);
    let b = solid_glyph(5, 2, 4, 4);
    let c = solid_glyph(10, 0, 4, 4);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(a.borrow().bbox, vec![hyp(0.2, "lower.u")])
        .respond(b.borrow().bbox, vec![hyp(0.2, "lower.v")])
        .respond(c.borrow().bbox, vec![hyp(0.2, "lower.w")])
        .respond(BBox::new(0, 0, 14, 6), vec![hyp(0.9, "ligature.uvw")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[a.clone(), b.clone(), c.clone()], &GroupingOptions::default())
        .unwrap();

    assert_eq!(out.added().len(), 1);
    assert_eq!(out.added()[0].borrow().main_label(), Some("ligature.uvw"));
    for part in [&a, &b, &c] {
        assert_eq!(
            part.borrow().main_label(),
            Some("_group._part.ligature.uvw")
        );
    }
}

#[test]
fn test_oversized_component_skipped() {
    let a = solid_glyph(0, 0, 4, 4);
    let b = solid_glyph(5, 0, 4, 4);
    let c = solid_glyph(10, 0, 4, 4);
    let oracle = ScriptedOracle::new(vec![hyp(0.2, "lower.o")]);
    let engine = seeded_engine(oracle);

    let options = GroupingOptions::default().with_max_graph_size(2);
    let out = engine.group_many(&[a, b, c], &options).unwrap();
    assert!(out.added().is_empty());
}

#[test]
fn test_split_guesses_excluded_from_grouping() {
    let parent = stacked_blobs(0, 0);
    let far = solid_glyph(100, 0, 3, 3);
    let oracle = ScriptedOracle::new(vec![hyp(0.2, "lower.o")])
        .respond(BBox::new(0, 0, 2, 10), vec![hyp(0.9, "_split.splity")])
        .respond(BBox::new(0, 0, 2, 2), vec![hyp(0.7, "lower.a")])
        .respond(BBox::new(0, 8, 2, 2), vec![hyp(0.7, "lower.b")]);
    let engine = seeded_engine(oracle);

    let out = engine
        .group_many(&[parent.clone(), far], &GroupingOptions::default())
        .unwrap();

    // classification expanded the split; grouping added nothing on top
    // (the children's union is the parent's box, which classifies as a
    // split and is therefore vetoed)
    assert_eq!(out.added().len(), 2);
    assert_eq!(ids(out.added()), ids(&parent.borrow().children));
    assert!(out.removed().is_empty());
}

#[test]
fn test_custom_grouping_policy() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(BBox::new(0, 0, 9, 6), vec![hyp(0.99, "ligature.ft")]);
    let engine = seeded_engine(oracle);

    let options = GroupingOptions::default()
        .with_grouping(GroupingPolicy::Custom(Rc::new(|_, _| false)));
    let out = engine.group_many(&[a, b], &options).unwrap();
    assert!(out.added().is_empty());
}

#[test]
fn test_custom_eval_policy() {
    let a = solid_glyph(0, 0, 4, 6);
    let b = solid_glyph(5, 0, 4, 6);
    let union_bbox = BBox::new(0, 0, 9, 6);
    let oracle = ScriptedOracle::new(vec![hyp(0.1, "junk")])
        .respond(union_bbox, vec![hyp(0.9, "ligature.ft")]);
    let engine = seeded_engine(oracle);

    // force the merge regardless of oracle confidence
    let options = GroupingOptions::default().with_eval(EvalPolicy::Custom(Rc::new(
        |members: &[glyphos_core::GlyphRef]| {
            if members.len() > 1 { 10.0 } else { 0.5 }
        },
    )));
    let out = engine.group_many(&[a.clone(), b], &options).unwrap();

    assert_eq!(out.added().len(), 1);
    // the union is still classified through the oracle when applied
    assert_eq!(out.added()[0].borrow().main_label(), Some("ligature.ft"));
    assert_eq!(a.borrow().main_label(), Some("_group._part.ligature.ft"));
}
