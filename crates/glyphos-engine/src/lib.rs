//! Glyphos Engine - classification, splitting and grouping
//!
//! The decision core of the recognition toolkit. Callers hand a batch of
//! glyphs to the [`Engine`]; it queries the classification [`Oracle`],
//! expands `"_split.<method>"` verdicts through the [`split`] strategies
//! under a bounded work queue, and searches adjacent-glyph combinations for
//! merges that classify better than their parts. Every operation reports its
//! effect as an [`EngineOutput`] of `(added, removed)` glyph collections;
//! the input collection is never mutated in place.
//!
//! # Example
//!
//! ```no_run
//! use glyphos_core::{BasicImageService, BBox, Bitmap, Glyph};
//! use glyphos_engine::{Engine, Oracle};
//!
//! fn run(oracle: Box<dyn Oracle>) -> glyphos_engine::EngineResult<()> {
//!     let engine = Engine::interactive(oracle, Box::new(BasicImageService));
//!     let page = vec![Glyph::new_ref(BBox::new(0, 0, 8, 8), Bitmap::new(8, 8))];
//!     let out = engine.classify_many(&page, 10)?;
//!     let _next: Vec<_> = page
//!         .iter()
//!         .filter(|g| !out.removed().iter().any(|r| r.borrow().id() == g.borrow().id()))
//!         .chain(out.added())
//!         .cloned()
//!         .collect();
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod error;
pub mod group;
pub mod labels;
pub mod manual;
pub mod oracle;
pub mod progress;
pub mod split;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use oracle::{Oracle, OracleError};
pub use progress::{CountingProgress, NoProgress, ProgressObserver};
pub use split::{SplitError, SplitStrategy, split};
pub use types::{
    DEFAULT_GROUP_MARGIN, DEFAULT_MAX_GRAPH_SIZE, DEFAULT_MAX_PARTS_PER_GROUP,
    DEFAULT_MAX_RECURSION, Engine, EngineOutput, EvalPolicy, GroupingOptions, GroupingPolicy,
    MAX_SEARCHABLE_COMPONENT,
};
