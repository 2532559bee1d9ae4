//! Glyphos - trainable document/glyph recognition toolkit
//!
//! Train a classifier on labeled image fragments ("glyphs", typically the
//! connected components of a scanned page), then run automatic recognition
//! over new pages. The engine handles:
//!
//! - Oracle-driven classification with bounded recursive splitting
//! - Combinatorial grouping of adjacent glyphs into compound glyphs
//! - Manual training with the same split/consistency machinery
//!
//! # Example
//!
//! ```
//! use glyphos::{BBox, Bitmap, ClassificationState, Glyph};
//!
//! let mut image = Bitmap::new(8, 8);
//! image.set(3, 3, true);
//! let glyph = Glyph::new_ref(BBox::new(10, 20, 8, 8), image);
//! assert_eq!(glyph.borrow().state(), ClassificationState::Unclassified);
//! assert_eq!(glyph.borrow().bbox.right(), 18);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use glyphos_core::*;

// Re-export the engine under its own module name and lift the main entry
// points to the crate root
pub use glyphos_engine as engine;
pub use glyphos_engine::{
    Engine, EngineError, EngineOutput, EngineResult, EvalPolicy, GroupingOptions, GroupingPolicy,
    Oracle, OracleError, ProgressObserver, SplitStrategy,
};
