//! Classification oracle seam
//!
//! The underlying pattern-classification algorithm (nearest neighbor or
//! otherwise) lives behind this trait; the engine only depends on its
//! contract: given the training store and a glyph with current features,
//! return label hypotheses. Results must be deterministic for an unchanged
//! store and unchanged features.

use glyphos_core::{Glyph, Hypothesis, TrainingStore};
use thiserror::Error;

/// Errors an oracle implementation may report
#[derive(Debug, Error)]
pub enum OracleError {
    /// The training store holds no glyphs to compare against
    #[error("cannot classify against an empty training store")]
    EmptyStore,

    /// Implementation-specific failure
    #[error("classification failed: {0}")]
    Failed(String),
}

/// External classification collaborator
pub trait Oracle {
    /// Guesses labels for `glyph` using `store` as the knowledge base.
    ///
    /// The returned hypotheses need not be sorted; the engine pins the
    /// descending-confidence order itself.
    fn classify(&self, store: &TrainingStore, glyph: &Glyph)
    -> Result<Vec<Hypothesis>, OracleError>;
}
