//! Error types for glyphos-core

use thiserror::Error;

/// Errors that can occur in the core data model
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempt to insert an unclassified glyph into the training store
    #[error("training store rejects unclassified glyphs")]
    UnclassifiedGlyph,

    /// Feature computation failed
    #[error("feature computation failed: {0}")]
    FeatureFailed(String),

    /// A pixel union was requested over an empty set of glyphs
    #[error("cannot form the union of zero glyphs")]
    EmptyUnion,
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
