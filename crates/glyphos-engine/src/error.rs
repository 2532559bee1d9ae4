//! Error types for glyphos-engine

use thiserror::Error;

use crate::oracle::OracleError;

/// Errors surfaced by the classification, grouping and manual-training
/// entry points.
///
/// Segmentation failures never appear here: they are recovered locally via
/// label demotion. Exceeding a recursion or graph-size bound is silent
/// truncation, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Classification requested against an empty training store
    #[error("the training store is empty")]
    EmptyTrainingStore,

    /// A label referenced a split strategy that does not exist.
    ///
    /// This is a configuration error: it indicates malformed training data.
    #[error("unknown split strategy: {0}")]
    UnknownSplitStrategy(String),

    /// A `_group` label was passed to the single-glyph manual entry point
    #[error("group labels require the batch entry point: {0}")]
    GroupLabelRequiresBatch(String),

    /// A label was malformed (e.g. a group label with no suffix)
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// Core data-model error
    #[error("core error: {0}")]
    Core(#[from] glyphos_core::CoreError),

    /// Classification oracle error
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
