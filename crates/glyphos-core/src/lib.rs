//! Glyphos Core - Data model for the glyph recognition toolkit
//!
//! This crate provides the entities shared by the classification, splitting
//! and grouping engines:
//!
//! - [`Glyph`] / [`GlyphRef`] - an image region with label hypotheses,
//!   classification state, split-produced children and a feature cache
//! - [`BBox`] - integer rectangles in page coordinates
//! - [`Bitmap`] - minimal 1 bpp pixel storage
//! - [`TrainingStore`] - the labeled-glyph collection backing the oracle
//! - [`FeatureService`] - the seam to external feature/geometry computation,
//!   with [`BasicImageService`] as a bundled minimal implementation

pub mod bitmap;
pub mod error;
pub mod features;
pub mod geometry;
pub mod glyph;
pub mod store;

pub use bitmap::Bitmap;
pub use error::{CoreError, CoreResult};
pub use features::{BasicImageService, FeatureService};
pub use geometry::BBox;
pub use glyph::{ClassificationState, FeatureVector, Glyph, GlyphId, GlyphRef, Hypothesis};
pub use store::{StoreDiscipline, TrainingStore};
