//! Built-in transformers for the chunk pipeline.
//!
//! A [`Transformer`] is a pure function from one chunk to another, configured
//! once at construction and applied to every chunk of a run. The orchestrator
//! folds the configured list left to right, so order is semantically
//! significant (filtering before imputing changes results).
//!
//! The built-in set:
//!
//! - [`DropIncomplete`] -- remove rows with any missing cell.
//! - [`DropBelowThreshold`] -- remove rows below a completeness ratio.
//! - [`NormalizeText`] -- trim and lowercase every text column.
//! - [`ImputeNumeric`] -- fill missing numeric cells (mean/median/mode).
//! - [`ImputeText`] -- fill missing text cells (mode or fixed default).
//! - [`FilterRows`] -- keep rows matching a comparison or a predicate.
//! - [`SelectColumns`] -- keep or drop named columns.
//! - [`GroupByAggregate`] -- group by key columns and aggregate values.

use crate::chunk::Chunk;
use crate::error::Result;

mod aggregate;
mod filter;
mod impute;
mod missing;
mod select;
mod text;

pub use aggregate::{AggFn, Aggregation, GroupByAggregate};
pub use filter::{FilterOp, FilterRows, FilterValue};
pub use impute::{ImputeNumeric, ImputeText, NumericStrategy, TextStrategy};
pub use missing::{DropBelowThreshold, DropIncomplete};
pub use select::SelectColumns;
pub use text::NormalizeText;

/// A configured chunk-to-chunk transformation.
///
/// Implementations must be pure given their fixed configuration: no state
/// outside the chunk, no reordering of unrelated columns unless that is the
/// transformer's stated purpose.
pub trait Transformer {
    /// Apply the transformation, consuming the chunk.
    fn transform(&self, chunk: Chunk) -> Result<Chunk>;

    /// Stable name used in logs.
    fn name(&self) -> &'static str;
}

impl Transformer for Box<dyn Transformer> {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        (**self).transform(chunk)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
