//! Row-dropping transformers keyed on missing cells.

use crate::chunk::Chunk;
use crate::error::{Result, TabflowError};
use crate::transform::Transformer;

/// Removes every row containing at least one missing cell.
///
/// Idempotent: a second application is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropIncomplete;

impl DropIncomplete {
    /// Create the transformer.
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for DropIncomplete {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let keep: Vec<usize> = (0..chunk.num_rows())
            .filter(|&row| chunk.columns().iter().all(|c| !c.get(row).is_null()))
            .collect();
        if keep.len() == chunk.num_rows() {
            return Ok(chunk);
        }
        Ok(chunk.take_rows(&keep))
    }

    fn name(&self) -> &'static str {
        "drop_incomplete"
    }
}

/// Keeps a row iff its count of non-missing cells is at least
/// `threshold * column_count`, rounded up. The comparison is inclusive, so a
/// threshold of `1.0` is equivalent to [`DropIncomplete`] and `0.0` keeps
/// everything.
#[derive(Debug, Clone, Copy)]
pub struct DropBelowThreshold {
    threshold: f64,
}

impl DropBelowThreshold {
    /// Create the transformer with a completeness ratio in `[0, 1]`.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `threshold` is outside `[0, 1]` (NaN
    /// included).
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TabflowError::InvalidConfiguration(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    /// The configured completeness ratio.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Transformer for DropBelowThreshold {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let min_non_null = (self.threshold * chunk.num_columns() as f64).ceil() as usize;
        let keep: Vec<usize> = (0..chunk.num_rows())
            .filter(|&row| {
                let non_null = chunk
                    .columns()
                    .iter()
                    .filter(|c| !c.get(row).is_null())
                    .count();
                non_null >= min_non_null
            })
            .collect();
        if keep.len() == chunk.num_rows() {
            return Ok(chunk);
        }
        Ok(chunk.take_rows(&keep))
    }

    fn name(&self) -> &'static str {
        "drop_below_threshold"
    }
}
