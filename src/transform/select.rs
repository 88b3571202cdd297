//! Column projection: keep or drop named columns.

use crate::chunk::Chunk;
use crate::error::{Result, TabflowError};
use crate::transform::Transformer;
use tracing::warn;

#[derive(Debug, Clone)]
enum SelectMode {
    Keep(Vec<String>),
    Drop(Vec<String>),
}

/// Keeps exactly the named columns (in the given order) or drops exactly the
/// named columns (input order preserved). The two modes are mutually
/// exclusive.
///
/// Keeping an absent column is `ColumnNotFound`; dropping an absent column is
/// tolerated with a warning.
#[derive(Debug, Clone)]
pub struct SelectColumns {
    mode: SelectMode,
}

impl SelectColumns {
    /// Two-option constructor for configuration-driven assembly.
    ///
    /// # Errors
    /// `InvalidConfiguration` when both or neither list is given.
    pub fn new(keep: Option<Vec<String>>, drop: Option<Vec<String>>) -> Result<Self> {
        match (keep, drop) {
            (Some(names), None) => Ok(Self {
                mode: SelectMode::Keep(names),
            }),
            (None, Some(names)) => Ok(Self {
                mode: SelectMode::Drop(names),
            }),
            (Some(_), Some(_)) => Err(TabflowError::InvalidConfiguration(
                "keep and drop column lists are mutually exclusive".to_string(),
            )),
            (None, None) => Err(TabflowError::InvalidConfiguration(
                "either a keep list or a drop list is required".to_string(),
            )),
        }
    }

    /// Keep exactly `names`, in the given order.
    pub fn keep<S: Into<String>>(names: Vec<S>) -> Self {
        Self {
            mode: SelectMode::Keep(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Drop exactly `names`; remaining columns keep their input order.
    pub fn drop<S: Into<String>>(names: Vec<S>) -> Self {
        Self {
            mode: SelectMode::Drop(names.into_iter().map(Into::into).collect()),
        }
    }
}

impl Transformer for SelectColumns {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        match &self.mode {
            SelectMode::Keep(names) => {
                let mut columns = Vec::with_capacity(names.len());
                for name in names {
                    let col = chunk
                        .column(name)
                        .cloned()
                        .ok_or_else(|| TabflowError::ColumnNotFound(name.clone()))?;
                    columns.push(col);
                }
                Chunk::new(columns)
            }
            SelectMode::Drop(names) => {
                for name in names {
                    if chunk.column(name).is_none() {
                        warn!(column = %name, "cannot drop a column that is not present");
                    }
                }
                let columns = chunk
                    .into_columns()
                    .into_iter()
                    .filter(|c| !names.iter().any(|n| n == c.name()))
                    .collect();
                Chunk::new(columns)
            }
        }
    }

    fn name(&self) -> &'static str {
        "select_columns"
    }
}
