//! Text normalization.

use crate::chunk::{Chunk, Column, DataType, Value};
use crate::error::Result;
use crate::transform::Transformer;

/// Trims leading/trailing whitespace and lowercases every value of every text
/// column. Non-text columns pass through byte-identical; a chunk without text
/// columns passes through unchanged. Idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeText;

impl NormalizeText {
    /// Create the transformer.
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for NormalizeText {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        if !chunk.columns().iter().any(|c| c.dtype() == DataType::Text) {
            return Ok(chunk);
        }
        let columns = chunk
            .into_columns()
            .into_iter()
            .map(|col| {
                if col.dtype() != DataType::Text {
                    return Ok(col);
                }
                let name = col.name().to_string();
                let values = col
                    .values()
                    .iter()
                    .map(|v| match v {
                        Value::Text(s) => Value::Text(s.trim().to_lowercase()),
                        other => other.clone(),
                    })
                    .collect();
                Column::new(name, DataType::Text, values)
            })
            .collect::<Result<Vec<_>>>()?;
        Chunk::new(columns)
    }

    fn name(&self) -> &'static str {
        "normalize_text"
    }
}
