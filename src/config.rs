//! Pipeline assembly from a JSON specification.
//!
//! A [`PipelineSpec`] is the serializable description of a run: which reader,
//! which transformers in which order, which writer. Deserialization picks the
//! concrete component through tagged variants, and [`PipelineSpec::build`]
//! funnels every constructor through the normal error taxonomy, so a spec
//! with a bad threshold or an unknown strategy fails before any file is
//! touched.
//!
//! ```json
//! {
//!   "reader": { "format": "csv", "chunk_size": 500 },
//!   "transformers": [
//!     { "op": "drop_incomplete" },
//!     { "op": "normalize_text" },
//!     { "op": "filter_rows", "column": "age", "operator": ">", "value": 30 }
//!   ],
//!   "writer": { "format": "jsonl" }
//! }
//! ```

use crate::error::{Result, TabflowError};
use crate::io::csv::{CsvReader, CsvWriter};
use crate::io::json::{JsonReader, JsonlWriter};
use crate::io::{Reader, Writer};
use crate::orchestrator::Orchestrator;
use crate::transform::{
    Aggregation, DropBelowThreshold, DropIncomplete, FilterOp, FilterRows, FilterValue,
    GroupByAggregate, ImputeNumeric, ImputeText, NormalizeText, NumericStrategy, SelectColumns,
    TextStrategy, Transformer,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable description of a whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Source configuration.
    pub reader: ReaderSpec,
    /// Ordered transformer chain.
    #[serde(default)]
    pub transformers: Vec<TransformerSpec>,
    /// Destination configuration.
    pub writer: WriterSpec,
}

/// Reader selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ReaderSpec {
    /// Chunked CSV source.
    Csv {
        /// Rows per chunk.
        chunk_size: usize,
    },
    /// Whole-file JSON array source.
    Json,
}

/// Writer selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum WriterSpec {
    /// Appending CSV destination.
    Csv,
    /// Appending JSON-lines destination.
    Jsonl,
}

/// One transformer, tagged by operation name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformerSpec {
    /// [`DropIncomplete`].
    DropIncomplete,
    /// [`DropBelowThreshold`].
    DropBelowThreshold {
        /// Completeness ratio in `[0, 1]`.
        threshold: f64,
    },
    /// [`NormalizeText`].
    NormalizeText,
    /// [`ImputeNumeric`].
    ImputeNumeric {
        /// Fill strategy.
        strategy: NumericStrategy,
    },
    /// [`ImputeText`].
    ImputeText {
        /// Fill strategy.
        strategy: TextStrategy,
        /// Literal for the `default` strategy.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    /// [`FilterRows`], comparison form. The predicate form is code-only.
    FilterRows {
        /// Column the comparison applies to.
        column: String,
        /// Comparison operator (`==`, `!=`, `>`, `<`, `>=`, `<=`, `in`,
        /// `not_in`, `contains`).
        operator: FilterOp,
        /// Scalar, or list for the membership operators.
        value: FilterValue,
    },
    /// [`SelectColumns`].
    SelectColumns {
        /// Columns to keep, in order.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keep: Option<Vec<String>>,
        /// Columns to drop.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        drop: Option<Vec<String>>,
    },
    /// [`GroupByAggregate`].
    GroupByAggregate {
        /// Grouping key columns.
        keys: Vec<String>,
        /// Value columns with their functions.
        aggregations: Vec<Aggregation>,
    },
}

impl PipelineSpec {
    /// Load a spec from a JSON file.
    ///
    /// # Errors
    /// `NotFound` if the file is absent, `MalformedInput` if it does not
    /// parse as a pipeline spec.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TabflowError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a spec from a JSON string.
    ///
    /// # Errors
    /// `MalformedInput` on any parse failure, unknown `op` tags included.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TabflowError::MalformedInput(format!("pipeline spec: {e}")))
    }

    /// Serialize the spec as pretty JSON.
    ///
    /// # Errors
    /// Propagates serialization failures.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Assemble the described pipeline.
    ///
    /// # Errors
    /// Any constructor error from the described components, e.g.
    /// `InvalidConfiguration` for a zero chunk size or an out-of-range
    /// threshold.
    pub fn build(&self) -> Result<Orchestrator> {
        let reader: Box<dyn Reader> = match self.reader {
            ReaderSpec::Csv { chunk_size } => Box::new(CsvReader::new(chunk_size)?),
            ReaderSpec::Json => Box::new(JsonReader::new()),
        };
        let writer: Box<dyn Writer> = match self.writer {
            WriterSpec::Csv => Box::new(CsvWriter::new()),
            WriterSpec::Jsonl => Box::new(JsonlWriter::new()),
        };
        let mut orchestrator = Orchestrator::new(reader, writer);
        for spec in &self.transformers {
            orchestrator = orchestrator.with_transformer(spec.build()?);
        }
        Ok(orchestrator)
    }
}

impl TransformerSpec {
    /// Construct the described transformer.
    ///
    /// # Errors
    /// The component's own constructor errors.
    pub fn build(&self) -> Result<Box<dyn Transformer>> {
        Ok(match self {
            TransformerSpec::DropIncomplete => Box::new(DropIncomplete::new()),
            TransformerSpec::DropBelowThreshold { threshold } => {
                Box::new(DropBelowThreshold::new(*threshold)?)
            }
            TransformerSpec::NormalizeText => Box::new(NormalizeText::new()),
            TransformerSpec::ImputeNumeric { strategy } => Box::new(ImputeNumeric::new(*strategy)),
            TransformerSpec::ImputeText {
                strategy,
                default_value,
            } => Box::new(ImputeText::new(*strategy, default_value.clone())),
            TransformerSpec::FilterRows {
                column,
                operator,
                value,
            } => Box::new(FilterRows::comparison(
                column.clone(),
                *operator,
                value.clone(),
            )?),
            TransformerSpec::SelectColumns { keep, drop } => {
                Box::new(SelectColumns::new(keep.clone(), drop.clone())?)
            }
            TransformerSpec::GroupByAggregate { keys, aggregations } => {
                Box::new(GroupByAggregate::new(keys.clone(), aggregations.clone())?)
            }
        })
    }
}
