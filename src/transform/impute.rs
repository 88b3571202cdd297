//! Missing-value imputation for numeric and text columns.

use crate::chunk::{Chunk, Column, DataType, Value};
use crate::error::{Result, TabflowError};
use crate::transform::Transformer;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Fill policy for numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericStrategy {
    /// Arithmetic mean of the column's non-missing values.
    Mean,
    /// Median of the column's non-missing values.
    Median,
    /// Most frequent non-missing value (first seen wins ties).
    Mode,
}

impl FromStr for NumericStrategy {
    type Err = TabflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "mode" => Ok(Self::Mode),
            other => Err(TabflowError::InvalidConfiguration(format!(
                "unknown imputation strategy: {other}"
            ))),
        }
    }
}

/// Fill policy for text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStrategy {
    /// Most frequent non-missing value (first seen wins ties).
    Mode,
    /// A fixed literal, supplied separately.
    Default,
}

impl FromStr for TextStrategy {
    type Err = TabflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mode" => Ok(Self::Mode),
            "default" => Ok(Self::Default),
            other => Err(TabflowError::InvalidConfiguration(format!(
                "unknown imputation strategy: {other}"
            ))),
        }
    }
}

/// Replaces missing cells in every numeric column with a value computed from
/// the chunk's non-missing values.
///
/// Mean and median fills widen `Int` columns to `Float` (the fill value is
/// generally fractional); mode preserves the column type. Columns with no
/// non-missing values pass through untouched.
///
/// An invalid strategy is rejected at construction: the enum makes a bad
/// strategy unrepresentable past the string boundary
/// ([`ImputeNumeric::from_name`]).
#[derive(Debug, Clone, Copy)]
pub struct ImputeNumeric {
    strategy: NumericStrategy,
}

impl ImputeNumeric {
    /// Create the transformer with a fill strategy.
    pub fn new(strategy: NumericStrategy) -> Self {
        Self { strategy }
    }

    /// Create the transformer from a strategy name.
    ///
    /// # Errors
    /// `InvalidConfiguration` for anything but `mean`, `median`, `mode`.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// The configured strategy.
    pub fn strategy(&self) -> NumericStrategy {
        self.strategy
    }
}

impl Transformer for ImputeNumeric {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let columns = chunk
            .into_columns()
            .into_iter()
            .map(|col| {
                if !matches!(col.dtype(), DataType::Int | DataType::Float) {
                    return Ok(col);
                }
                if col.non_null_count() == col.len() || col.non_null_count() == 0 {
                    return Ok(col);
                }
                match self.strategy {
                    NumericStrategy::Mean => fill_float(col, mean),
                    NumericStrategy::Median => fill_float(col, median),
                    NumericStrategy::Mode => {
                        // mode of a homogeneous column keeps the column type
                        let fill = mode_cells(col.values());
                        let Some(fill) = fill else { return Ok(col) };
                        let name = col.name().to_string();
                        let dtype = col.dtype();
                        let values = col
                            .values()
                            .iter()
                            .map(|v| if v.is_null() { fill.clone() } else { v.clone() })
                            .collect();
                        Column::new(name, dtype, values)
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Chunk::new(columns)
    }

    fn name(&self) -> &'static str {
        "impute_numeric"
    }
}

/// Replace nulls with `stat` over the non-null values, widening to `Float`.
fn fill_float(col: Column, stat: fn(&[f64]) -> f64) -> Result<Column> {
    let numbers: Vec<f64> = col.values().iter().filter_map(Value::as_f64).collect();
    let fill = stat(&numbers);
    let name = col.name().to_string();
    let values = col
        .values()
        .iter()
        .map(|v| {
            if v.is_null() {
                Value::Float(fill)
            } else {
                v.clone()
            }
        })
        .collect();
    Column::new(name, DataType::Float, values)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent non-null cell; first-seen order breaks ties.
fn mode_cells(values: &[Value]) -> Option<Value> {
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }
    let mut best: Option<(&Value, usize)> = None;
    for (v, n) in counts {
        if best.is_none_or(|(_, bn)| n > bn) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.clone())
}

/// Replaces missing cells in every text column, either with the column's most
/// frequent value or with a fixed literal.
///
/// Configuring the `default` strategy without a default value is a
/// configuration warning, not fatal: the transformer then leaves text columns
/// unchanged rather than conflating missing cells with empty strings.
#[derive(Debug, Clone)]
pub struct ImputeText {
    strategy: TextStrategy,
    default_value: Option<String>,
}

impl ImputeText {
    /// Create the transformer. `default_value` is only consulted by the
    /// `Default` strategy.
    pub fn new(strategy: TextStrategy, default_value: Option<String>) -> Self {
        if strategy == TextStrategy::Default && default_value.is_none() {
            warn!("text imputation configured with 'default' strategy but no default value");
        }
        Self {
            strategy,
            default_value,
        }
    }

    /// Create the transformer from a strategy name.
    ///
    /// # Errors
    /// `InvalidConfiguration` for anything but `mode`, `default`.
    pub fn from_name(name: &str, default_value: Option<String>) -> Result<Self> {
        Ok(Self::new(name.parse()?, default_value))
    }

    /// The configured strategy.
    pub fn strategy(&self) -> TextStrategy {
        self.strategy
    }
}

impl Transformer for ImputeText {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let columns = chunk
            .into_columns()
            .into_iter()
            .map(|col| {
                if col.dtype() != DataType::Text || col.non_null_count() == col.len() {
                    return Ok(col);
                }
                let fill = match self.strategy {
                    TextStrategy::Mode => mode_cells(col.values()),
                    TextStrategy::Default => {
                        self.default_value.as_ref().map(|s| Value::Text(s.clone()))
                    }
                };
                let Some(fill) = fill else { return Ok(col) };
                let name = col.name().to_string();
                let values = col
                    .values()
                    .iter()
                    .map(|v| if v.is_null() { fill.clone() } else { v.clone() })
                    .collect();
                Column::new(name, DataType::Text, values)
            })
            .collect::<Result<Vec<_>>>()?;
        Chunk::new(columns)
    }

    fn name(&self) -> &'static str {
        "impute_text"
    }
}
