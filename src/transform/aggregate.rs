//! Group-by aggregation over key columns.

use crate::chunk::{Chunk, Column, DataType, Value};
use crate::error::{Result, TabflowError};
use crate::transform::Transformer;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Aggregation functions applicable to a value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFn {
    /// Sum of numeric cells.
    Sum,
    /// Mean of numeric cells.
    Mean,
    /// Median of numeric cells.
    Median,
    /// Smallest cell (numeric or lexicographic).
    Min,
    /// Largest cell (numeric or lexicographic).
    Max,
    /// Count of non-missing cells.
    Count,
    /// Sample standard deviation of numeric cells.
    Std,
    /// Sample variance of numeric cells.
    Var,
    /// First non-missing cell in row order.
    First,
    /// Last non-missing cell in row order.
    Last,
}

impl AggFn {
    /// Name used for `<column>_<function>` output columns.
    pub fn name(self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Mean => "mean",
            AggFn::Median => "median",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Count => "count",
            AggFn::Std => "std",
            AggFn::Var => "var",
            AggFn::First => "first",
            AggFn::Last => "last",
        }
    }
}

/// One value column and the functions to apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    /// Value column name.
    pub column: String,
    /// Functions applied to the column, in output order.
    pub functions: Vec<AggFn>,
}

impl Aggregation {
    /// Convenience constructor.
    pub fn new(column: impl Into<String>, functions: Vec<AggFn>) -> Self {
        Self {
            column: column.into(),
            functions,
        }
    }
}

/// Groups rows by one or more key columns and applies aggregation functions
/// per value column, producing one output row per distinct key combination,
/// in first-seen key order.
///
/// Output columns are the key columns first, then each aggregation output in
/// configured order. A value column with exactly one function keeps its
/// original name; with several, outputs are named `<original>_<function>`.
#[derive(Debug, Clone)]
pub struct GroupByAggregate {
    keys: Vec<String>,
    aggregations: Vec<Aggregation>,
}

impl GroupByAggregate {
    /// Create the transformer.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the key list is empty, the aggregation list
    /// is empty, or any aggregation carries no functions. Column existence is
    /// checked per chunk at transform time (`ColumnNotFound`).
    pub fn new(keys: Vec<String>, aggregations: Vec<Aggregation>) -> Result<Self> {
        if keys.is_empty() {
            return Err(TabflowError::InvalidConfiguration(
                "at least one grouping column is required".to_string(),
            ));
        }
        if aggregations.is_empty() {
            return Err(TabflowError::InvalidConfiguration(
                "at least one aggregation is required".to_string(),
            ));
        }
        for agg in &aggregations {
            if agg.functions.is_empty() {
                return Err(TabflowError::InvalidConfiguration(format!(
                    "aggregation on '{}' names no functions",
                    agg.column
                )));
            }
        }
        Ok(Self { keys, aggregations })
    }
}

/// Hashable projection of a cell, for grouping.
#[derive(PartialEq, Eq, Hash, Clone)]
enum KeyCell {
    Null,
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Text(String),
}

impl From<&Value> for KeyCell {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => KeyCell::Null,
            Value::Int(i) => KeyCell::Int(*i),
            Value::Float(f) => KeyCell::Float(OrderedFloat(*f)),
            Value::Bool(b) => KeyCell::Bool(*b),
            Value::Text(s) => KeyCell::Text(s.clone()),
        }
    }
}

impl Transformer for GroupByAggregate {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let key_idx: Vec<usize> = self
            .keys
            .iter()
            .map(|name| {
                chunk
                    .column_index(name)
                    .ok_or_else(|| TabflowError::ColumnNotFound(name.clone()))
            })
            .collect::<Result<_>>()?;
        let agg_idx: Vec<usize> = self
            .aggregations
            .iter()
            .map(|agg| {
                chunk
                    .column_index(&agg.column)
                    .ok_or_else(|| TabflowError::ColumnNotFound(agg.column.clone()))
            })
            .collect::<Result<_>>()?;

        // group row indices by key combination, first-seen order
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut lookup: HashMap<Vec<KeyCell>, usize> = HashMap::new();
        for row in 0..chunk.num_rows() {
            let key: Vec<KeyCell> = key_idx
                .iter()
                .map(|&i| KeyCell::from(chunk.columns()[i].get(row)))
                .collect();
            match lookup.entry(key) {
                Entry::Occupied(e) => groups[*e.get()].push(row),
                Entry::Vacant(e) => {
                    e.insert(groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        let mut out = Vec::with_capacity(key_idx.len() + agg_idx.len());
        for &i in &key_idx {
            let src = &chunk.columns()[i];
            let values = groups.iter().map(|rows| src.get(rows[0]).clone()).collect();
            out.push(Column::new(src.name(), src.dtype(), values)?);
        }
        for (agg, &i) in self.aggregations.iter().zip(&agg_idx) {
            let src = &chunk.columns()[i];
            for &f in &agg.functions {
                let name = if agg.functions.len() == 1 {
                    agg.column.clone()
                } else {
                    format!("{}_{}", agg.column, f.name())
                };
                let (dtype, values) = aggregate_column(src, &groups, f);
                out.push(Column::new(name, dtype, values)?);
            }
        }
        Chunk::new(out)
    }

    fn name(&self) -> &'static str {
        "group_by_aggregate"
    }
}

/// Apply one function to one source column across all groups.
fn aggregate_column(src: &Column, groups: &[Vec<usize>], f: AggFn) -> (DataType, Vec<Value>) {
    match f {
        AggFn::Count => {
            let values = groups
                .iter()
                .map(|rows| {
                    Value::Int(rows.iter().filter(|&&r| !src.get(r).is_null()).count() as i64)
                })
                .collect();
            (DataType::Int, values)
        }
        AggFn::Sum => {
            if src.dtype() == DataType::Int {
                let values = groups
                    .iter()
                    .map(|rows| {
                        let mut sum = 0i64;
                        let mut seen = false;
                        for &r in rows {
                            if let Value::Int(i) = src.get(r) {
                                sum += i;
                                seen = true;
                            }
                        }
                        if seen { Value::Int(sum) } else { Value::Null }
                    })
                    .collect();
                (DataType::Int, values)
            } else {
                let values = numeric_agg(src, groups, |nums| Some(nums.iter().sum()));
                (DataType::Float, values)
            }
        }
        AggFn::Mean => (
            DataType::Float,
            numeric_agg(src, groups, |nums| Some(mean_of(nums))),
        ),
        AggFn::Median => (
            DataType::Float,
            numeric_agg(src, groups, |nums| Some(median_of(nums))),
        ),
        AggFn::Std => (
            DataType::Float,
            numeric_agg(src, groups, |nums| variance_of(nums).map(f64::sqrt)),
        ),
        AggFn::Var => (DataType::Float, numeric_agg(src, groups, variance_of)),
        AggFn::Min => (src.dtype(), extremum(src, groups, Ordering::Less)),
        AggFn::Max => (src.dtype(), extremum(src, groups, Ordering::Greater)),
        AggFn::First => (
            src.dtype(),
            groups
                .iter()
                .map(|rows| {
                    rows.iter()
                        .map(|&r| src.get(r))
                        .find(|v| !v.is_null())
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect(),
        ),
        AggFn::Last => (
            src.dtype(),
            groups
                .iter()
                .map(|rows| {
                    rows.iter()
                        .rev()
                        .map(|&r| src.get(r))
                        .find(|v| !v.is_null())
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect(),
        ),
    }
}

/// Run `f` over each group's non-null numeric cells; groups without numeric
/// cells yield null.
fn numeric_agg(src: &Column, groups: &[Vec<usize>], f: impl Fn(&[f64]) -> Option<f64>) -> Vec<Value> {
    groups
        .iter()
        .map(|rows| {
            let nums: Vec<f64> = rows.iter().filter_map(|&r| src.get(r).as_f64()).collect();
            if nums.is_empty() {
                return Value::Null;
            }
            f(&nums).map_or(Value::Null, Value::Float)
        })
        .collect()
}

/// Per-group smallest/largest cell, keeping the source cell type.
fn extremum(src: &Column, groups: &[Vec<usize>], wanted: Ordering) -> Vec<Value> {
    groups
        .iter()
        .map(|rows| {
            let mut best: Option<&Value> = None;
            for &r in rows {
                let cell = src.get(r);
                if cell.is_null() {
                    continue;
                }
                best = Some(match best {
                    None => cell,
                    Some(current) => {
                        if cmp_cells(cell, current) == wanted {
                            cell
                        } else {
                            current
                        }
                    }
                });
            }
            best.cloned().unwrap_or(Value::Null)
        })
        .collect()
}

/// Total order between two cells of one homogeneous column.
fn cmp_cells(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn mean_of(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample variance; `None` below two observations.
fn variance_of(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean_of(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}
