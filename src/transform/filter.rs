//! Row filtering by comparison or arbitrary predicate.

use crate::chunk::{Chunk, Value};
use crate::error::{Result, TabflowError};
use crate::transform::Transformer;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operators supported by [`FilterRows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// Membership in a value list.
    In,
    /// Absence from a value list.
    NotIn,
    /// Substring match on text cells.
    Contains,
}

impl FilterOp {
    fn is_membership(self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Ge => ">=",
            FilterOp::Le => "<=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not_in",
            FilterOp::Contains => "contains",
        };
        f.write_str(symbol)
    }
}

impl FromStr for FilterOp {
    type Err = TabflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(FilterOp::Eq),
            "!=" => Ok(FilterOp::Ne),
            ">" => Ok(FilterOp::Gt),
            "<" => Ok(FilterOp::Lt),
            ">=" => Ok(FilterOp::Ge),
            "<=" => Ok(FilterOp::Le),
            "in" => Ok(FilterOp::In),
            "not_in" => Ok(FilterOp::NotIn),
            "contains" => Ok(FilterOp::Contains),
            other => Err(TabflowError::InvalidConfiguration(format!(
                "unsupported filter operator: {other}"
            ))),
        }
    }
}

impl Serialize for FilterOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FilterOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Right-hand side of a comparison: a scalar for the ordering operators, a
/// list for the membership operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// One comparison value.
    Single(Value),
    /// A list of values for `in` / `not_in`.
    List(Vec<Value>),
}

/// Per-row predicate over a chunk; receives the chunk and a row index.
pub type RowPredicate = Box<dyn Fn(&Chunk, usize) -> bool + Send + Sync>;

enum FilterRule {
    Comparison {
        column: String,
        op: FilterOp,
        value: FilterValue,
    },
    Predicate(RowPredicate),
}

/// Keeps rows satisfying either a column/operator/value comparison or an
/// arbitrary predicate — the two forms are mutually exclusive by
/// construction.
///
/// A missing cell never satisfies a comparison, `!=` and `not_in` included.
pub struct FilterRows {
    rule: FilterRule,
}

impl FilterRows {
    /// Comparison form: keep rows where `column op value` holds.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the column name is empty, a membership
    /// operator is given a scalar, or an ordering operator is given a list.
    pub fn comparison(
        column: impl Into<String>,
        op: FilterOp,
        value: FilterValue,
    ) -> Result<Self> {
        let column = column.into();
        if column.is_empty() {
            return Err(TabflowError::InvalidConfiguration(format!(
                "operator '{op}' requires a column name"
            )));
        }
        match (&value, op.is_membership()) {
            (FilterValue::Single(_), true) => {
                return Err(TabflowError::InvalidConfiguration(format!(
                    "operator '{op}' requires a list of values"
                )));
            }
            (FilterValue::List(_), false) => {
                return Err(TabflowError::InvalidConfiguration(format!(
                    "operator '{op}' takes a single comparison value"
                )));
            }
            _ => {}
        }
        Ok(Self {
            rule: FilterRule::Comparison { column, op, value },
        })
    }

    /// Predicate form: keep rows where `predicate(chunk, row)` is true.
    pub fn predicate(predicate: impl Fn(&Chunk, usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            rule: FilterRule::Predicate(Box::new(predicate)),
        }
    }
}

impl fmt::Debug for FilterRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            FilterRule::Comparison { column, op, value } => f
                .debug_struct("FilterRows")
                .field("column", column)
                .field("op", op)
                .field("value", value)
                .finish(),
            FilterRule::Predicate(_) => f.debug_struct("FilterRows").finish_non_exhaustive(),
        }
    }
}

impl Transformer for FilterRows {
    fn transform(&self, chunk: Chunk) -> Result<Chunk> {
        let keep: Vec<usize> = match &self.rule {
            FilterRule::Comparison { column, op, value } => {
                let col = chunk
                    .column(column)
                    .ok_or_else(|| TabflowError::ColumnNotFound(column.clone()))?;
                (0..chunk.num_rows())
                    .filter(|&row| cell_matches(col.get(row), *op, value))
                    .collect()
            }
            FilterRule::Predicate(predicate) => (0..chunk.num_rows())
                .filter(|&row| predicate(&chunk, row))
                .collect(),
        };
        if keep.len() == chunk.num_rows() {
            return Ok(chunk);
        }
        Ok(chunk.take_rows(&keep))
    }

    fn name(&self) -> &'static str {
        "filter_rows"
    }
}

fn cell_matches(cell: &Value, op: FilterOp, value: &FilterValue) -> bool {
    if cell.is_null() {
        return false;
    }
    match (op, value) {
        (FilterOp::Eq, FilterValue::Single(v)) => values_equal(cell, v),
        (FilterOp::Ne, FilterValue::Single(v)) => !values_equal(cell, v),
        (FilterOp::Gt, FilterValue::Single(v)) => {
            compare(cell, v) == Some(Ordering::Greater)
        }
        (FilterOp::Lt, FilterValue::Single(v)) => compare(cell, v) == Some(Ordering::Less),
        (FilterOp::Ge, FilterValue::Single(v)) => {
            matches!(compare(cell, v), Some(Ordering::Greater | Ordering::Equal))
        }
        (FilterOp::Le, FilterValue::Single(v)) => {
            matches!(compare(cell, v), Some(Ordering::Less | Ordering::Equal))
        }
        (FilterOp::In, FilterValue::List(list)) => list.iter().any(|v| values_equal(cell, v)),
        (FilterOp::NotIn, FilterValue::List(list)) => {
            !list.iter().any(|v| values_equal(cell, v))
        }
        (FilterOp::Contains, FilterValue::Single(v)) => match (cell.as_str(), v.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        // arity mismatches are rejected at construction
        _ => false,
    }
}

/// Equality across cells, with `Int` and `Float` comparing numerically.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering across cells: numeric for numbers, lexicographic for text.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
