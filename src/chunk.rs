//! The in-memory table model: cells, columns, schemas, and chunks.
//!
//! A [`Chunk`] is one bounded fragment of the dataset: an ordered list of named
//! [`Column`]s whose rows align by position. Chunks are created by readers,
//! move by value through the transformer fold, and are consumed by writers —
//! no chunk outlives one iteration of the run loop.
//!
//! Invariants, enforced at construction:
//! - all columns of a chunk have the same length;
//! - column names are unique within a chunk;
//! - a column is homogeneous: every non-null cell matches the column's
//!   [`DataType`] (integers are widened when the declared type is `Float`).

use crate::error::{Result, TabflowError};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell. `Null` is the missing marker — distinct from an empty
/// string and from zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing cell.
    Null,
    /// 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Whether this cell is the missing marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type of a non-null cell, `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int),
            Value::Float(_) => Some(DataType::Float),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Text(_) => Some(DataType::Text),
        }
    }

    /// Numeric view of the cell: `Int` and `Float` cells convert, everything
    /// else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of the cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders the cell as a CSV field: `Null` becomes the empty field.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar (null, boolean, number, or string)")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> std::result::Result<Value, D::Error> {
                Deserialize::deserialize(deserializer)
            }

            fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(b))
            }

            fn visit_i64<E: de::Error>(self, i: i64) -> std::result::Result<Value, E> {
                Ok(Value::Int(i))
            }

            fn visit_u64<E: de::Error>(self, u: u64) -> std::result::Result<Value, E> {
                i64::try_from(u).map_or(Ok(Value::Float(u as f64)), |i| Ok(Value::Int(i)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<Value, E> {
                Ok(Value::Text(s.to_string()))
            }

            fn visit_string<E: de::Error>(self, s: String) -> std::result::Result<Value, E> {
                Ok(Value::Text(s))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Text(s) => serde_json::Value::from(s.clone()),
        }
    }
}

/// The type of a column's non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit integers.
    Int,
    /// 64-bit floats.
    Float,
    /// Booleans.
    Bool,
    /// UTF-8 text.
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A named, homogeneously-typed sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Vec<Value>,
}

impl Column {
    /// Build a column, validating homogeneity.
    ///
    /// `Int` cells are widened in place when `dtype` is `Float`; any other
    /// type disagreement is rejected.
    ///
    /// # Errors
    /// `InvalidConfiguration` if a non-null cell does not match `dtype`.
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        mut values: Vec<Value>,
    ) -> Result<Self> {
        let name = name.into();
        for v in &mut values {
            match (v.data_type(), dtype) {
                (None, _) => {}
                (Some(DataType::Int), DataType::Float) => {
                    if let Value::Int(i) = *v {
                        *v = Value::Float(i as f64);
                    }
                }
                (Some(t), expected) if t == expected => {}
                (Some(t), expected) => {
                    return Err(TabflowError::InvalidConfiguration(format!(
                        "column '{name}' declared {expected} but holds a {t} cell"
                    )));
                }
            }
        }
        Ok(Self {
            name,
            dtype,
            values,
        })
    }

    /// Integer column from optional values (`None` is a missing cell).
    pub fn ints(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Int,
            values: values
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Int))
                .collect(),
        }
    }

    /// Float column from optional values.
    pub fn floats(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Float,
            values: values
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Float))
                .collect(),
        }
    }

    /// Boolean column from optional values.
    pub fn bools(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Bool,
            values: values
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Bool))
                .collect(),
        }
    }

    /// Text column from optional values.
    pub fn texts<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Text,
            values: values
                .into_iter()
                .map(|v| v.map_or(Value::Null, |s| Value::Text(s.into())))
                .collect(),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared cell type.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// All cells in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cell at `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of range.
    pub fn get(&self, row: usize) -> &Value {
        &self.values[row]
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of non-null cells.
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }
}

/// The ordered list of column names identifying a chunk's shape.
///
/// Only names and their order participate in writer-side validation; cell
/// types do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema(Vec<String>);

impl Schema {
    /// Schema from an ordered name list.
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for Schema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One in-memory table fragment of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    columns: Vec<Column>,
}

impl Chunk {
    /// Build a chunk, validating equal column lengths and unique names.
    ///
    /// # Errors
    /// `InvalidConfiguration` on ragged columns or a duplicated name.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for col in &columns {
                if col.len() != rows {
                    return Err(TabflowError::InvalidConfiguration(format!(
                        "column '{}' has {} rows, expected {}",
                        col.name(),
                        col.len(),
                        rows
                    )));
                }
            }
            for (i, col) in columns.iter().enumerate() {
                if columns[..i].iter().any(|c| c.name() == col.name()) {
                    return Err(TabflowError::InvalidConfiguration(format!(
                        "duplicate column name '{}'",
                        col.name()
                    )));
                }
            }
        }
        Ok(Self { columns })
    }

    /// A chunk with no columns and no rows.
    pub fn empty() -> Self {
        Self { columns: Vec::new() }
    }

    /// Number of rows (all columns agree by invariant).
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The ordered column-name schema.
    pub fn schema(&self) -> Schema {
        self.columns.iter().map(Column::name).collect()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consume the chunk into its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Positional index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// New chunk keeping exactly the rows at `indices`, in the given order.
    /// Column names, order, and dtypes are preserved.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn take_rows(&self, indices: &[usize]) -> Chunk {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Chunk { columns }
    }
}
