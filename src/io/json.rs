//! Whole-file JSON reading and appending JSON-lines writes.
//!
//! This module provides:
//! - [`JsonReader`] — reads a JSON file holding one top-level array of flat
//!   objects into a single chunk (object keys become columns, in first-seen
//!   order). The whole document is parsed up front; the stream still yields
//!   exactly one chunk for interface uniformity with the chunked readers.
//! - [`JsonlWriter`] — appends one compact JSON object per row, newline
//!   delimited, no header. The schema guard parses the first existing line
//!   and compares its key order against the incoming chunk.

use crate::chunk::{Chunk, Column, DataType, Schema, Value};
use crate::error::{Result, TabflowError};
use crate::io::{ChunkStream, Reader, Writer};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write as _};
use std::path::Path;
use tracing::warn;

/// Reads a JSON array of uniform-keyed flat objects as one chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    /// Create a JSON reader. Whole-file readers take no chunk size.
    pub fn new() -> Self {
        Self
    }
}

impl Reader for JsonReader {
    fn read(&self, path: &Path) -> Result<ChunkStream> {
        if !path.exists() {
            return Err(TabflowError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let parsed: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| TabflowError::MalformedInput(format!("{}: {e}", path.display())))?;
        let Some(items) = parsed.as_array() else {
            return Err(TabflowError::MalformedInput(format!(
                "{}: expected a top-level JSON array",
                path.display()
            )));
        };
        if items.is_empty() {
            warn!(path = %path.display(), "JSON array is empty, yielding a zero-row chunk");
            return Ok(Box::new(std::iter::once(Ok(Chunk::empty()))));
        }
        let chunk = array_to_chunk(items, path)?;
        Ok(Box::new(std::iter::once(Ok(chunk))))
    }
}

/// Build the single chunk: keys become columns in first-seen order, keys
/// absent from a given object become nulls.
fn array_to_chunk(items: &[serde_json::Value], path: &Path) -> Result<Chunk> {
    let mut names: Vec<String> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            return Err(TabflowError::MalformedInput(format!(
                "{}: array element #{i} is not an object",
                path.display()
            )));
        };
        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }
    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let mut values = Vec::with_capacity(items.len());
        let mut unified: Option<DataType> = None;
        for (i, item) in items.iter().enumerate() {
            // as_object cannot fail here, every element was checked above
            let cell = match item.as_object().and_then(|obj| obj.get(name)) {
                None => Value::Null,
                Some(v) => scalar_cell(v, name, i, path)?,
            };
            if let Some(t) = cell.data_type() {
                unified = Some(match (unified, t) {
                    (None, t) => t,
                    (Some(a), b) if a == b => a,
                    (Some(DataType::Int), DataType::Float)
                    | (Some(DataType::Float), DataType::Int) => DataType::Float,
                    (Some(a), b) => {
                        return Err(TabflowError::MalformedInput(format!(
                            "{}: column '{name}' mixes {a} and {b} values",
                            path.display()
                        )));
                    }
                });
            }
            values.push(cell);
        }
        columns.push(Column::new(
            name.clone(),
            unified.unwrap_or(DataType::Text),
            values,
        )?);
    }
    Chunk::new(columns)
}

fn scalar_cell(v: &serde_json::Value, name: &str, row: usize, path: &Path) -> Result<Value> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(TabflowError::MalformedInput(format!(
                    "{}: column '{name}' row {row}: unrepresentable number {n}",
                    path.display()
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(TabflowError::MalformedInput(format!(
                "{}: column '{name}' row {row}: objects must be flat",
                path.display()
            )))
        }
    }
}

/// Appends chunks as newline-delimited JSON, one compact object per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlWriter;

impl JsonlWriter {
    /// Create a JSON-lines writer.
    pub fn new() -> Self {
        Self
    }
}

impl Writer for JsonlWriter {
    fn write(&self, chunk: &Chunk, path: &Path) -> Result<usize> {
        if chunk.num_columns() == 0 {
            warn!(path = %path.display(), "chunk has no columns, nothing to write");
            return Ok(0);
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }
        let schema = chunk.schema();
        if let Some(on_disk) = destination_schema(path)?
            && on_disk != schema
        {
            return Err(TabflowError::SchemaMismatch {
                expected: on_disk,
                found: schema,
            });
        }
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut w = BufWriter::new(file);
        for row in 0..chunk.num_rows() {
            let mut obj = serde_json::Map::with_capacity(chunk.num_columns());
            for col in chunk.columns() {
                obj.insert(col.name().to_string(), col.get(row).into());
            }
            serde_json::to_writer(&mut w, &serde_json::Value::Object(obj))?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        Ok(chunk.num_rows())
    }
}

/// Parse the key order of the destination's first non-empty line, if any.
fn destination_schema(path: &Path) -> Result<Option<Schema>> {
    match std::fs::metadata(path) {
        Err(_) => return Ok(None),
        Ok(meta) if meta.len() == 0 => return Ok(None),
        Ok(_) => {}
    }
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| TabflowError::MalformedInput(format!("{}: {e}", path.display())))?;
        let Some(obj) = parsed.as_object() else {
            return Err(TabflowError::MalformedInput(format!(
                "{}: destination is not JSON-lines of objects",
                path.display()
            )));
        };
        return Ok(Some(obj.keys().map(String::as_str).collect()));
    }
    Ok(None)
}
