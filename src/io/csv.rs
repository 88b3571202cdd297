//! Chunked CSV reading and appending CSV writes.
//!
//! This module provides:
//! - [`CsvReader`] — streams a CSV file as fixed-size row chunks, inferring
//!   the field delimiter from a sample prefix and per-column cell types from
//!   each chunk's raw fields.
//! - [`CsvWriter`] — appends chunks to a destination, writing the header only
//!   when the file is created and rejecting any later chunk whose schema
//!   disagrees with the one on disk.
//!
//! # Notes
//! - Rows with the wrong field count are skipped with a warning, not fatal.
//! - An empty field is a missing cell, distinct from quoted empty text only
//!   as far as the inferred column type allows.
//! - Output always uses the `csv` crate's defaults (comma, standard quoting),
//!   regardless of the delimiter detected on the input side.

use crate::chunk::{Chunk, Column, DataType, Schema, Value};
use crate::error::{Result, TabflowError};
use crate::io::{ChunkStream, Reader, Writer};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bytes sampled from the head of the file for delimiter detection.
const SNIFF_BYTES: u64 = 4096;

/// Delimiter candidates, in preference order for ties.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Streams a CSV file in chunks of a fixed number of rows.
///
/// The last chunk holds the remainder when the row count is not a multiple of
/// `chunk_size`. Between chunks the reader keeps only the open CSV cursor.
#[derive(Debug, Clone)]
pub struct CsvReader {
    chunk_size: usize,
}

impl CsvReader {
    /// Create a reader yielding `chunk_size` rows per chunk.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(TabflowError::InvalidConfiguration(
                "chunk_size must be a positive number of rows".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    /// Rows per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Reader for CsvReader {
    fn read(&self, path: &Path) -> Result<ChunkStream> {
        if !path.exists() {
            return Err(TabflowError::NotFound(path.to_path_buf()));
        }
        let delimiter = detect_delimiter(path)?;
        debug!(
            path = %path.display(),
            delimiter = %(delimiter as char),
            "detected CSV delimiter"
        );
        let mut rdr = ReaderBuilder::new().delimiter(delimiter).from_path(path)?;
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| TabflowError::ParseError(format!("{}: {e}", path.display())))?
            .iter()
            .map(str::to_string)
            .collect();
        Ok(Box::new(CsvChunkStream {
            records: rdr.into_records(),
            headers,
            chunk_size: self.chunk_size,
            path: path.to_path_buf(),
            yielded: false,
            done: false,
        }))
    }
}

struct CsvChunkStream {
    records: csv::StringRecordsIntoIter<File>,
    headers: Vec<String>,
    chunk_size: usize,
    path: PathBuf,
    yielded: bool,
    done: bool,
}

impl Iterator for CsvChunkStream {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut rows = Vec::with_capacity(self.chunk_size);
        while rows.len() < self.chunk_size {
            match self.records.next() {
                None => break,
                Some(Ok(record)) => rows.push(record),
                Some(Err(e)) => {
                    if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) {
                        warn!(path = %self.path.display(), error = %e, "skipping malformed CSV row");
                        continue;
                    }
                    self.done = true;
                    return Some(Err(TabflowError::ParseError(format!(
                        "{}: {e}",
                        self.path.display()
                    ))));
                }
            }
        }
        if rows.is_empty() {
            self.done = true;
            if !self.yielded {
                return Some(Err(TabflowError::EmptyData(self.path.clone())));
            }
            return None;
        }
        self.yielded = true;
        Some(build_chunk(&self.headers, &rows))
    }
}

/// Infer the field delimiter from a fixed-size prefix of the file.
///
/// Counts occurrences of each candidate in the sample and takes the most
/// frequent, preferring earlier candidates on ties.
///
/// # Errors
/// `FormatError` if the sample is empty or no candidate occurs at all.
fn detect_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path)?;
    let mut sample = Vec::new();
    file.take(SNIFF_BYTES).read_to_end(&mut sample)?;
    if sample.is_empty() {
        return Err(TabflowError::FormatError(format!(
            "{}: file is empty, no delimiter sample available",
            path.display()
        )));
    }
    let mut best: Option<(u8, usize)> = None;
    for candidate in DELIMITER_CANDIDATES {
        let count = sample.iter().filter(|&&b| b == candidate).count();
        if count > 0 && best.is_none_or(|(_, c)| count > c) {
            best = Some((candidate, count));
        }
    }
    match best {
        Some((delimiter, _)) => Ok(delimiter),
        None => Err(TabflowError::FormatError(format!(
            "{}: could not infer a field delimiter",
            path.display()
        ))),
    }
}

/// Assemble one chunk from raw records, inferring a type per column.
fn build_chunk(headers: &[String], rows: &[csv::StringRecord]) -> Result<Chunk> {
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let fields: Vec<&str> = rows.iter().map(|r| r.get(idx).unwrap_or("")).collect();
        columns.push(infer_column(name, &fields)?);
    }
    Chunk::new(columns)
}

/// Unify the cell types observed in a column's raw fields and parse them.
///
/// Empty fields are nulls. All-int unifies to `Int`, an int/float mix widens
/// to `Float`, all-bool to `Bool`; any other mix falls back to `Text` with the
/// raw field text preserved verbatim. A column with no non-empty fields is
/// `Text`.
fn infer_column(name: &str, fields: &[&str]) -> Result<Column> {
    let mut unified: Option<DataType> = None;
    for &field in fields {
        if field.is_empty() {
            continue;
        }
        unified = Some(match (unified, classify(field)) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int), DataType::Float) | (Some(DataType::Float), DataType::Int) => {
                DataType::Float
            }
            _ => DataType::Text,
        });
    }
    let dtype = unified.unwrap_or(DataType::Text);
    let values = fields.iter().map(|&f| parse_cell(f, dtype)).collect();
    Column::new(name, dtype, values)
}

fn classify(field: &str) -> DataType {
    if field.parse::<i64>().is_ok() {
        DataType::Int
    } else if field.parse::<f64>().is_ok() {
        DataType::Float
    } else if field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false") {
        DataType::Bool
    } else {
        DataType::Text
    }
}

fn parse_cell(field: &str, dtype: DataType) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    match dtype {
        // The fallbacks are unreachable: dtype was unified over these fields.
        DataType::Int => field.parse().map_or(Value::Null, Value::Int),
        DataType::Float => field.parse().map_or(Value::Null, Value::Float),
        DataType::Bool => Value::Bool(field.eq_ignore_ascii_case("true")),
        DataType::Text => Value::Text(field.to_string()),
    }
}

/// Appends chunks to a CSV destination.
///
/// The header row is written only when the file is created (or found empty).
/// Every later write reads back just the existing header and compares column
/// names and order against the incoming chunk before touching the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    /// Create a CSV writer.
    pub fn new() -> Self {
        Self
    }
}

impl Writer for CsvWriter {
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
        if let Some(on_disk) = destination_schema(path)? {
            if on_disk != schema {
                return Err(TabflowError::SchemaMismatch {
                    expected: on_disk,
                    found: schema,
                });
            }
            let file = OpenOptions::new().append(true).open(path)?;
            let mut wtr = WriterBuilder::new().from_writer(file);
            write_rows(&mut wtr, chunk)?;
        } else {
            let file = File::create(path)?;
            let mut wtr = WriterBuilder::new().from_writer(file);
            wtr.write_record(schema.names())?;
            write_rows(&mut wtr, chunk)?;
        }
        Ok(chunk.num_rows())
    }
}

fn write_rows<W: std::io::Write>(wtr: &mut csv::Writer<W>, chunk: &Chunk) -> Result<()> {
    for row in 0..chunk.num_rows() {
        wtr.write_record(chunk.columns().iter().map(|c| c.get(row).to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read back only the destination's header row, if the file exists and is
/// non-empty.
fn destination_schema(path: &Path) -> Result<Option<Schema>> {
    match std::fs::metadata(path) {
        Err(_) => return Ok(None),
        Ok(meta) if meta.len() == 0 => return Ok(None),
        Ok(_) => {}
    }
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let headers = rdr
        .headers()
        .map_err(|e| TabflowError::ParseError(format!("{}: {e}", path.display())))?;
    Ok(Some(headers.iter().collect()))
}
