//! Testing utilities for pipeline code.
//!
//! This module provides what the crate's own tests use and what embedding
//! code needs to test custom transformers:
//!
//! - **Builders**: [`ChunkBuilder`] constructs chunks fluently.
//! - **Assertions**: [`assert_chunks_equal`] and [`assert_schema`] compare
//!   pipeline outputs with expected results, with detailed panic messages.
//! - **Fixtures**: [`sample_csv`] / [`sample_json`] write source material to a
//!   temporary directory and hand back the live guard plus the file path.
//!
//! # Example
//!
//! ```
//! use tabflow::testing::*;
//!
//! let chunk = ChunkBuilder::new()
//!     .with_ints("id", vec![Some(1), Some(2)])
//!     .with_texts("name", vec![Some("a"), None])
//!     .build();
//! assert_schema(&chunk, &["id", "name"]);
//! ```

use crate::chunk::{Chunk, Column};
use std::path::PathBuf;
use tempfile::TempDir;

/// A fluent builder for test chunks.
#[derive(Default)]
pub struct ChunkBuilder {
    columns: Vec<Column>,
}

impl ChunkBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integer column; `None` cells are missing.
    #[must_use]
    pub fn with_ints(mut self, name: &str, values: Vec<Option<i64>>) -> Self {
        self.columns.push(Column::ints(name, values));
        self
    }

    /// Add a float column; `None` cells are missing.
    #[must_use]
    pub fn with_floats(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.columns.push(Column::floats(name, values));
        self
    }

    /// Add a boolean column; `None` cells are missing.
    #[must_use]
    pub fn with_bools(mut self, name: &str, values: Vec<Option<bool>>) -> Self {
        self.columns.push(Column::bools(name, values));
        self
    }

    /// Add a text column; `None` cells are missing.
    #[must_use]
    pub fn with_texts(mut self, name: &str, values: Vec<Option<&str>>) -> Self {
        self.columns.push(Column::texts(name, values));
        self
    }

    /// Add an already-built column.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Build the chunk.
    ///
    /// # Panics
    /// Panics if the accumulated columns violate the chunk invariants
    /// (ragged lengths or duplicate names) — a bug in the test itself.
    pub fn build(self) -> Chunk {
        Chunk::new(self.columns).expect("test chunk violates chunk invariants")
    }
}

/// Assert that two chunks are equal in schema, types, and cells.
///
/// # Panics
/// Panics with a detailed message on the first difference.
pub fn assert_chunks_equal(actual: &Chunk, expected: &Chunk) {
    assert_eq!(
        actual.schema(),
        expected.schema(),
        "Schema mismatch:\n  Expected: [{}]\n  Actual:   [{}]",
        expected.schema(),
        actual.schema()
    );
    assert_eq!(
        actual.num_rows(),
        expected.num_rows(),
        "Row count mismatch: expected {}, got {}",
        expected.num_rows(),
        actual.num_rows()
    );
    for (a, e) in actual.columns().iter().zip(expected.columns()) {
        assert_eq!(
            a.dtype(),
            e.dtype(),
            "Type mismatch in column '{}': expected {}, got {}",
            e.name(),
            e.dtype(),
            a.dtype()
        );
        for (row, (av, ev)) in a.values().iter().zip(e.values()).enumerate() {
            assert_eq!(
                av,
                ev,
                "Cell mismatch in column '{}' row {row}:\n  Expected: {ev:?}\n  Actual:   {av:?}",
                e.name()
            );
        }
    }
}

/// Assert a chunk's column names and order.
///
/// # Panics
/// Panics if the schema differs.
pub fn assert_schema(chunk: &Chunk, names: &[&str]) {
    let actual: Vec<&str> = chunk.columns().iter().map(Column::name).collect();
    assert_eq!(
        actual, names,
        "Schema mismatch:\n  Expected: {names:?}\n  Actual:   {actual:?}"
    );
}

/// Write CSV source material into a fresh temporary directory.
///
/// Returns the directory guard (keep it alive for the duration of the test)
/// and the file path.
///
/// # Panics
/// Panics if the temporary directory or file cannot be created.
pub fn sample_csv(contents: &str) -> (TempDir, PathBuf) {
    sample_file("input.csv", contents)
}

/// Write JSON source material into a fresh temporary directory.
///
/// # Panics
/// Panics if the temporary directory or file cannot be created.
pub fn sample_json(contents: &str) -> (TempDir, PathBuf) {
    sample_file("input.json", contents)
}

fn sample_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture file");
    (dir, path)
}
