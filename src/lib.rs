//! # Tabflow
//!
//! A **batch ETL pipeline** for tabular data in Rust. Tabflow reads CSV or
//! JSON sources in bounded chunks, applies a configured sequence of
//! row/column transformations, and appends the result to a destination file
//! while validating schema consistency across writes.
//!
//! ## Key Features
//!
//! - **Chunked streaming** - CSV sources are processed a bounded number of
//!   rows at a time; memory use is independent of file size
//! - **Composable transformers** - drop, normalize, impute, filter, select,
//!   and aggregate, applied as an ordered left fold
//! - **Schema-guarded appends** - every write after the first compares the
//!   destination's header against the incoming chunk and rejects drift
//! - **Typed error taxonomy** - every failure mode is a matchable
//!   [`TabflowError`] variant; errors propagate unmodified to the caller
//! - **Config-file assembly** - pipelines can be described in JSON and built
//!   through [`config::PipelineSpec`]
//! - **I/O backends behind feature flags** - `io-csv` and `io-json`
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabflow::*;
//! use std::path::Path;
//!
//! # fn main() -> tabflow::Result<()> {
//! // Read 500 rows at a time, clean each chunk, append to the output.
//! let mut pipeline = Orchestrator::new(CsvReader::new(500)?, CsvWriter::new())
//!     .with_transformer(DropIncomplete)
//!     .with_transformer(NormalizeText)
//!     .with_transformer(ImputeNumeric::new(NumericStrategy::Mean));
//!
//! let summary = pipeline.run(Path::new("data/raw.csv"), Path::new("out/clean.csv"))?;
//! println!("{} rows in, {} rows out", summary.rows_read, summary.rows_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Chunk
//!
//! A [`Chunk`] is one in-memory table fragment: an ordered list of named,
//! homogeneously-typed columns whose rows align by position. A cell is either
//! a concrete [`Value`] or the missing marker. Chunks are created by a
//! reader, move by value through the transformer chain, and are consumed by
//! the writer — no chunk outlives one iteration of the run loop.
//!
//! ### Reader, Transformer, Writer
//!
//! The three seams of the pipeline, one method each:
//!
//! - [`Reader`] turns a source path into a lazy chunk stream
//!   ([`CsvReader`] streams fixed-size row chunks; [`JsonReader`] yields one
//!   chunk for the whole document)
//! - [`Transformer`] is a pure chunk-to-chunk function, configured once
//! - [`Writer`] appends a chunk to the destination, creating it on first
//!   write and enforcing the schema afterwards ([`CsvWriter`],
//!   [`JsonlWriter`])
//!
//! ### Orchestrator
//!
//! The [`Orchestrator`] owns one reader, an ordered transformer list, and one
//! writer. `run` pulls chunks sequentially; chunk N is transformed and
//! written before chunk N+1 is requested. The first error from any stage
//! halts the run — no retries, no rollback of already-written chunks.
//!
//! ## Observability
//!
//! Components emit [`tracing`] events: soft failures (skipped CSV rows,
//! empty JSON arrays, dropped absent columns) are warnings, per-chunk
//! progress is debug, and each completed run logs a summary. The crate never
//! installs a subscriber; hosts choose their own.
//!
//! ## Feature Flags
//!
//! - `io-csv` *(default)* - chunked CSV reader and appending CSV writer
//! - `io-json` *(default)* - whole-file JSON reader and JSON-lines writer
//!
//! ## Module Overview
//!
//! - [`chunk`] - the table model: values, columns, schemas, chunks
//! - [`transform`] - the built-in transformer set
//! - [`io`] - reader/writer contracts and the format backends
//! - [`orchestrator`] - the run loop and its state machine
//! - [`config`] - pipeline assembly from JSON specs
//! - [`error`] - the error taxonomy
//! - [`testing`] - chunk builders, assertions, and file fixtures

pub mod chunk;
pub mod error;
pub mod io;
pub mod orchestrator;
pub mod testing;
pub mod transform;

#[cfg(all(feature = "io-csv", feature = "io-json"))]
pub mod config;

// General re-exports
pub use chunk::{Chunk, Column, DataType, Schema, Value};
pub use error::{Result, TabflowError};
pub use io::{ChunkStream, Reader, Writer};
pub use orchestrator::{Orchestrator, RunState, RunSummary};
pub use transform::{
    AggFn, Aggregation, DropBelowThreshold, DropIncomplete, FilterOp, FilterRows, FilterValue,
    GroupByAggregate, ImputeNumeric, ImputeText, NormalizeText, NumericStrategy, SelectColumns,
    TextStrategy, Transformer,
};

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use io::csv::{CsvReader, CsvWriter};

#[cfg(feature = "io-json")]
pub use io::json::{JsonReader, JsonlWriter};
