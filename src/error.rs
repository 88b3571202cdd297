//! Error taxonomy for the pipeline.
//!
//! Every failure a reader, transformer, writer, or the orchestrator can raise
//! is a [`TabflowError`] variant. Errors propagate unchanged up through
//! [`Orchestrator::run`](crate::Orchestrator::run) — nothing is retried and
//! nothing is downgraded to a warning except the soft cases the component docs
//! call out (malformed CSV rows, empty JSON arrays, dropping absent columns).

use crate::chunk::Schema;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, TabflowError>;

/// All errors raised by readers, transformers, writers, and the orchestrator.
#[derive(Error, Debug)]
pub enum TabflowError {
    /// Bad constructor arguments. Raised at component construction, never
    /// later: a component that exists is correctly configured.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The input file does not exist.
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source cannot be interpreted at the format level, e.g. no field
    /// delimiter could be inferred from the sample.
    #[error("format error: {0}")]
    FormatError(String),

    /// Structural corruption encountered while parsing the source.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The source content is not what the reader expects, e.g. a JSON file
    /// that is not an array of flat objects.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A transformer or writer references a column the chunk does not have.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// An appended chunk disagrees with the schema already on disk.
    #[error("schema mismatch: destination has [{expected}], chunk has [{found}]")]
    SchemaMismatch {
        /// Schema read back from the destination file.
        expected: Schema,
        /// Schema of the chunk that was about to be appended.
        found: Schema,
    },

    /// The source has a header but zero usable data rows.
    #[error("no data rows in {}", .0.display())]
    EmptyData(PathBuf),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying CSV engine failure (writer side; reader-side errors are
    /// classified into the variants above).
    #[cfg(feature = "io-csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
