//! Reader and writer contracts, plus the format backends.
//!
//! A [`Reader`] turns a source path into a lazy, finite [`ChunkStream`]; a
//! [`Writer`] appends one chunk to a destination, guarding schema consistency
//! across calls. Backends are feature-gated: `io-csv` for the chunked CSV
//! reader/writer, `io-json` for the whole-file JSON reader and the JSON-lines
//! writer.

use crate::chunk::Chunk;
use crate::error::Result;
use std::path::Path;

#[cfg(feature = "io-csv")]
pub mod csv;

#[cfg(feature = "io-json")]
pub mod json;

/// A lazy, finite sequence of chunks. The orchestrator drives iteration; the
/// producer suspends between chunks holding only what it needs to resume.
pub type ChunkStream = Box<dyn Iterator<Item = Result<Chunk>>>;

/// Produces the source's chunk sequence. Concatenating the yielded chunks in
/// order reconstructs the full logical dataset.
pub trait Reader {
    /// Open `path` and return its chunk stream.
    ///
    /// # Errors
    /// `NotFound` if the path does not exist; format-level failures are
    /// backend-specific (see each implementation).
    fn read(&self, path: &Path) -> Result<ChunkStream>;
}

/// Appends one chunk to a destination file, creating it (and missing parent
/// directories) on first write and enforcing schema consistency afterwards.
pub trait Writer {
    /// Append `chunk` to `path`, returning the number of rows written.
    ///
    /// # Errors
    /// `SchemaMismatch` if the destination already holds a different column
    /// set or order; nothing is written in that case.
    fn write(&self, chunk: &Chunk, path: &Path) -> Result<usize>;
}

impl Reader for Box<dyn Reader> {
    fn read(&self, path: &Path) -> Result<ChunkStream> {
        (**self).read(path)
    }
}

impl Writer for Box<dyn Writer> {
    fn write(&self, chunk: &Chunk, path: &Path) -> Result<usize> {
        (**self).write(chunk, path)
    }
}
