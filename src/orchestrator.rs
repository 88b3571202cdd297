//! The pipeline driver: pull chunks, fold transformers, append to the sink.

use crate::chunk::Chunk;
use crate::error::Result;
use crate::io::{Reader, Writer};
use crate::transform::Transformer;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run started yet.
    #[default]
    Idle,
    /// A run is in progress.
    Running,
    /// The last run exhausted the chunk stream without error.
    Completed,
    /// The last run halted on an error.
    Failed,
}

/// Counters reported by a completed run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    /// Chunks pulled from the reader and pushed through the full pipeline.
    pub chunks_processed: usize,
    /// Rows read from the source, before any transformation.
    pub rows_read: usize,
    /// Rows appended to the destination, after all transformations.
    pub rows_written: usize,
}

/// Drives one reader, an ordered transformer list, and one writer over a
/// chunked stream.
///
/// For each chunk yielded by the reader, the transformers are applied as a
/// left fold in configured order and the result is handed to the writer.
/// Chunk N's full pipeline completes before chunk N+1 is requested: strictly
/// sequential, single-threaded, no internal concurrency.
///
/// Any error raised by the reader, a transformer, or the writer propagates
/// unmodified and halts the run immediately. There is no retry logic and no
/// rollback: output written up to the last successful chunk stays on disk.
///
/// ```no_run
/// use tabflow::{CsvReader, CsvWriter, DropIncomplete, NormalizeText, Orchestrator};
/// use std::path::Path;
///
/// # fn main() -> tabflow::Result<()> {
/// let mut pipeline = Orchestrator::new(CsvReader::new(500)?, CsvWriter::new())
///     .with_transformer(DropIncomplete)
///     .with_transformer(NormalizeText);
/// let summary = pipeline.run(Path::new("in.csv"), Path::new("out/clean.csv"))?;
/// println!("{} rows written", summary.rows_written);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    reader: Box<dyn Reader>,
    transformers: Vec<Box<dyn Transformer>>,
    writer: Box<dyn Writer>,
    state: RunState,
}

impl Orchestrator {
    /// Assemble a pipeline with no transformers yet.
    pub fn new(reader: impl Reader + 'static, writer: impl Writer + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            transformers: Vec::new(),
            writer: Box::new(writer),
            state: RunState::Idle,
        }
    }

    /// Append a transformer to the end of the chain. Order is the order of
    /// application and is semantically significant.
    #[must_use]
    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process `input` into `output`.
    ///
    /// # Errors
    /// The first error raised by any stage, unmodified. The orchestrator is
    /// left in [`RunState::Failed`]; partial output remains on disk.
    pub fn run(&mut self, input: &Path, output: &Path) -> Result<RunSummary> {
        self.state = RunState::Running;
        match self.run_inner(input, output) {
            Ok(summary) => {
                self.state = RunState::Completed;
                info!(
                    chunks = summary.chunks_processed,
                    rows_read = summary.rows_read,
                    rows_written = summary.rows_written,
                    "pipeline run completed"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    fn run_inner(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let stream = self.reader.read(input)?;
        let mut summary = RunSummary::default();
        for chunk in stream {
            let mut chunk: Chunk = chunk?;
            summary.rows_read += chunk.num_rows();
            for transformer in &self.transformers {
                chunk = transformer.transform(chunk)?;
                debug!(
                    transformer = transformer.name(),
                    rows = chunk.num_rows(),
                    "applied transformer"
                );
            }
            summary.rows_written += self.writer.write(&chunk, output)?;
            summary.chunks_processed += 1;
            debug!(chunk = summary.chunks_processed, "chunk written");
        }
        Ok(summary)
    }
}
