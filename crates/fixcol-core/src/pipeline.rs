//! Conversion pipeline: chunked read, coerce, write.
//!
//! The pipeline owns the fault-tolerance policy and the all-or-nothing
//! output guarantee. Execution is strictly sequential: chunk N is fully
//! read, coerced, and written before chunk N+1 is read. The top-level
//! handler in [`Converter::convert`] is the single point deciding
//! stop-vs-abort and the single point performing cleanup.

use crate::coerce::coerce_batch;
use crate::error::{ConvertError, Result};
use crate::reader::ChunkReader;
use crate::schema::Schema;
use crate::writer::ParquetSink;
use std::path::{Path, PathBuf};

/// Default rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Run-time options for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Rows per batch between read and write.
    pub chunk_size: usize,

    /// When enabled, a structured parse error stops further input
    /// processing but keeps the chunks already written; when disabled it
    /// aborts and removes the output.
    pub fault_tolerant: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fault_tolerant: false,
        }
    }
}

/// Outcome of a successful conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionSummary {
    /// Rows written to the output file.
    pub rows_written: u64,

    /// Chunks written to the output file.
    pub chunks_written: u64,

    /// Whether an output file was created. False for an empty input:
    /// a zero-row input yields no output artifact at all, deliberately
    /// distinct from an output file with zero rows.
    pub output_created: bool,

    /// Set when a tolerated parse error stopped the run before the end of
    /// the input; carries the reported error text.
    pub stopped_early: Option<String>,
}

/// Fixed-width to Parquet converter for one input/output pair.
pub struct Converter {
    schema: Schema,
    input: PathBuf,
    output: PathBuf,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(
        schema: Schema,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: ConvertOptions,
    ) -> Self {
        Self {
            schema,
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            options,
        }
    }

    /// Run the conversion.
    ///
    /// On success the output file exists and is valid, or legitimately
    /// does not exist for an empty input. On error no output file exists:
    /// the handle is released and the partial file removed before the
    /// error propagates.
    pub fn convert(&self) -> Result<ConversionSummary> {
        self.schema.validate()?;
        if self.options.chunk_size == 0 {
            return Err(ConvertError::schema("chunk_size must be positive"));
        }

        let span = tracing::info_span!(
            "convert",
            input = %self.input.display(),
            output = %self.output.display(),
            chunk_size = self.options.chunk_size,
            fault_tolerant = self.options.fault_tolerant
        );
        let _guard = span.entered();

        let mut sink = ParquetSink::new(&self.output);
        let mut summary = ConversionSummary::default();

        match self.run(&mut sink, &mut summary) {
            Ok(()) => {}
            Err(e) if e.is_parse() && self.options.fault_tolerant => {
                tracing::warn!(error = %e, "parse failure stopped the run; keeping chunks already written");
                summary.stopped_early = Some(e.to_string());
            }
            Err(e) => {
                sink.discard();
                return Err(e);
            }
        }

        // A failed finalize leaves the file without a footer, so it is
        // removed like any other abort.
        match sink.close() {
            Ok(created) => summary.output_created = created,
            Err(e) => {
                let _ = std::fs::remove_file(&self.output);
                return Err(e);
            }
        }

        tracing::info!(
            rows = summary.rows_written,
            chunks = summary.chunks_written,
            output_created = summary.output_created,
            "conversion finished"
        );
        Ok(summary)
    }

    /// The chunk loop. Any error propagates to `convert`, which decides
    /// stop-vs-abort; the failing batch is never written.
    fn run(&self, sink: &mut ParquetSink, summary: &mut ConversionSummary) -> Result<()> {
        let reader = ChunkReader::open(&self.input, self.schema.widths(), self.options.chunk_size)?;

        for raw in reader {
            let raw = raw?;
            let typed = coerce_batch(&self.schema, &raw)?;

            // First non-empty batch freezes the output schema.
            if !sink.is_open() {
                sink.open(typed.schema())?;
            }
            sink.append(&typed)?;

            summary.rows_written += typed.num_rows() as u64;
            summary.chunks_written += 1;
            tracing::debug!(
                chunk = summary.chunks_written,
                rows = typed.num_rows(),
                "chunk written"
            );
        }

        Ok(())
    }
}
