//! Lazy-open Parquet sink.
//!
//! The output file does not exist until the first non-empty batch arrives;
//! its schema is frozen from that batch. `close` finalizes the footer so
//! the file is readable standalone; `discard` releases the handle and
//! removes the partial file for the abort path.

use crate::error::{ConvertError, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Parquet writer with lazy, exactly-once open semantics.
pub struct ParquetSink {
    path: PathBuf,
    writer: Option<ArrowWriter<File>>,
}

impl ParquetSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Create the output file and freeze its schema. Called exactly once,
    /// on the first non-empty batch.
    pub fn open(&mut self, schema: SchemaRef) -> Result<()> {
        debug_assert!(self.writer.is_none(), "sink opened twice");

        let file = File::create(&self.path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        match ArrowWriter::try_new(file, schema, Some(props)) {
            Ok(writer) => {
                self.writer = Some(writer);
                Ok(())
            }
            Err(e) => {
                // The file was already created; do not leave an empty
                // artifact behind when the writer cannot be built.
                let _ = std::fs::remove_file(&self.path);
                Err(e.into())
            }
        }
    }

    /// Append a batch. A batch whose schema differs from the frozen one is
    /// rejected by the underlying writer; that surfaces as a fatal error.
    pub fn append(&mut self, batch: &RecordBatch) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ConvertError::Schema("output writer is not open".to_string()));
        };
        writer.write(batch)?;
        Ok(())
    }

    /// Flush and finalize the footer. Returns whether a file was created;
    /// a sink that was never opened is a no-op and leaves no file behind.
    pub fn close(self) -> Result<bool> {
        match self.writer {
            Some(writer) => {
                writer.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Release the handle, then remove whatever was written. Deletion
    /// failures are reported but not propagated; the caller is already on
    /// an error path.
    pub fn discard(self) {
        let opened = self.writer.is_some();
        drop(self.writer);
        if opened {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::error!(path = %self.path.display(), error = %e, "failed to remove partial output");
                }
            }
        }
    }
}
