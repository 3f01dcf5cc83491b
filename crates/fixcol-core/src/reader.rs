//! Chunked reader for fixed-width positional files.
//!
//! Rows are split strictly by character offsets derived from the
//! cumulative field widths; there is no delimiter scanning. The reader is
//! a lazy, finite, non-restartable iterator of raw batches, at most
//! `chunk_size` rows each, in file order.

use crate::error::{ConvertError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Column-major batch of raw fixed-width slices, not yet type-coerced.
///
/// Carries the 1-based file line number of each row so coercion failures
/// can point at the offending line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    columns: Vec<Vec<String>>,
    lines: Vec<usize>,
}

impl RawBatch {
    fn with_capacity(column_count: usize, rows: usize) -> Self {
        Self {
            columns: (0..column_count).map(|_| Vec::with_capacity(rows)).collect(),
            lines: Vec::with_capacity(rows),
        }
    }

    /// Build a batch from row-major data. Test and tooling convenience.
    pub fn from_rows(rows: Vec<Vec<String>>, lines: Vec<usize>) -> Self {
        let column_count = rows.first().map_or(0, Vec::len);
        let mut batch = Self::with_capacity(column_count, rows.len());
        for row in rows {
            for (slot, value) in batch.columns.iter_mut().zip(row) {
                slot.push(value);
            }
        }
        batch.lines = lines;
        batch
    }

    /// Raw slices per column, in schema order.
    pub fn columns(&self) -> &[Vec<String>] {
        &self.columns
    }

    /// 1-based file line number per row.
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    pub fn num_rows(&self) -> usize {
        self.lines.len()
    }
}

/// Iterator of raw row batches over a fixed-width input file.
pub struct ChunkReader {
    lines: Lines<BufReader<File>>,
    widths: Vec<usize>,
    row_width: usize,
    chunk_size: usize,
    line_no: usize,
    done: bool,
}

impl ChunkReader {
    /// Open the input file for chunked reading.
    pub fn open(path: impl AsRef<Path>, widths: Vec<usize>, chunk_size: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let row_width = widths.iter().sum();
        Ok(Self {
            lines: BufReader::new(file).lines(),
            widths,
            row_width,
            chunk_size,
            line_no: 0,
            done: false,
        })
    }

    /// Slice one line into the batch by cumulative character offsets.
    /// Characters beyond the declared row width are ignored; short rows
    /// are a structured parse error.
    fn push_row(&self, batch: &mut RawBatch, line: &str) -> Result<()> {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() < self.row_width {
            return Err(ConvertError::ShortRow {
                line: self.line_no,
                actual: chars.len(),
                expected: self.row_width,
            });
        }

        let mut offset = 0;
        for (slot, &width) in batch.columns.iter_mut().zip(&self.widths) {
            slot.push(chars[offset..offset + width].iter().collect());
            offset += width;
        }
        batch.lines.push(self.line_no);
        Ok(())
    }
}

impl Iterator for ChunkReader {
    type Item = Result<RawBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = RawBatch::with_capacity(self.widths.len(), self.chunk_size);
        while batch.num_rows() < self.chunk_size {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break;
            };
            self.line_no += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };

            // Blank lines are not data rows. A row of spaces is data.
            if line.is_empty() {
                continue;
            }

            if let Err(e) = self.push_row(&mut batch, &line) {
                self.done = true;
                return Some(Err(e));
            }
        }

        if batch.num_rows() == 0 {
            None
        } else {
            Some(Ok(batch))
        }
    }
}
