//! fixcol-core — fixed-width text to Parquet conversion engine.
//!
//! Converts positional flat files into columnar Parquet, driven by a
//! declarative [`Schema`] of field names, widths and logical types. The
//! engine reads the input in chunks, coerces each column per its logical
//! type, and writes Arrow record batches to a lazily opened Parquet file.
//!
//! ```rust,ignore
//! use fixcol_core::{Converter, ConvertOptions, FieldDef, FieldType, Schema};
//!
//! let schema = Schema::new(vec![
//!     FieldDef::new("id", 6, FieldType::Int),
//!     FieldDef::new("amount", 8, FieldType::FixedMonetary),
//! ])?;
//! let converter = Converter::new(schema, "input.txt", "out.parquet", ConvertOptions::default());
//! let summary = converter.convert()?;
//! ```

pub mod coerce;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod writer;

pub use error::{ConvertError, Result};
pub use pipeline::{ConversionSummary, ConvertOptions, Converter, DEFAULT_CHUNK_SIZE};
pub use schema::{FieldDef, FieldType, Schema};
