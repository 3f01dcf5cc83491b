//! Per-type coercion from raw fixed-width slices to typed columns.
//!
//! This is the single dispatch point from logical type to coercion rule;
//! the pipeline never branches on field types itself. Soft-null types
//! (`Float`, `Bool`, `Date`) map malformed input to a missing marker —
//! that is data, not a fault. Hard-fail types (`Int`, `FixedMonetary`)
//! raise a structured parse error carrying the file line, column name and
//! offending raw value.

use crate::error::{ConvertError, Result};
use crate::reader::RawBatch;
use crate::schema::{FieldDef, FieldType, Schema};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// One coerced column of a typed batch.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedColumn {
    Int64(Vec<i64>),
    Float64(Vec<Option<f64>>),
    Boolean(Vec<bool>),
    TimestampMillis(Vec<Option<i64>>),
    Utf8(Vec<String>),
}

impl CoercedColumn {
    pub fn data_type(&self) -> DataType {
        match self {
            CoercedColumn::Int64(_) => FieldType::Int.arrow_type(),
            CoercedColumn::Float64(_) => FieldType::Float.arrow_type(),
            CoercedColumn::Boolean(_) => FieldType::Bool.arrow_type(),
            CoercedColumn::TimestampMillis(_) => FieldType::Date.arrow_type(),
            CoercedColumn::Utf8(_) => FieldType::Str.arrow_type(),
        }
    }

    pub fn into_array(self) -> ArrayRef {
        match self {
            CoercedColumn::Int64(values) => Arc::new(Int64Array::from(values)),
            CoercedColumn::Float64(values) => Arc::new(Float64Array::from(values)),
            CoercedColumn::Boolean(values) => Arc::new(BooleanArray::from(values)),
            CoercedColumn::TimestampMillis(values) => {
                Arc::new(TimestampMillisecondArray::from(values))
            }
            CoercedColumn::Utf8(values) => Arc::new(StringArray::from(values)),
        }
    }
}

/// Coerce one raw column according to its field definition.
///
/// `lines` holds the 1-based file line number of each row, used for error
/// reporting on the hard-fail types.
pub fn coerce_column(field: &FieldDef, raws: &[String], lines: &[usize]) -> Result<CoercedColumn> {
    match field.ftype {
        FieldType::Int => {
            let mut values = Vec::with_capacity(raws.len());
            for (raw, &line) in raws.iter().zip(lines) {
                let value = raw.trim().parse::<i64>().map_err(|_| ConvertError::ParseValue {
                    line,
                    column: field.name.clone(),
                    raw: raw.clone(),
                    expected: "int",
                })?;
                values.push(value);
            }
            Ok(CoercedColumn::Int64(values))
        }
        FieldType::Float => {
            let values = raws.iter().map(|raw| raw.trim().parse::<f64>().ok()).collect();
            Ok(CoercedColumn::Float64(values))
        }
        FieldType::Bool => {
            // Numeric parse, nonzero is true; malformed maps to false.
            let values = raws
                .iter()
                .map(|raw| raw.trim().parse::<f64>().map(|v| v != 0.0).unwrap_or(false))
                .collect();
            Ok(CoercedColumn::Boolean(values))
        }
        FieldType::Date => {
            // Missing format is caught by schema validation before any
            // row is read; this guard only covers unvalidated FieldDefs.
            let format = field.format.as_deref().ok_or_else(|| {
                ConvertError::schema(format!("date field '{}' requires a format", field.name))
            })?;
            let values = raws.iter().map(|raw| parse_date_millis(raw, format)).collect();
            Ok(CoercedColumn::TimestampMillis(values))
        }
        FieldType::FixedMonetary => {
            let mut values = Vec::with_capacity(raws.len());
            for (raw, &line) in raws.iter().zip(lines) {
                let value = parse_monetary(raw).ok_or_else(|| ConvertError::ParseValue {
                    line,
                    column: field.name.clone(),
                    raw: raw.clone(),
                    expected: "fixed_monetary",
                })?;
                values.push(value);
            }
            Ok(CoercedColumn::Float64(values.into_iter().map(Some).collect()))
        }
        FieldType::Str => Ok(CoercedColumn::Utf8(raws.to_vec())),
    }
}

/// Coerce a whole raw batch into an Arrow `RecordBatch`.
///
/// The batch schema is built from the actually coerced column types, so
/// the first batch written is what freezes the output schema.
pub fn coerce_batch(schema: &Schema, raw: &RawBatch) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (field, column) in schema.fields().iter().zip(raw.columns()) {
        let coerced = coerce_column(field, column, raw.lines())?;
        // Data type from the coerced values, nullability from the logical
        // type: FixedMonetary also lands in Float64 but stays non-null.
        fields.push(Field::new(&field.name, coerced.data_type(), field.ftype.is_nullable()));
        arrays.push(coerced.into_array());
    }

    let arrow_schema = Arc::new(ArrowSchema::new(fields));
    Ok(RecordBatch::try_new(arrow_schema, arrays)?)
}

/// Parse a date/datetime with a chrono strftime format, as a millisecond
/// timestamp. Formats without time-of-day directives parse to midnight.
fn parse_date_millis(raw: &str, format: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let datetime = NaiveDateTime::parse_from_str(trimmed, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(datetime.and_utc().timestamp_millis())
}

/// Fixed-point monetary parse: the last two characters are the cents
/// part, the remainder the integer part, reassembled as `integer.cents`.
/// Widths under two characters degrade to a pure fractional value.
fn parse_monetary(raw: &str) -> Option<f64> {
    let char_count = raw.chars().count();
    let split = char_count.saturating_sub(2);
    let byte_idx = raw
        .char_indices()
        .nth(split)
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    let (integer, cents) = raw.split_at(byte_idx);
    format!("{}.{}", integer, cents).trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    fn int_field() -> FieldDef {
        FieldDef::new("col1", 6, FieldType::Int)
    }

    #[test]
    fn test_int_trims_and_parses() {
        let raws = vec!["   123".to_string(), "456   ".to_string(), " -7 ".to_string()];
        let col = coerce_column(&int_field(), &raws, &[1, 2, 3]).unwrap();
        assert_eq!(col, CoercedColumn::Int64(vec![123, 456, -7]));
    }

    #[test]
    fn test_int_hard_fails_with_context() {
        let raws = vec!["123456".to_string(), "abcxyz".to_string()];
        let err = coerce_column(&int_field(), &raws, &[1, 2]).unwrap_err();
        assert!(err.is_parse());
        let msg = err.to_string();
        assert!(msg.contains("Line 2"));
        assert!(msg.contains("col1"));
        assert!(msg.contains("abcxyz"));
    }

    #[test]
    fn test_float_soft_nulls() {
        let field = FieldDef::new("ratio", 6, FieldType::Float);
        let raws = vec![" 1.5  ".to_string(), "banana".to_string(), "  -2.0".to_string()];
        let col = coerce_column(&field, &raws, &[1, 2, 3]).unwrap();
        assert_eq!(col, CoercedColumn::Float64(vec![Some(1.5), None, Some(-2.0)]));
    }

    #[test]
    fn test_bool_nonzero_and_missing() {
        let field = FieldDef::new("flag", 3, FieldType::Bool);
        let raws = vec![
            "  1".to_string(),
            "  0".to_string(),
            " -2".to_string(),
            "yes".to_string(),
        ];
        let col = coerce_column(&field, &raws, &[1, 2, 3, 4]).unwrap();
        assert_eq!(col, CoercedColumn::Boolean(vec![true, false, true, false]));
    }

    #[test]
    fn test_monetary_reassembles_cents() {
        assert_eq!(parse_monetary("123450"), Some(1234.50));
        assert_eq!(parse_monetary("678900"), Some(6789.00));
        assert_eq!(parse_monetary("    12"), Some(0.12));
        assert_eq!(parse_monetary("12a450"), None);
    }

    #[test]
    fn test_monetary_hard_fails() {
        let field = FieldDef::new("amount", 6, FieldType::FixedMonetary);
        let raws = vec!["12a450".to_string()];
        let err = coerce_column(&field, &raws, &[5]).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("fixed_monetary"));
    }

    #[test]
    fn test_date_parses_with_format() {
        let field = FieldDef::date("day", 8, "%Y%m%d");
        let raws = vec!["20240131".to_string(), "99999999".to_string()];
        let col = coerce_column(&field, &raws, &[1, 2]).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(col, CoercedColumn::TimestampMillis(vec![Some(expected), None]));
    }

    #[test]
    fn test_datetime_format() {
        let millis = parse_date_millis("2024-01-31 12:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(millis, expected);
    }

    #[test]
    fn test_string_passthrough_keeps_padding() {
        let field = FieldDef::new("name", 6, FieldType::Str);
        let raws = vec!["ab    ".to_string(), "  cd  ".to_string()];
        let col = coerce_column(&field, &raws, &[1, 2]).unwrap();
        assert_eq!(
            col,
            CoercedColumn::Utf8(vec!["ab    ".to_string(), "  cd  ".to_string()])
        );
    }

    #[test]
    fn test_batch_schema_from_coerced_types() {
        let schema = Schema::new(vec![
            FieldDef::new("id", 3, FieldType::Int),
            FieldDef::new("ratio", 3, FieldType::Float),
        ])
        .unwrap();
        let raw = RawBatch::from_rows(
            vec![
                vec!["  1".to_string(), "1.5".to_string()],
                vec![" 22".to_string(), "bad".to_string()],
            ],
            vec![1, 2],
        );
        let batch = coerce_batch(&schema, &raw).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Int64);
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Float64);
        assert!(batch.schema().field(1).is_nullable());
        assert_eq!(batch.column(1).null_count(), 1);
    }
}
