//! Field and schema definitions for fixed-width input files.
//!
//! A [`Schema`] is the validated, strongly-typed form of the conversion
//! request: field order defines character offsets in each input row and
//! column order in the output file. All "stringly" ambiguity (unknown type
//! tags, missing date formats, duplicate names) is rejected here, before
//! any row is read.

use crate::error::{ConvertError, Result};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef, TimeUnit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Logical type of a fixed-width field.
///
/// The hard-fail vs. soft-null split is deliberate and must be preserved:
/// `Int` and `FixedMonetary` raise a structured parse error on malformed
/// input, while `Float`, `Bool` and `Date` coerce it to a missing marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Float,
    Bool,
    Date,
    FixedMonetary,
    Str,
}

impl FieldType {
    /// Tag used in config documents and CLI parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::FixedMonetary => "fixed_monetary",
            FieldType::Str => "string",
        }
    }

    /// Arrow data type this field coerces into.
    pub fn arrow_type(&self) -> DataType {
        match self {
            FieldType::Int => DataType::Int64,
            FieldType::Float => DataType::Float64,
            FieldType::Bool => DataType::Boolean,
            FieldType::Date => DataType::Timestamp(TimeUnit::Millisecond, None),
            FieldType::FixedMonetary => DataType::Float64,
            FieldType::Str => DataType::Utf8,
        }
    }

    /// Whether the output column is nullable. Only the soft-null types
    /// that keep their missing marker as a null are nullable; `Bool`
    /// maps its missing marker to `false` and stays non-null.
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Float | FieldType::Date)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(FieldType::Int),
            "float" => Ok(FieldType::Float),
            "bool" => Ok(FieldType::Bool),
            "date" => Ok(FieldType::Date),
            "fixed_monetary" => Ok(FieldType::FixedMonetary),
            "string" => Ok(FieldType::Str),
            other => Err(ConvertError::schema(format!("unknown field type '{}'", other))),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Definition of a single fixed-width field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name, unique within the schema.
    pub name: String,

    /// Field width in characters.
    pub length: usize,

    /// Logical type driving coercion.
    #[serde(rename = "type")]
    pub ftype: FieldType,

    /// Date format (chrono strftime syntax). Required iff `ftype` is `Date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, length: usize, ftype: FieldType) -> Self {
        Self {
            name: name.into(),
            length,
            ftype,
            format: None,
        }
    }

    /// Create a date field with its parse format.
    pub fn date(name: impl Into<String>, length: usize, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length,
            ftype: FieldType::Date,
            format: Some(format.into()),
        }
    }
}

/// Ordered, validated sequence of field definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Build a schema, rejecting inconsistent definitions up front.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field widths in schema order.
    pub fn widths(&self) -> Vec<usize> {
        self.fields.iter().map(|f| f.length).collect()
    }

    /// Total declared row width in characters.
    pub fn row_width(&self) -> usize {
        self.fields.iter().map(|f| f.length).sum()
    }

    /// Validate the schema. Raised before any row is processed, so a bad
    /// schema never has output side effects.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ConvertError::schema("schema must define at least one field"));
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ConvertError::schema("field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConvertError::schema(format!("duplicate field name '{}'", field.name)));
            }
            if field.length == 0 {
                return Err(ConvertError::schema(format!(
                    "field '{}' must have a positive width",
                    field.name
                )));
            }
            match (field.ftype, &field.format) {
                (FieldType::Date, None) => {
                    return Err(ConvertError::schema(format!(
                        "date field '{}' requires a format",
                        field.name
                    )));
                }
                (FieldType::Date, Some(_)) => {}
                (_, Some(_)) => {
                    return Err(ConvertError::schema(format!(
                        "field '{}' is not a date and cannot have a format",
                        field.name
                    )));
                }
                (_, None) => {}
            }
        }

        Ok(())
    }

    /// Arrow schema derived from the logical types, in field order.
    pub fn to_arrow(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| Field::new(&f.name, f.ftype.arrow_type(), f.ftype.is_nullable()))
            .collect();
        Arc::new(ArrowSchema::new(fields))
    }
}
