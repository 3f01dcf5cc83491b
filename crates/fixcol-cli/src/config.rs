//! Conversion request loading.
//!
//! A request arrives either as a YAML document or as the flat
//! comma-separated command-line parameters; the config file takes
//! precedence when both are present. Everything is validated here, before
//! conversion starts, so the engine only ever sees a well-formed schema.

use crate::args::Cli;
use anyhow::{bail, Context, Result};
use fixcol_core::{ConvertOptions, FieldDef, FieldType, Schema};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_chunk_size() -> usize {
    fixcol_core::DEFAULT_CHUNK_SIZE
}

/// One field entry of the YAML `fields` list.
#[derive(Debug, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub length: usize,
    #[serde(rename = "type")]
    pub ftype: FieldType,
    #[serde(default)]
    pub format: Option<String>,
}

/// A fully specified conversion request.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub fault_tolerant: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    pub fields: Vec<FieldSpec>,
}

impl ConvertRequest {
    /// Load a request from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read config file {}", path.as_ref().display()))?;
        let request: ConvertRequest = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.as_ref().display()))?;
        Ok(request)
    }

    /// Build a request from the flat command-line parameters.
    pub fn from_flat_args(cli: &Cli) -> Result<Self> {
        let (Some(input), Some(output), Some(names), Some(widths), Some(types)) = (
            cli.input_file.as_ref(),
            cli.output_file.as_ref(),
            cli.column_names.as_deref(),
            cli.column_widths.as_deref(),
            cli.column_types.as_deref(),
        ) else {
            bail!(
                "either --config-file or all of --input-file, --output-file, \
                 --column-names, --column-widths and --column-types must be given"
            );
        };

        let names: Vec<&str> = names.split(',').map(str::trim).collect();
        let widths = widths
            .split(',')
            .map(|w| {
                w.trim()
                    .parse::<usize>()
                    .with_context(|| format!("invalid column width '{}'", w.trim()))
            })
            .collect::<Result<Vec<usize>>>()?;
        let types = types
            .split(',')
            .map(|t| t.parse::<FieldType>().map_err(anyhow::Error::from))
            .collect::<Result<Vec<FieldType>>>()?;

        if names.len() != widths.len() || names.len() != types.len() {
            bail!(
                "column lists must have equal lengths: {} names, {} widths, {} types",
                names.len(),
                widths.len(),
                types.len()
            );
        }

        // Date formats are not expressible through flat parameters; a date
        // column here fails schema validation for its missing format.
        let fields = names
            .into_iter()
            .zip(widths)
            .zip(types)
            .map(|((name, length), ftype)| FieldSpec {
                name: name.to_string(),
                length,
                ftype,
                format: None,
            })
            .collect();

        Ok(Self {
            input: input.clone(),
            output: output.clone(),
            fault_tolerant: cli.fault_tolerant,
            chunk_size: cli.chunk_size,
            fields,
        })
    }

    /// Resolve the request from the parsed command line. The config file
    /// wins when present; flat parameters are only consulted otherwise.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        match &cli.config_file {
            Some(path) => Self::from_file(path),
            None => Self::from_flat_args(cli),
        }
    }

    /// Validated engine schema for this request.
    pub fn schema(&self) -> Result<Schema> {
        let fields = self
            .fields
            .iter()
            .map(|f| FieldDef {
                name: f.name.clone(),
                length: f.length,
                ftype: f.ftype,
                format: f.format.clone(),
            })
            .collect();
        Schema::new(fields).context("invalid schema")
    }

    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            chunk_size: self.chunk_size,
            fault_tolerant: self.fault_tolerant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fixcol").chain(args.iter().copied()))
    }

    #[test]
    fn test_yaml_request_with_defaults() {
        let yaml = r#"
input: data.txt
output: data.parquet
fields:
  - name: id
    length: 6
    type: int
  - name: born
    length: 8
    type: date
    format: "%Y%m%d"
"#;
        let request: ConvertRequest = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(request.chunk_size, 10_000);
        assert!(!request.fault_tolerant);
        assert_eq!(request.fields.len(), 2);
        assert_eq!(request.fields[1].ftype, FieldType::Date);
        assert_eq!(request.fields[1].format.as_deref(), Some("%Y%m%d"));
        assert!(request.schema().is_ok());
    }

    #[test]
    fn test_yaml_unknown_type_rejected() {
        let yaml = r#"
input: data.txt
output: data.parquet
fields:
  - name: id
    length: 6
    type: decimal
"#;
        let err = serde_yaml_ng::from_str::<ConvertRequest>(yaml).unwrap_err();
        assert!(err.to_string().contains("decimal"));
    }

    #[test]
    fn test_flat_args_build_request() {
        let cli = cli(&[
            "--input-file",
            "in.txt",
            "--output-file",
            "out.parquet",
            "--column-names",
            "id,amount",
            "--column-widths",
            "6,8",
            "--column-types",
            "int,fixed_monetary",
            "--fault-tolerant",
            "--chunk-size",
            "500",
        ]);
        let request = ConvertRequest::resolve(&cli).unwrap();
        assert_eq!(request.chunk_size, 500);
        assert!(request.fault_tolerant);
        assert_eq!(request.fields[0].ftype, FieldType::Int);
        assert_eq!(request.fields[1].ftype, FieldType::FixedMonetary);
        assert!(request.schema().is_ok());
    }

    #[test]
    fn test_ragged_lists_rejected() {
        let cli = cli(&[
            "--input-file",
            "in.txt",
            "--output-file",
            "out.parquet",
            "--column-names",
            "id,amount",
            "--column-widths",
            "6",
            "--column-types",
            "int,int",
        ]);
        let err = ConvertRequest::resolve(&cli).unwrap_err();
        assert!(err.to_string().contains("equal lengths"));
    }

    #[test]
    fn test_neither_source_is_usage_error() {
        let cli = cli(&[]);
        let err = ConvertRequest::resolve(&cli).unwrap_err();
        assert!(err.to_string().contains("--config-file"));
    }

    #[test]
    fn test_config_file_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "input: from-config.txt\noutput: from-config.parquet\nfields:\n  - name: id\n    length: 4\n    type: int\n"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = cli(&[
            "--config-file",
            &path,
            "--input-file",
            "from-flags.txt",
            "--output-file",
            "from-flags.parquet",
            "--column-names",
            "other",
            "--column-widths",
            "2",
            "--column-types",
            "string",
        ]);
        let request = ConvertRequest::resolve(&cli).unwrap();
        assert_eq!(request.input, PathBuf::from("from-config.txt"));
        assert_eq!(request.fields[0].name, "id");
    }

    #[test]
    fn test_flat_date_fails_schema_validation() {
        let cli = cli(&[
            "--input-file",
            "in.txt",
            "--output-file",
            "out.parquet",
            "--column-names",
            "born",
            "--column-widths",
            "8",
            "--column-types",
            "date",
        ]);
        let request = ConvertRequest::resolve(&cli).unwrap();
        assert!(request.schema().is_err());
    }
}
