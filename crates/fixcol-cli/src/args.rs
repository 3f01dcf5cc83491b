use clap::Parser;
use std::path::PathBuf;

/// fixcol - Convert fixed-width positional text files to Parquet
#[derive(Parser, Debug)]
#[command(name = "fixcol")]
#[command(version)]
#[command(about = "Convert fixed-width positional text files to Parquet", long_about = None)]
pub struct Cli {
    /// Conversion request as a YAML file (takes precedence over flat options)
    #[arg(short = 'c', long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// Fixed-width input file path
    #[arg(short = 'i', long = "input-file")]
    pub input_file: Option<PathBuf>,

    /// Parquet output file path
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Comma-separated column names (e.g. id,name,amount)
    #[arg(long = "column-names")]
    pub column_names: Option<String>,

    /// Comma-separated column widths in characters (e.g. 6,10,8)
    #[arg(long = "column-widths")]
    pub column_widths: Option<String>,

    /// Comma-separated column types: int, float, bool, date, fixed_monetary, string
    #[arg(long = "column-types")]
    pub column_types: Option<String>,

    /// Keep already-written chunks when a row fails to parse
    #[arg(long = "fault-tolerant")]
    pub fault_tolerant: bool,

    /// Rows per chunk
    #[arg(long = "chunk-size", default_value_t = fixcol_core::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
