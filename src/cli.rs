use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::aggregate::{Direction, SortKey};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Profile business-registry CSV extracts",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List columns with their inferred types
    Schema(InspectArgs),
    /// Show which columns look like activity, location, or size fields
    Roles(InspectArgs),
    /// Null counts and percentages per column, highest first
    Nulls(InspectArgs),
    /// Ranked value counts for one column
    Top(TopArgs),
    /// Preview the first rows of selected columns
    Preview(PreviewArgs),
    /// Run every exploration view in one pass
    Report(ReportArgs),
    /// Write the default profile configuration to a YAML file
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML profile with ingestion settings, role keywords, and report bounds
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Character encoding of the input file (defaults to latin1)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Literal cell value to read as null; repeat to list several (replaces the defaults)
    #[arg(long = "null-token", action = clap::ArgAction::Append)]
    pub null_tokens: Vec<String>,
    /// Rows sampled to infer column types (0 means full scan)
    #[arg(long = "infer-rows")]
    pub infer_rows: Option<usize>,
    /// Pad short rows with nulls instead of rejecting the file
    #[arg(long = "allow-ragged")]
    pub allow_ragged: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column to group by
    #[arg(short = 'c', long = "column")]
    pub column: String,
    /// Maximum groups to display (0 = all)
    #[arg(long, default_value_t = 20)]
    pub top: usize,
    /// Rank groups by their count or by their value
    #[arg(long = "sort-by", value_enum, default_value = "count")]
    pub sort_by: SortKey,
    /// Sort direction
    #[arg(long, value_enum, default_value = "desc")]
    pub order: Direction,
    /// Leave rows with a null value out of the counts
    #[arg(long = "exclude-nulls")]
    pub exclude_nulls: bool,
    /// Fail when the table has no rows instead of printing nothing
    #[arg(long = "require-rows")]
    pub require_rows: bool,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Columns to display (defaults to the profile's leading `preview_columns`)
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Number of rows to display (defaults to the profile's `preview_rows`)
    #[arg(long)]
    pub rows: Option<usize>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Activity column to rank (defaults to the first activity candidate)
    #[arg(long)]
    pub activity: Option<String>,
    /// Location column to rank (defaults to the first location candidate)
    #[arg(long)]
    pub location: Option<String>,
    /// Size column to tabulate (defaults to the first size candidate)
    #[arg(long)]
    pub size: Option<String>,
    /// Columns shown in the data preview
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub preview_columns: Vec<String>,
    /// Rows shown in the data preview (overrides the profile)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
