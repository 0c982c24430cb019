use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{export::DEFAULT_OUTPUT_FILE, reshape::StemMatch};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reshape wide CSV exports with numbered columns into long format",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the first rows of the raw export and warn about blank rows or columns
    Preview(PreviewArgs),
    /// List normalized column names and the variable stems available for melting
    Columns(ColumnsArgs),
    /// Reshape numbered columns into one row per identifier and sequence number
    Melt(MeltArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Identifier column to leave out of the stem list (repeat for several;
    /// taken whole, so headers may contain commas)
    #[arg(long = "id", action = clap::ArgAction::Append)]
    pub identifiers: Vec<String>,
    /// Plan file whose normalization rules and identifiers apply
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Emit the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct MeltArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output CSV file (`-` writes stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
    /// Identifier column, raw or normalized (repeat for several; taken whole,
    /// so headers may contain commas)
    #[arg(long = "id", action = clap::ArgAction::Append)]
    pub identifiers: Vec<String>,
    /// Variable stems to melt (repeatable or comma-separated)
    #[arg(long = "var", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub stems: Vec<String>,
    /// Drop output rows where every selected stem column is empty
    #[arg(long = "drop-empty-rows")]
    pub drop_empty_rows: bool,
    /// How a stem finds its numbered columns
    #[arg(long = "match", value_enum)]
    pub stem_match: Option<StemMatch>,
    /// Keep the first value when identifier values repeat instead of failing
    #[arg(long = "allow-duplicate-ids")]
    pub allow_duplicate_ids: bool,
    /// Lead the output with an unnamed zero-based row index column
    #[arg(long = "row-index")]
    pub row_index: bool,
    /// Name of the sequence number column
    #[arg(long = "sequence-column")]
    pub sequence_column: Option<String>,
    /// YAML plan providing defaults for every selection above
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Write the effective plan to this YAML file
    #[arg(long = "save-plan")]
    pub save_plan: Option<PathBuf>,
    /// Print the result as a text table instead of writing CSV
    #[arg(long)]
    pub table: bool,
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
