//! Command-line converter from Excel workbooks to type-coerced CSV.
//!
//! # Usage
//!
//! ```sh
//! sheetcast sales.xlsx -c decimal,datetime,boolean,string -o sales.csv
//! ```
//!
//! Every sheet is written in tab order: its name, one line per data row, and
//! a separator line. Logs go to stderr (`-v`, `-vv` or `RUST_LOG`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use sheetcast::{ColumnTypes, ConvertOptions, FormulaMode, convert_file};
use tracing_subscriber::EnvFilter;

/// Convert every sheet of an .xlsx workbook to CSV, coercing each column to
/// a declared type
#[derive(Parser, Debug)]
#[command(name = "sheetcast", version)]
struct Args {
    /// Workbook to convert
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Comma-separated output type of each column, in column order
    ///
    /// Types: decimal, datetime, boolean, string.
    #[arg(short, long, value_name = "TYPES")]
    columns: ColumnTypes,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Time zone in which serial dates are wall-clock times
    #[arg(long, value_name = "ZONE", default_value = "America/Los_Angeles")]
    time_zone: Tz,

    /// What formula cells contribute
    #[arg(long, value_enum, default_value = "cached")]
    formulas: FormulaArg,

    /// Field delimiter (a single ASCII character)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormulaArg {
    /// The value the workbook cached for the formula
    Cached,
    /// The formula's source text
    Source,
}

impl From<FormulaArg> for FormulaMode {
    fn from(arg: FormulaArg) -> Self {
        match arg {
            FormulaArg::Cached => FormulaMode::CachedValue,
            FormulaArg::Source => FormulaMode::Source,
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be one ASCII character, got {s:?}")),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = ConvertOptions::new(args.columns)
        .with_time_zone(args.time_zone)
        .with_formula_mode(args.formulas.into())
        .with_delimiter(args.delimiter);

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if let Err(e) = convert_file(&args.input, &options, sink) {
        eprintln!("Error: {}: {}", args.input.display(), e);
        std::process::exit(1);
    }

    Ok(())
}
