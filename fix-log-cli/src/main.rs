//! FIX Log Tabulator CLI Application
//!
//! This is the command-line interface for the FIX log tabulator.
//! It uses the fix-log-decoder library and adds:
//! - Log file ingestion (line splitting, blank-line skipping)
//! - Order-preserving parallel per-line decoding
//! - Batch policy: skip-and-report (default) or abort on first bad line
//! - Report generation (TXT/CSV/JSON) with timestamped file naming

use anyhow::{bail, Context, Result};
use clap::Parser;
use fix_log_decoder::{DecodedRecord, Decoder, FieldSchema, LineError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::OutputFormat;

/// FIX Log Tabulator - Convert FIX log lines into a tabular dataset
#[derive(Parser, Debug)]
#[command(name = "fix-log-cli")]
#[command(about = "Tabulate pipe-delimited FIX messages from text log files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the FIX log file to tabulate
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Output file (default: Parsed_<name>_<timestamp>.<ext>)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Path to configuration file (config.toml) - for multi-file runs
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Abort on the first unparsable line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Maximum number of lines to decode (for testing)
    #[arg(long, value_name = "COUNT")]
    max_lines: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("FIX Log Tabulator CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", fix_log_decoder::VERSION);

    if let Some(log_path) = &args.log {
        // Simple mode - tabulate one file with the built-in schema
        simple_mode(log_path, &args)
    } else if let Some(config_path) = &args.config {
        // Config mode - multiple files, schema extensions
        config_mode(config_path, &args)
    } else {
        // No arguments - show help
        println!("FIX Log Tabulator - No input specified");
        println!("\nQuick Start:");
        println!("  fix-log-cli --log fix_session.log");
        println!("  fix-log-cli --log fix_session.log --format csv");
        println!("\nFor multi-file runs and schema extensions:");
        println!("  fix-log-cli --config config.toml");
        println!("\nUse --help for more options");
        Ok(())
    }
}

/// Simple mode - tabulate a single log file with the built-in schema
fn simple_mode(log_path: &Path, args: &Args) -> Result<()> {
    let decoder = Decoder::new();
    log::debug!(
        "Built-in schema: {} fields ({} repeating)",
        decoder.schema().len(),
        decoder.schema().num_repeating()
    );

    process_file(
        &decoder,
        log_path,
        args.output.as_deref(),
        None,
        args.format,
        args,
    )
}

/// Config mode - multiple input files and schema extensions
fn config_mode(config_path: &Path, args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let app_config = config::load_config(config_path)?;

    if app_config.input.files.is_empty() {
        bail!("config lists no input files");
    }

    let schema = FieldSchema::default_fix().with_extra_fields(app_config.schema.extra_fields)?;
    let decoder = Decoder::with_schema(schema);
    log::debug!(
        "Schema after extensions: {} fields",
        decoder.schema().len()
    );

    for input in &app_config.input.files {
        process_file(
            &decoder,
            input,
            None,
            app_config.output.output_dir.as_deref(),
            app_config.output.format,
            args,
        )?;
    }
    Ok(())
}

/// Read, decode, assemble, and write one log file
fn process_file(
    decoder: &Decoder,
    input: &Path,
    explicit_output: Option<&Path>,
    output_dir: Option<&Path>,
    format: OutputFormat,
    args: &Args,
) -> Result<()> {
    log::info!("Reading log file: {:?}", input);
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read log file: {:?}", input))?;

    let mut lines: Vec<&str> = content.lines().collect();
    if let Some(max) = args.max_lines {
        lines.truncate(max);
    }

    // Per-line decoding is pure, so lines fan out across threads; the indexed
    // collect keeps original line order, which the assembler's row order and
    // unknown-column discovery depend on.
    let outcomes: Vec<(usize, fix_log_decoder::Result<DecodedRecord>)> = lines
        .par_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, decoder.decode_line(line)))
        .collect();

    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures: Vec<LineError> = Vec::new();
    for (line_no, outcome) in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(error) => failures.push(LineError { line_no, error }),
        }
    }

    for failure in &failures {
        log::warn!("skipping line {}: {}", failure.line_no, failure.error);
    }
    if args.strict {
        if let Some(first) = failures.first() {
            bail!("line {} is unparsable: {}", first.line_no, first.error);
        }
    }

    let table = decoder.assemble(&records);
    let output_path = report::resolve_output_path(input, explicit_output, output_dir, format);
    report::write_table(&table, format, &output_path)?;

    println!("Parsed file: {:?}", output_path);
    println!("  Rows:    {}", table.num_rows());
    println!("  Columns: {}", table.num_columns());
    if !failures.is_empty() {
        println!("  Skipped: {} unparsable line(s)", failures.len());
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
