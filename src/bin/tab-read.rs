//! CLI tool to decode a tab-delimited file with a column spec.
//!
//! Usage:
//!   tab-read <SPEC> [INPUT]
//!   tab-read <SPEC> [INPUT] -o <OUTPUT>
//!
//! Reads stdin when INPUT is absent or `-`. Each record is written as one
//! JSON array per line.

use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tab_reader::{DEFAULT_MAX_LINE_LENGTH, ReadError, Reader, ReaderOptions, SpecError};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Column spec, e.g. "1s,0u,a"
    spec: String,

    /// Input file (default: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fill columns missing from short lines with null instead of failing
    #[arg(short = 'm', long)]
    allow_missing_columns: bool,

    /// Longest accepted line in bytes, newline included
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid spec: {0}")]
    Spec(#[from] SpecError),
    #[error("{0}")]
    Read(#[from] ReadError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot write record: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_context(context: impl Into<String>) -> impl FnOnce(io::Error) -> CliError {
    let context = context.into();
    move |source| CliError::Io { context, source }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, CliError> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(io::stdin().lock())),
        Some(p) => {
            let f = File::open(p).map_err(io_context(format!("open {}", p.display())))?;
            Ok(Box::new(BufReader::new(f)))
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    let Some(p) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = p.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_context(format!("mkdir -p {}", parent.display())))?;
    }
    let f = File::create(p).map_err(io_context(format!("create {}", p.display())))?;
    Ok(Box::new(BufWriter::new(f)))
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = ReaderOptions::new()
        .allow_missing_columns(cli.allow_missing_columns)
        .max_line_length(cli.max_line_length);
    debug!(?options, spec = %cli.spec, "starting");

    let input = open_input(cli.input.as_deref())?;
    let mut reader = Reader::with_options(input, &cli.spec, options)?;
    let mut out = open_output(cli.output.as_deref())?;

    let mut records = 0u64;
    while let Some(record) = reader.read_next()? {
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n").map_err(io_context("write output"))?;
        records += 1;
    }
    out.flush().map_err(io_context("flush output"))?;

    info!(records, lines = reader.line_number(), "done");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
