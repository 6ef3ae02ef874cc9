//! csvql - run one SELECT / UPDATE / DELETE query against a CSV file

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::Parser;
use csvql::{EngineConfig, HeaderMode, OperationKind, QueryEngine, QueryReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Query and edit CSV files with a small SQL dialect", long_about = None)]
struct Args {
    /// CSV file to query
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// SELECT, UPDATE or DELETE statement; the table name is a placeholder
    #[arg(value_name = "QUERY")]
    query: String,

    /// Field delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// The first line is data, not a header
    #[arg(long)]
    no_header: bool,

    /// JSON file with engine settings; flags override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the result of an UPDATE or DELETE back to FILE
    #[arg(long)]
    in_place: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(report) => {
            if let Err(err) = print_report(&args, &report) {
                eprintln!("error: {:#}", err);
                return ExitCode::FAILURE;
            }
            if report.is_failure() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Loads the configuration and the file, runs the query and applies `--in-place`
fn run(args: &Args) -> Result<QueryReport> {
    let config = load_config(args)?;
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let report = QueryEngine::new(config).run(&text, &args.query);
    let mutated = matches!(report.operation, OperationKind::Update | OperationKind::Delete)
        && !report.is_failure()
        && report.rows_affected > 0;
    if args.in_place && mutated {
        fs::write(&args.file, &report.result_text)
            .with_context(|| format!("failed to write {}", args.file.display()))?;
    }
    Ok(report)
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got '{}'", delimiter);
        }
        config.delimiter = delimiter as u8;
    }
    if args.no_header {
        config.header = HeaderMode::Absent;
    }
    Ok(config)
}

fn print_report(args: &Args, report: &QueryReport) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if !report.is_failure() && !(args.in_place && !report.is_projection) {
        print!("{}", report.result_text);
    }
    eprintln!("{}", report.summary);
    for diagnostic in &report.diagnostics {
        eprintln!("  - {}", diagnostic);
    }
    Ok(())
}
