//! cvdiff backup comparison tool CLI

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use cvdiff::report::store::weekday_tag;
use cvdiff::{Comparator, Comparison, Normalizer, ReportRunner, ReportSelector, RunConfig};
use tracing_subscriber::EnvFilter;

/// cvdiff backup comparison tool
#[derive(Parser)]
#[command(name = "cvdiff")]
#[command(version)]
#[command(about = "Semantic diff reports for dated XML backups", long_about = None)]
struct Cli {
    /// Log per-file detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the two latest backups and write today's history reports
    #[command(visible_alias = "r")]
    Report {
        /// Directory holding the YYYYMMDD backup folders
        #[arg(short, long, env = "CVDIFF_BACKUP_PATH")]
        backup_path: PathBuf,

        /// Report folder (default: <backup-path>/DiffReport)
        #[arg(short, long, env = "CVDIFF_OUTPUT")]
        output: Option<PathBuf>,

        /// Categories to report on
        #[arg(
            short = 't',
            long,
            env = "CVDIFF_REPORT_TYPE",
            value_enum,
            default_value_t = ReportType::Both
        )]
        report_type: ReportType,
    },

    /// Compare two XML files semantically
    #[command(visible_alias = "c")]
    Compare {
        /// Old file
        old: PathBuf,
        /// New file
        new: PathBuf,
    },

    /// Print the normalized form of an XML file
    #[command(visible_alias = "n")]
    Canonical {
        /// Input file
        file: PathBuf,
        /// Output file (default: stdout)
        output: Option<PathBuf>,

        /// Write indented XML instead of the one-line comparison form
        #[arg(short, long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportType {
    Composite,
    Substation,
    Both,
}

impl From<ReportType> for ReportSelector {
    fn from(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Composite => ReportSelector::Composite,
            ReportType::Substation => ReportSelector::Substation,
            ReportType::Both => ReportSelector::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report {
            backup_path,
            output,
            report_type,
        } => run_report(backup_path, output, report_type.into()),
        Commands::Compare { old, new } => run_compare(&old, &new),
        Commands::Canonical {
            file,
            output,
            pretty,
        } => run_canonical(&file, output.as_deref(), pretty),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Runs the report for each selected category. Returns false if any failed.
fn run_report(
    backup_path: PathBuf,
    output: Option<PathBuf>,
    selector: ReportSelector,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = RunConfig::new(backup_path).with_selector(selector);
    if let Some(output) = output {
        config = config.with_output(output);
    }

    let today = Local::now().weekday();
    eprintln!(
        "Reporting {} for {} into {}",
        selector,
        weekday_tag(today),
        config.output_folder().display()
    );

    let runner = ReportRunner::new(config);
    let mut ok = true;
    for (category, result) in runner.run(today) {
        match result {
            Ok(outcome) => println!(
                "{}: {} -> {}: {} [{}]",
                category,
                outcome.old,
                outcome.new,
                outcome.stats,
                outcome.report_path.display()
            ),
            Err(e) => {
                println!("{}: FAILED: {}", category, e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

/// Compares two files and prints SAME or DIFFERENT.
fn run_compare(old: &Path, new: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let normalizer = Normalizer::new();
    match normalizer.compare(old, new) {
        Comparison::Same => println!("SAME"),
        Comparison::Different => println!("DIFFERENT"),
    }
    Ok(true)
}

/// Writes the normalized form of a file.
fn run_canonical(
    path: &Path,
    output_path: Option<&Path>,
    pretty: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let normalizer = Normalizer::new();
    let text = if pretty {
        normalizer.pretty_file(path)?
    } else {
        normalizer.canonical_file(path)?
    };

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    writeln!(output, "{}", text.trim_end())?;
    output.flush()?;
    Ok(true)
}
