//! Batch command - extract text from many local bylaw PDFs.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use bylaw_core::{ExtractionRecord, ExtractionRequest, Fetcher, PdfExtractor, pipeline};

use super::config::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory for one JSON record per file (default: JSON lines on stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write a summary.json of all files
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

const SUMMARY_FILE: &str = "summary.json";

/// A record tagged with the file it came from.
#[derive(Serialize)]
struct BatchEntry<'a> {
    file: String,
    #[serde(flatten)]
    record: &'a ExtractionRecord,
}

/// Outcome of one input file.
struct BatchResult {
    path: PathBuf,
    /// Record file name inside the output directory.
    output: Option<String>,
    record: ExtractionRecord,
}

/// One line of the summary file.
#[derive(Serialize)]
struct SummaryLine<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a str>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction_method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    char_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_pdf(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let fetcher = Fetcher::new(&config.fetch)?;
    let extractor = PdfExtractor::from_config(&config.extraction)?;
    let timeout = config.fetch.timeout();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    let mut names = OutputNames::default();
    if args.summary {
        names.reserve(SUMMARY_FILE);
    }

    for path in files {
        let request = ExtractionRequest::local(&path, timeout);
        let record = ExtractionRecord::from(pipeline::run(&fetcher, &extractor, &request).await);

        if !record.is_success() {
            let error_msg = record.error.as_deref().unwrap_or("unknown error");
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", path.display(), error_msg);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
            }
        }

        let output = match &args.output_dir {
            Some(output_dir) => {
                let name = names.claim(&path);
                let output_path = output_dir.join(&name);
                fs::write(&output_path, serde_json::to_string_pretty(&record)?)?;
                debug!("Wrote output to {}", output_path.display());
                Some(name)
            }
            None => {
                pb.suspend(|| -> anyhow::Result<()> {
                    let entry = BatchEntry {
                        file: path.display().to_string(),
                        record: &record,
                    };
                    println!("{}", serde_json::to_string(&entry)?);
                    Ok(())
                })?;
                None
            }
        };

        results.push(BatchResult {
            path,
            output,
            record,
        });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join(SUMMARY_FILE))
            .unwrap_or_else(|| PathBuf::from(SUMMARY_FILE));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.record.is_success()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if failed.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!();
    eprintln!("{}", style("Failed files:").red());
    for result in &failed {
        eprintln!(
            "  - {}: {}",
            result.path.display(),
            result.record.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(ExitCode::FAILURE)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Record file names handed out during one run.
///
/// Inputs sharing a stem get `-2`, `-3`, ... suffixes so no record
/// overwrites another.
#[derive(Default)]
struct OutputNames {
    used: HashSet<String>,
}

impl OutputNames {
    fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    fn claim(&mut self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("bylaw");

        let mut name = format!("{}.json", stem);
        let mut n = 1;
        while !self.used.insert(name.clone()) {
            n += 1;
            name = format!("{}-{}.json", stem, n);
        }
        name
    }
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let lines: Vec<_> = results
        .iter()
        .map(|result| {
            let record = &result.record;
            SummaryLine {
                file: result.path.display().to_string(),
                output: result.output.as_deref(),
                success: record.is_success(),
                extraction_method: record
                    .metadata
                    .as_ref()
                    .map(|m| m.extraction_method.as_str()),
                char_count: record.metadata.as_ref().map(|m| m.char_count),
                error: record.error.as_deref(),
            }
        })
        .collect();

    fs::write(path, serde_json::to_string_pretty(&lines)?)?;
    Ok(())
}
