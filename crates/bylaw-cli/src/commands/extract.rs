//! Extract command - fetch one bylaw PDF and print its record.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args};
use console::style;
use tracing::{debug, info};

use bylaw_core::{ExtractionRecord, ExtractionRequest, Fetcher, PdfExtractor, pipeline};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct ExtractArgs {
    /// URL of the PDF to download
    #[arg(long)]
    url: Option<String>,

    /// Path of a local PDF
    #[arg(long)]
    file: Option<PathBuf>,

    /// Request timeout in seconds (default from config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON record
    #[arg(long)]
    pretty: bool,
}

impl ExtractArgs {
    fn request(&self, timeout: Duration) -> anyhow::Result<ExtractionRequest> {
        match (&self.url, &self.file) {
            (Some(url), None) => Ok(ExtractionRequest::remote(url, timeout)),
            (None, Some(path)) => Ok(ExtractionRequest::local(path, timeout)),
            _ => anyhow::bail!("exactly one of --url or --file is required"),
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.fetch.timeout());

    let fetcher = Fetcher::new(&config.fetch)?;
    let extractor = PdfExtractor::from_config(&config.extraction)?;
    debug!("Strategies: {:?}", extractor.strategy_names());

    let request = args.request(timeout)?;
    info!("Extracting {}", request.source());

    let result = pipeline::run(&fetcher, &extractor, &request).await;
    let record = ExtractionRecord::from(&result);

    let output = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if record.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(error) = &record.error {
            eprintln!("{} {}", style("✗").red(), error);
        }
        Ok(ExitCode::FAILURE)
    }
}
