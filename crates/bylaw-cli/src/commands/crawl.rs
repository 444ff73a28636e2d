//! Crawl command - discover bylaw documents on registered sites.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Args};
use console::style;
use tracing::{info, warn};

use bylaw_core::{
    CrawlOptions, CrawlSummary, Crawler, Fetcher, JsonFileStore, PdfExtractor, SiteRegistry,
    SiteScraper,
};

use super::config::load_config;

/// Arguments for the crawl command.
#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["site", "all"])))]
pub struct CrawlArgs {
    /// Site identifier to crawl
    #[arg(short, long)]
    site: Option<String>,

    /// Crawl every enabled site
    #[arg(long)]
    all: bool,

    /// Document store file (default from config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Extract text from newly discovered documents
    #[arg(long)]
    extract: bool,

    /// Maximum listing pages per site
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,
}

pub async fn run(args: CrawlArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let registry = SiteRegistry::from_configs(&config.sites)?;

    let mut options = CrawlOptions::from(&config);
    options.extract |= args.extract;
    if let Some(max_pages) = args.max_pages {
        options.max_pages = max_pages as usize;
    }

    let targets: Vec<&dyn SiteScraper> = match &args.site {
        Some(id) => vec![registry.require(id)?],
        None => registry.enabled().collect(),
    };

    if targets.is_empty() {
        eprintln!(
            "{} No enabled sites. Enable one with 'bylaw config set sites.0.enabled true'.",
            style("ℹ").blue()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let store_path = args.store.unwrap_or(config.crawl.store_path);
    let mut store = JsonFileStore::open(&store_path)?;
    info!("Using document store {}", store_path.display());

    let fetcher = Fetcher::new(&config.fetch)?;
    let extractor = PdfExtractor::from_config(&config.extraction)?;
    let crawler = Crawler::new(&fetcher, &extractor);

    let mut failures = 0;
    for scraper in targets {
        match crawler.crawl_site(scraper, &mut store, &options).await {
            Ok(summary) => {
                print_summary(&summary);
                failures += summary.failures;
            }
            Err(e) if args.all => {
                warn!("Skipping {}: {}", scraper.site().id, e);
                eprintln!(
                    "{} {}: {}",
                    style("✗").red(),
                    style(&scraper.site().id).bold(),
                    e
                );
                failures += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    eprintln!(
        "{} {} documents recorded in {}",
        style("✓").green(),
        store.len(),
        store_path.display()
    );

    if failures == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_summary(summary: &CrawlSummary) {
    println!(
        "{} {}: {} pages, {} links, {} new, {} known, {} extracted, {} failures",
        style("•").cyan(),
        style(&summary.site_id).bold(),
        summary.pages_visited,
        summary.links_found,
        style(summary.new_documents).green(),
        summary.known_documents,
        summary.extracted,
        if summary.failures == 0 {
            style(summary.failures).dim()
        } else {
            style(summary.failures).red()
        }
    );
}
