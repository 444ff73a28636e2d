//! CLI for harvesting municipal bylaw documents.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, crawl, extract, sites};

/// Bylaw harvester - fetch bylaw PDFs and extract their text
#[derive(Parser)]
#[command(name = "bylaw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a single bylaw PDF
    Extract(extract::ExtractArgs),

    /// Extract text from many local PDFs
    Batch(batch::BatchArgs),

    /// Discover bylaw documents on registered sites
    Crawl(crawl::CrawlArgs),

    /// List registered sites
    Sites(sites::SitesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr; stdout carries records.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Crawl(args) => crawl::run(args, config_path).await,
        Commands::Sites(args) => sites::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
