//! Sites command - list registered sites.

use std::process::ExitCode;

use clap::Args;
use console::style;

use bylaw_core::SiteRegistry;

use super::config::load_config;

/// Arguments for the sites command.
#[derive(Args)]
pub struct SitesArgs {
    /// Only list enabled sites
    #[arg(long)]
    enabled: bool,

    /// Print site configurations as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: SitesArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let registry = SiteRegistry::from_configs(&config.sites)?;

    let sites: Vec<_> = registry
        .iter()
        .map(|s| s.site())
        .filter(|s| !args.enabled || s.enabled)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sites)?);
        return Ok(ExitCode::SUCCESS);
    }

    if sites.is_empty() {
        println!("{} No sites registered.", style("ℹ").blue());
        return Ok(ExitCode::SUCCESS);
    }

    for site in sites {
        let status = if site.enabled {
            style("enabled").green()
        } else {
            style("disabled").yellow()
        };
        println!("{:<16} {:<10} {}", style(&site.id).bold(), status, site.name);
        println!("{:<16} {}", "", style(site.start_url()).dim());
    }

    Ok(ExitCode::SUCCESS)
}
