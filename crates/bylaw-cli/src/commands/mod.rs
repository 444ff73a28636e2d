//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod crawl;
pub mod extract;
pub mod sites;
