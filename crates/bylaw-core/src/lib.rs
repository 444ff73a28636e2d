//! Core library for municipal bylaw harvesting.
//!
//! This crate provides:
//! - Document fetching from local paths and URLs, with bounded retries
//! - PDF text extraction with ordered fallback strategies
//! - A stable, flat result record with content fingerprint and text statistics
//! - Site scrapers, a site registry and a document store for crawling

pub mod crawl;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod sites;
pub mod store;
pub mod text;

pub use crawl::{CrawlOptions, CrawlSummary, Crawler};
pub use error::{BylawError, ExtractionError, FetchError, Result};
pub use fetch::{ExtractionRequest, Fetcher, RawDocument, RetryPolicy, SourceKind};
pub use models::config::BylawConfig;
pub use models::result::{ExtractionRecord, ExtractionResult, StrategyAttempt};
pub use pdf::{PdfExtractor, TextStrategy};
pub use sites::{SiteRegistry, SiteScraper};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
