//! Error types for the bylaw-core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::result::StrategyAttempt;

/// Main error type for the bylaw library.
#[derive(Error, Debug)]
pub enum BylawError {
    /// Document retrieval error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Site registry or scraper error.
    #[error("site error: {0}")]
    Site(#[from] SiteError),

    /// Crawl error.
    #[error("crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while retrieving raw document bytes.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Local path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Source is not a PDF document.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The request did not complete within the timeout.
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// Transport-level failure (DNS, connection reset, TLS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// Non-retryable status, or retries exhausted on a retryable one.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Response body exceeded the configured size limit.
    #[error("document exceeds size limit of {limit} bytes")]
    TooLarge { limit: u64 },

    /// Local read failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the extraction engine.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Every strategy came back empty or failed.
    #[error("All extraction methods failed. {}", summarize_attempts(.attempts))]
    NoTextExtracted { attempts: Vec<StrategyAttempt> },
}

fn summarize_attempts(attempts: &[StrategyAttempt]) -> String {
    attempts
        .iter()
        .map(|a| {
            format!(
                "{}: {}",
                a.strategy,
                a.error.as_deref().unwrap_or("no text extracted")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors related to the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record for this (site, url) pair already exists.
    #[error("document already recorded for site {site_id}: {url}")]
    Duplicate { site_id: String, url: String },

    /// No record for this (site, url) pair.
    #[error("no document recorded for site {site_id}: {url}")]
    Missing { site_id: String, url: String },

    /// Failed to read or write the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not valid JSON.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors related to site configuration and scrapers.
#[derive(Error, Debug)]
pub enum SiteError {
    /// CSS selector could not be parsed.
    #[error("invalid selector {selector:?} for site {site_id}: {reason}")]
    InvalidSelector {
        site_id: String,
        selector: String,
        reason: String,
    },

    /// Configured URL could not be parsed.
    #[error("invalid URL {url:?} for site {site_id}")]
    InvalidUrl { site_id: String, url: String },

    /// Two sites registered under the same identifier.
    #[error("duplicate site identifier: {0}")]
    DuplicateSite(String),

    /// No site registered under this identifier.
    #[error("unknown site: {0}")]
    UnknownSite(String),
}

/// Errors that abort a whole site crawl.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The site is disabled in its configuration.
    #[error("site {0} is disabled")]
    SiteDisabled(String),

    /// Recording a document failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for the bylaw library.
pub type Result<T> = std::result::Result<T, BylawError>;
