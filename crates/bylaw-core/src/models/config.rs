//! Configuration structures for fetching, extraction and crawling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::site::SiteConfig;

/// Main configuration for the bylaw pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BylawConfig {
    /// Network fetch configuration.
    pub fetch: FetchConfig,

    /// Extraction engine configuration.
    pub extraction: ExtractionConfig,

    /// Crawl configuration.
    pub crawl: CrawlConfig,

    /// Registered municipal sites.
    pub sites: Vec<SiteConfig>,
}

impl Default for BylawConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            crawl: CrawlConfig::default(),
            sites: default_sites(),
        }
    }
}

/// Sample sites shipped disabled; enable or replace them in the config file.
fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig::new("springfield", "City of Springfield", "https://www.springfield.example.org")
            .with_search_url("https://www.springfield.example.org/council/bylaws")
            .disabled(),
        SiteConfig::new("shelbyville", "Town of Shelbyville", "https://shelbyville.example.org")
            .with_link_selector("table.bylaws a[href]")
            .disabled(),
    ]
}

/// Network fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Total attempts per request, including the first.
    pub max_attempts: u32,

    /// Base backoff in milliseconds; retry n waits `backoff * 2^(n-1)`.
    pub backoff_ms: u64,

    /// HTTP statuses that trigger a retry.
    pub retry_statuses: Vec<u16>,

    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Largest document body accepted, in bytes.
    pub max_document_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_attempts: 3,
            backoff_ms: 1000,
            retry_statuses: vec![429, 500, 502, 503, 504],
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            max_document_bytes: 100 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Extraction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategy names in the order they are tried.
    pub strategies: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: vec!["pdf_extract".to_string(), "lopdf".to_string()],
        }
    }
}

/// Crawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum listing pages visited per site.
    pub max_pages: usize,

    /// Document store file.
    pub store_path: PathBuf,

    /// Extract text from newly discovered documents.
    pub extract_new: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            store_path: PathBuf::from("bylaws.json"),
            extract_new: false,
        }
    }
}

impl BylawConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
