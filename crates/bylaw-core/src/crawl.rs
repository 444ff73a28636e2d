//! Site crawling: walk listing pages, record documents, optionally extract them.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CrawlError;
use crate::fetch::{ExtractionRequest, Fetcher};
use crate::models::config::BylawConfig;
use crate::models::document::DocumentRecord;
use crate::models::result::ExtractionRecord;
use crate::pdf::PdfExtractor;
use crate::pipeline;
use crate::sites::{DocumentLink, SiteScraper};
use crate::store::DocumentStore;

/// Knobs for a single site crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum listing pages visited.
    pub max_pages: usize,
    /// Extract text from newly discovered documents.
    pub extract: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&BylawConfig::default())
    }
}

impl From<&BylawConfig> for CrawlOptions {
    fn from(config: &BylawConfig) -> Self {
        Self {
            max_pages: config.crawl.max_pages,
            extract: config.crawl.extract_new,
            timeout: config.fetch.timeout(),
        }
    }
}

/// Counters reported after crawling a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub site_id: String,
    pub pages_visited: usize,
    pub links_found: usize,
    pub new_documents: usize,
    pub known_documents: usize,
    pub extracted: usize,
    pub failures: usize,
}

/// Crawls registered sites with a shared fetcher and extractor.
pub struct Crawler<'a> {
    fetcher: &'a Fetcher,
    extractor: &'a PdfExtractor,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a Fetcher, extractor: &'a PdfExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Crawl one site.
    ///
    /// Listing-page and extraction failures are logged and counted; only
    /// store failures abort the crawl.
    pub async fn crawl_site(
        &self,
        scraper: &dyn SiteScraper,
        store: &mut dyn DocumentStore,
        options: &CrawlOptions,
    ) -> Result<CrawlSummary, CrawlError> {
        let site = scraper.site();
        if !site.enabled {
            return Err(CrawlError::SiteDisabled(site.id.clone()));
        }

        let mut summary = CrawlSummary {
            site_id: site.id.clone(),
            ..CrawlSummary::default()
        };
        info!("Crawling {} ({})", site.name, site.start_url());

        let links = self.discover(scraper, options, &mut summary).await;
        summary.links_found = links.len();

        for link in links {
            let url = link.url.to_string();
            if store.contains(&site.id, &url) {
                store.touch(&site.id, &url, Utc::now())?;
                summary.known_documents += 1;
                continue;
            }

            debug!("New document for {}: {}", site.id, url);
            store.insert(DocumentRecord::discovered(
                &site.id,
                &url,
                link.title,
                Utc::now(),
            ))?;
            summary.new_documents += 1;

            if options.extract {
                let request = ExtractionRequest::remote(&url, options.timeout);
                let result = pipeline::run(self.fetcher, self.extractor, &request).await;
                let record = ExtractionRecord::from(&result);
                if record.is_success() {
                    summary.extracted += 1;
                } else {
                    summary.failures += 1;
                }
                store.update_extraction(&site.id, &url, &record)?;
            }
        }

        info!(
            "Finished {}: {} pages, {} links, {} new, {} known, {} failures",
            site.id,
            summary.pages_visited,
            summary.links_found,
            summary.new_documents,
            summary.known_documents,
            summary.failures
        );
        Ok(summary)
    }

    /// Walk listing pages and collect unique document links.
    async fn discover(
        &self,
        scraper: &dyn SiteScraper,
        options: &CrawlOptions,
        summary: &mut CrawlSummary,
    ) -> Vec<DocumentLink> {
        let site = scraper.site();
        let mut next = match Url::parse(site.start_url()) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Invalid start URL for {}: {}", site.id, e);
                summary.failures += 1;
                None
            }
        };

        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        while let Some(page_url) = next.take() {
            if visited.len() >= options.max_pages {
                debug!("Reached page limit of {} for {}", options.max_pages, site.id);
                break;
            }
            if !visited.insert(page_url.clone()) {
                debug!("Already visited {}, stopping", page_url);
                break;
            }

            let body = match self.fetcher.fetch_page(page_url.as_str(), options.timeout).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to fetch listing page {}: {}", page_url, e);
                    summary.failures += 1;
                    break;
                }
            };
            summary.pages_visited += 1;

            let (found, following) = {
                let page = Html::parse_document(&body);
                (
                    scraper.find_document_links(&page, &page_url),
                    scraper.next_page(&page, &page_url),
                )
            };
            debug!("{} document links on {}", found.len(), page_url);

            links.extend(found.into_iter().filter(|l| seen.insert(l.url.clone())));
            next = following;
        }

        links
    }
}
