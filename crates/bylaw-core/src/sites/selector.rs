//! CSS-selector driven scraper usable for most municipal sites.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::trace;
use url::Url;

use super::{DocumentLink, SiteScraper};
use crate::error::SiteError;
use crate::models::site::SiteConfig;

/// Scraper configured entirely by the site's selectors.
///
/// Document links are elements matched by `link_selector` whose resolved
/// `href` path ends in `.pdf`. The next page is the first element matched
/// by `next_selector` with an `href`.
pub struct SelectorScraper {
    site: SiteConfig,
    link_selector: Selector,
    next_selector: Selector,
}

impl SelectorScraper {
    pub fn new(site: SiteConfig) -> Result<Self, SiteError> {
        if Url::parse(&site.base_url).is_err() {
            return Err(SiteError::InvalidUrl {
                site_id: site.id.clone(),
                url: site.base_url.clone(),
            });
        }
        if let Some(search) = &site.search_url {
            if Url::parse(search).is_err() {
                return Err(SiteError::InvalidUrl {
                    site_id: site.id.clone(),
                    url: search.clone(),
                });
            }
        }

        let link_selector = parse_selector(&site, &site.link_selector)?;
        let next_selector = parse_selector(&site, &site.next_selector)?;

        Ok(Self {
            site,
            link_selector,
            next_selector,
        })
    }
}

impl SiteScraper for SelectorScraper {
    fn site(&self) -> &SiteConfig {
        &self.site
    }

    fn find_document_links(&self, page: &Html, page_url: &Url) -> Vec<DocumentLink> {
        let mut seen = HashSet::new();

        page.select(&self.link_selector)
            .filter_map(|el| {
                let url = resolve_href(&el, page_url)?;
                if !url.path().to_ascii_lowercase().ends_with(".pdf") {
                    return None;
                }
                Some(DocumentLink {
                    url,
                    title: anchor_text(&el),
                })
            })
            .filter(|link| seen.insert(link.url.clone()))
            .inspect(|link| trace!("Found document link {}", link.url))
            .collect()
    }

    fn next_page(&self, page: &Html, page_url: &Url) -> Option<Url> {
        page.select(&self.next_selector)
            .find_map(|el| resolve_href(&el, page_url))
            .filter(|url| url != page_url)
    }
}

fn parse_selector(site: &SiteConfig, selector: &str) -> Result<Selector, SiteError> {
    Selector::parse(selector).map_err(|e| SiteError::InvalidSelector {
        site_id: site.id.clone(),
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve an element's `href` against the page, keeping only http(s) URLs.
fn resolve_href(el: &ElementRef<'_>, page_url: &Url) -> Option<Url> {
    let href = el.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = page_url.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn anchor_text(el: &ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}
