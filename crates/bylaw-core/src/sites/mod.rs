//! Municipal site scrapers and the registry that selects them.

mod selector;

pub use selector::SelectorScraper;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::error::SiteError;
use crate::models::site::SiteConfig;

/// A document link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub url: Url,
    /// Anchor text, whitespace-collapsed.
    pub title: Option<String>,
}

/// Site-specific knowledge of where bylaw documents are linked.
pub trait SiteScraper: Send + Sync {
    /// Configuration of the site this scraper handles.
    fn site(&self) -> &SiteConfig;

    /// Document links on a listing page, de-duplicated, in page order.
    fn find_document_links(&self, page: &Html, page_url: &Url) -> Vec<DocumentLink>;

    /// The next listing page, if any.
    fn next_page(&self, page: &Html, page_url: &Url) -> Option<Url>;
}

/// Registered scrapers, looked up by site identifier.
#[derive(Default)]
pub struct SiteRegistry {
    scrapers: Vec<Box<dyn SiteScraper>>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build selector-driven scrapers for every configured site.
    pub fn from_configs(sites: &[SiteConfig]) -> Result<Self, SiteError> {
        let mut registry = Self::new();
        for site in sites {
            registry.register(Box::new(SelectorScraper::new(site.clone())?))?;
        }
        debug!("Registered {} sites", registry.len());
        Ok(registry)
    }

    /// Add a scraper; identifiers must be unique.
    pub fn register(&mut self, scraper: Box<dyn SiteScraper>) -> Result<(), SiteError> {
        let id = &scraper.site().id;
        if self.get(id).is_some() {
            return Err(SiteError::DuplicateSite(id.clone()));
        }
        self.scrapers.push(scraper);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn SiteScraper> {
        self.scrapers
            .iter()
            .find(|s| s.site().id == id)
            .map(|s| s.as_ref())
    }

    /// Look up a site, failing on unknown identifiers.
    pub fn require(&self, id: &str) -> Result<&dyn SiteScraper, SiteError> {
        self.get(id)
            .ok_or_else(|| SiteError::UnknownSite(id.to_string()))
    }

    /// All scrapers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn SiteScraper> {
        self.scrapers.iter().map(|s| s.as_ref())
    }

    /// Scrapers whose site is enabled.
    pub fn enabled(&self) -> impl Iterator<Item = &dyn SiteScraper> {
        self.iter().filter(|s| s.site().enabled)
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sites() -> Vec<SiteConfig> {
        vec![
            SiteConfig::new("springfield", "Springfield", "https://springfield.example.org"),
            SiteConfig::new("shelbyville", "Shelbyville", "https://shelbyville.example.org")
                .disabled(),
        ]
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SiteRegistry::from_configs(&sites()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("springfield").unwrap().site().name, "Springfield");
        assert!(registry.get("ogdenville").is_none());
        assert!(matches!(
            registry.require("ogdenville"),
            Err(SiteError::UnknownSite(_))
        ));
    }

    #[test]
    fn test_enabled_filter() {
        let registry = SiteRegistry::from_configs(&sites()).unwrap();
        let enabled: Vec<_> = registry.enabled().map(|s| s.site().id.clone()).collect();
        assert_eq!(enabled, vec!["springfield"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut configs = sites();
        configs.push(SiteConfig::new("springfield", "Again", "https://x.example.org"));

        assert!(matches!(
            SiteRegistry::from_configs(&configs),
            Err(SiteError::DuplicateSite(id)) if id == "springfield"
        ));
    }
}
