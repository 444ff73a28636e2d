//! Per-municipality site configuration.

use serde::{Deserialize, Serialize};

/// A municipal website registered for crawling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable identifier used as part of document keys.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Whether the site is crawled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Municipality home page.
    pub base_url: String,

    /// Page listing bylaws; crawling starts here when set.
    #[serde(default)]
    pub search_url: Option<String>,

    /// CSS selector for candidate document links.
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// CSS selector for the next listing page.
    #[serde(default = "default_next_selector")]
    pub next_selector: String,
}

fn default_enabled() -> bool {
    true
}

fn default_link_selector() -> String {
    "a[href]".to_string()
}

fn default_next_selector() -> String {
    r#"a[rel="next"]"#.to_string()
}

impl SiteConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            base_url: base_url.into(),
            search_url: None,
            link_selector: default_link_selector(),
            next_selector: default_next_selector(),
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    pub fn with_link_selector(mut self, selector: impl Into<String>) -> Self {
        self.link_selector = selector.into();
        self
    }

    pub fn with_next_selector(mut self, selector: impl Into<String>) -> Self {
        self.next_selector = selector.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// URL crawling starts from.
    pub fn start_url(&self) -> &str {
        self.search_url.as_deref().unwrap_or(&self.base_url)
    }
}
