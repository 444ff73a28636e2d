//! Persisted record of a discovered bylaw document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::ExtractionRecord;

/// A document discovered on a municipal site, keyed by (site_id, url).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub site_id: String,
    pub url: String,

    /// Link text the document was found under.
    #[serde(default)]
    pub title: Option<String>,

    pub discovered_at: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,

    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub extraction_method: Option<String>,
    #[serde(default)]
    pub char_count: Option<usize>,
    #[serde(default)]
    pub extraction_error: Option<String>,
}

impl DocumentRecord {
    /// A freshly discovered, not yet extracted document.
    pub fn discovered(
        site_id: impl Into<String>,
        url: impl Into<String>,
        title: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            url: url.into(),
            title,
            discovered_at: at,
            last_checked: at,
            content_hash: None,
            extraction_method: None,
            char_count: None,
            extraction_error: None,
        }
    }

    /// Copy the outcome of an extraction onto this record.
    pub fn apply_extraction(&mut self, record: &ExtractionRecord) {
        match &record.metadata {
            Some(metadata) if record.success => {
                self.content_hash = record.content_hash.clone();
                self.extraction_method = Some(metadata.extraction_method.clone());
                self.char_count = Some(metadata.char_count);
                self.extraction_error = None;
            }
            _ => {
                self.extraction_error = record.error.clone();
            }
        }
    }

    pub fn is_extracted(&self) -> bool {
        self.content_hash.is_some()
    }
}
