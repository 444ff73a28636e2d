//! Persistence of discovered documents, keyed by (site id, url).

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::document::DocumentRecord;
use crate::models::result::ExtractionRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage for document records.
pub trait DocumentStore {
    /// Look up a record.
    fn get(&self, site_id: &str, url: &str) -> Option<DocumentRecord>;

    /// Insert a new record; fails if the key already exists.
    fn insert(&mut self, record: DocumentRecord) -> Result<()>;

    /// Update the last-checked timestamp of an existing record.
    fn touch(&mut self, site_id: &str, url: &str, at: DateTime<Utc>) -> Result<()>;

    /// Store the outcome of extracting an existing record's document.
    fn update_extraction(
        &mut self,
        site_id: &str,
        url: &str,
        extraction: &ExtractionRecord,
    ) -> Result<()>;

    /// All records for a site, ordered by url.
    fn list(&self, site_id: &str) -> Vec<DocumentRecord>;

    fn contains(&self, site_id: &str, url: &str) -> bool {
        self.get(site_id, url).is_some()
    }
}
