//! In-memory document store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{DocumentStore, Result};
use crate::error::StoreError;
use crate::models::document::DocumentRecord;
use crate::models::result::ExtractionRecord;

type Key = (String, String);

/// Document store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<Key, DocumentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record, ordered by (site id, url).
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.records.values()
    }

    pub(crate) fn from_records(records: impl IntoIterator<Item = DocumentRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| ((r.site_id.clone(), r.url.clone()), r))
                .collect(),
        }
    }

    fn get_mut(&mut self, site_id: &str, url: &str) -> Result<&mut DocumentRecord> {
        self.records
            .get_mut(&(site_id.to_string(), url.to_string()))
            .ok_or_else(|| StoreError::Missing {
                site_id: site_id.to_string(),
                url: url.to_string(),
            })
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, site_id: &str, url: &str) -> Option<DocumentRecord> {
        self.records
            .get(&(site_id.to_string(), url.to_string()))
            .cloned()
    }

    fn insert(&mut self, record: DocumentRecord) -> Result<()> {
        let key = (record.site_id.clone(), record.url.clone());
        if self.records.contains_key(&key) {
            return Err(StoreError::Duplicate {
                site_id: key.0,
                url: key.1,
            });
        }
        self.records.insert(key, record);
        Ok(())
    }

    fn touch(&mut self, site_id: &str, url: &str, at: DateTime<Utc>) -> Result<()> {
        self.get_mut(site_id, url)?.last_checked = at;
        Ok(())
    }

    fn update_extraction(
        &mut self,
        site_id: &str,
        url: &str,
        extraction: &ExtractionRecord,
    ) -> Result<()> {
        self.get_mut(site_id, url)?.apply_extraction(extraction);
        Ok(())
    }

    fn list(&self, site_id: &str) -> Vec<DocumentRecord> {
        self.records
            .values()
            .filter(|r| r.site_id == site_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::RecordMetadata;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn record(site: &str, url: &str) -> DocumentRecord {
        DocumentRecord::discovered(site, url, Some("By-law".to_string()), at(9))
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();

        assert!(store.contains("springfield", "https://s/a.pdf"));
        assert!(!store.contains("shelbyville", "https://s/a.pdf"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();

        let err = store
            .insert(record("springfield", "https://s/a.pdf"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_touch() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();
        store.touch("springfield", "https://s/a.pdf", at(17)).unwrap();

        let stored = store.get("springfield", "https://s/a.pdf").unwrap();
        assert_eq!(stored.discovered_at, at(9));
        assert_eq!(stored.last_checked, at(17));

        assert!(matches!(
            store.touch("springfield", "https://s/missing.pdf", at(17)),
            Err(StoreError::Missing { .. })
        ));
    }

    #[test]
    fn test_update_extraction() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();

        let extraction = ExtractionRecord {
            success: true,
            content_text: Some("Section 1".to_string()),
            content_hash: Some("deadbeef".to_string()),
            metadata: Some(RecordMetadata {
                source: "https://s/a.pdf".to_string(),
                file_size_bytes: 10,
                char_count: 9,
                word_count: 2,
                line_count: 1,
                extraction_method: "lopdf".to_string(),
                extraction_time_seconds: 0.1,
            }),
            error: None,
            extraction_time_seconds: None,
        };
        store
            .update_extraction("springfield", "https://s/a.pdf", &extraction)
            .unwrap();

        let stored = store.get("springfield", "https://s/a.pdf").unwrap();
        assert!(stored.is_extracted());
        assert_eq!(stored.content_hash.as_deref(), Some("deadbeef"));
        assert_eq!(stored.extraction_method.as_deref(), Some("lopdf"));
        assert_eq!(stored.char_count, Some(9));
    }

    #[test]
    fn test_failed_extraction_recorded() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();

        let extraction = ExtractionRecord {
            success: false,
            content_text: None,
            content_hash: None,
            metadata: None,
            error: Some("All extraction methods failed.".to_string()),
            extraction_time_seconds: Some(0.2),
        };
        store
            .update_extraction("springfield", "https://s/a.pdf", &extraction)
            .unwrap();

        let stored = store.get("springfield", "https://s/a.pdf").unwrap();
        assert!(!stored.is_extracted());
        assert_eq!(
            stored.extraction_error.as_deref(),
            Some("All extraction methods failed.")
        );
    }

    #[test]
    fn test_list_by_site() {
        let mut store = MemoryStore::new();
        store.insert(record("springfield", "https://s/b.pdf")).unwrap();
        store.insert(record("springfield", "https://s/a.pdf")).unwrap();
        store.insert(record("shelbyville", "https://t/a.pdf")).unwrap();

        let urls: Vec<_> = store
            .list("springfield")
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, vec!["https://s/a.pdf", "https://s/b.pdf"]);
    }
}
