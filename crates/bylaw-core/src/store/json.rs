//! Document store persisted as a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{DocumentStore, MemoryStore, Result};
use crate::models::document::DocumentRecord;
use crate::models::result::ExtractionRecord;

/// Document store backed by a pretty-printed JSON array on disk.
///
/// Every mutation rewrites the file through a temporary sibling and a
/// rename, so a crash never leaves a half-written store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open a store, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let records: Vec<DocumentRecord> = serde_json::from_str(&content)?;
            debug!("Loaded {} documents from {}", records.len(), path.display());
            MemoryStore::from_records(records)
        } else {
            MemoryStore::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let records: Vec<&DocumentRecord> = self.inner.records().collect();
        let content = serde_json::to_string_pretty(&records)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, site_id: &str, url: &str) -> Option<DocumentRecord> {
        self.inner.get(site_id, url)
    }

    fn insert(&mut self, record: DocumentRecord) -> Result<()> {
        self.inner.insert(record)?;
        self.persist()
    }

    fn touch(&mut self, site_id: &str, url: &str, at: DateTime<Utc>) -> Result<()> {
        self.inner.touch(site_id, url, at)?;
        self.persist()
    }

    fn update_extraction(
        &mut self,
        site_id: &str,
        url: &str,
        extraction: &ExtractionRecord,
    ) -> Result<()> {
        self.inner.update_extraction(site_id, url, extraction)?;
        self.persist()
    }

    fn list(&self, site_id: &str) -> Vec<DocumentRecord> {
        self.inner.list(site_id)
    }
}
