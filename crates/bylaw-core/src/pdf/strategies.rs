//! Concrete text strategies backed by pdf-extract and lopdf.

use lopdf::Document;
use tracing::{debug, trace};

use super::{PageSource, Result, TextStrategy};

/// Layout-aware extraction through `pdf-extract`.
///
/// `pdf-extract` only works on whole documents, so each page is cut out
/// into a single-page document first. A malformed page then fails (or
/// panics) on its own instead of taking the rest of the document with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractStrategy;

impl PdfExtractStrategy {
    pub const NAME: &'static str = "pdf_extract";
}

impl TextStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn open(&self, data: &[u8]) -> Result<Box<dyn PageSource>> {
        let doc = load_document(data)?;
        let page_count = doc.get_pages().len() as u32;
        Ok(Box::new(SplitPages { doc, page_count }))
    }
}

/// Pages cut from a document parsed once in `open`.
struct SplitPages {
    doc: Document,
    page_count: u32,
}

impl SplitPages {
    fn isolate(&self, page: u32) -> Result<Vec<u8>> {
        let pages = self.doc.get_pages();
        if !pages.contains_key(&page) {
            return Err(format!("invalid page number: {}", page));
        }
        let others: Vec<u32> = pages.keys().copied().filter(|&n| n != page).collect();

        let mut doc = self.doc.clone();
        if !others.is_empty() {
            doc.delete_pages(&others);
            doc.prune_objects();
        }

        let mut single = Vec::new();
        doc.save_to(&mut single)
            .map_err(|e| format!("failed to isolate page {}: {}", page, e))?;
        trace!("Isolated page {} into {} bytes", page, single.len());
        Ok(single)
    }
}

impl PageSource for SplitPages {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_text(&mut self, page: u32) -> Result<String> {
        let single = self.isolate(page)?;
        pdf_extract::extract_text_from_mem(&single).map_err(|e| e.to_string())
    }
}

/// Basic content-stream text through `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfStrategy;

impl LopdfStrategy {
    pub const NAME: &'static str = "lopdf";
}

impl TextStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn open(&self, data: &[u8]) -> Result<Box<dyn PageSource>> {
        let doc = load_document(data)?;
        let pages = doc.get_pages().keys().copied().collect();
        Ok(Box::new(LopdfPages { doc, pages }))
    }
}

struct LopdfPages {
    doc: Document,
    pages: Vec<u32>,
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&mut self, page: u32) -> Result<String> {
        if !self.pages.contains(&page) {
            return Err(format!("invalid page number: {}", page));
        }
        self.doc.extract_text(&[page]).map_err(|e| e.to_string())
    }
}

/// Parse a document, decrypting it with the empty password when needed.
///
/// A decrypted document no longer carries its `/Encrypt` entry, so saving
/// it writes plain objects.
fn load_document(data: &[u8]) -> Result<Document> {
    let mut doc = Document::load_mem(data).map_err(|e| format!("failed to parse PDF: {}", e))?;

    if doc.is_encrypted() {
        if let Err(e) = doc.decrypt("") {
            debug!("Empty password rejected: {}", e);
            return Err("document is encrypted".to_string());
        }
        debug!("Decrypted PDF with empty password");
    }

    if doc.get_pages().is_empty() {
        return Err("PDF has no pages".to_string());
    }

    Ok(doc)
}
