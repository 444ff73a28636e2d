//! PDF text extraction with ordered fallback strategies.

mod extractor;
mod strategies;

pub use extractor::PdfExtractor;
pub use strategies::{LopdfStrategy, PdfExtractStrategy};

/// Result type for strategy operations; errors are human-readable reasons.
pub type Result<T> = std::result::Result<T, String>;

/// One self-contained way of turning document bytes into text.
pub trait TextStrategy: Send + Sync {
    /// Name reported as the extraction method.
    fn name(&self) -> &'static str;

    /// Parse the document and expose its pages.
    fn open(&self, data: &[u8]) -> Result<Box<dyn PageSource>>;
}

/// An opened document whose pages can be extracted independently.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract text from a page (1-indexed).
    fn page_text(&mut self, page: u32) -> Result<String>;
}

/// Build a strategy from its configured name.
pub fn strategy_by_name(name: &str) -> Option<Box<dyn TextStrategy>> {
    match name {
        PdfExtractStrategy::NAME => Some(Box::new(PdfExtractStrategy)),
        LopdfStrategy::NAME => Some(Box::new(LopdfStrategy)),
        _ => None,
    }
}

/// Default strategies in preference order: layout-aware first, then basic page text.
pub fn default_strategies() -> Vec<Box<dyn TextStrategy>> {
    vec![Box::new(PdfExtractStrategy), Box::new(LopdfStrategy)]
}
