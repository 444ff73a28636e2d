//! Fetch-then-extract entry points.
//!
//! Local files are timed from the start of parsing; remote documents are
//! timed from the start of the download. Fetch errors become a failure
//! result and no strategy runs.

use std::time::Instant;

use tracing::warn;

use crate::fetch::{ExtractionRequest, Fetcher, RawDocument, SourceKind};
use crate::models::result::ExtractionResult;
use crate::pdf::PdfExtractor;

/// Extract bytes already in memory.
pub fn extract_from_bytes(extractor: &PdfExtractor, raw: &RawDocument) -> ExtractionResult {
    extractor.extract(raw)
}

/// Read a local PDF and extract it.
pub async fn extract_from_file(
    fetcher: &Fetcher,
    extractor: &PdfExtractor,
    request: &ExtractionRequest,
) -> ExtractionResult {
    let started = Instant::now();
    match fetcher.fetch(request).await {
        Ok(raw) => extractor.extract(&raw),
        Err(e) => {
            warn!("Failed to read {}: {}", request.source(), e);
            ExtractionResult::failure(e, started.elapsed())
        }
    }
}

/// Download a PDF and extract it, timing both.
pub async fn extract_from_url(
    fetcher: &Fetcher,
    extractor: &PdfExtractor,
    request: &ExtractionRequest,
) -> ExtractionResult {
    let started = Instant::now();
    match fetcher.fetch(request).await {
        Ok(raw) => extractor.extract_since(&raw, started),
        Err(e) => {
            warn!("Failed to download {}: {}", request.source(), e);
            ExtractionResult::failure(e, started.elapsed())
        }
    }
}

/// Dispatch on the request's source kind.
pub async fn run(
    fetcher: &Fetcher,
    extractor: &PdfExtractor,
    request: &ExtractionRequest,
) -> ExtractionResult {
    match request.kind() {
        SourceKind::Local => extract_from_file(fetcher, extractor, request).await,
        SourceKind::Remote => extract_from_url(fetcher, extractor, request).await,
    }
}
