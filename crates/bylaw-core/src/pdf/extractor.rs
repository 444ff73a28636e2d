//! Extraction engine: ordered strategies, per-page isolation, first non-empty wins.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{TextStrategy, default_strategies, strategy_by_name};
use crate::error::{BylawError, ExtractionError};
use crate::fetch::RawDocument;
use crate::models::config::ExtractionConfig;
use crate::models::result::{
    AttemptOutcome, ExtractedText, ExtractionFailure, ExtractionMetadata, ExtractionResult,
    StrategyAttempt,
};
use crate::text::{TextStats, content_hash};

/// PDF text extractor with deterministic fallback.
///
/// Strategies run in a fixed order. Each one walks the document page by
/// page; a failing page is logged and skipped while the rest accumulate.
/// The first strategy whose accumulated text is non-empty after trimming
/// wins. If none does, the call fails with every strategy's reason.
pub struct PdfExtractor {
    strategies: Vec<Box<dyn TextStrategy>>,
}

/// What one strategy produced.
struct StrategyOutput {
    text: String,
    attempt: StrategyAttempt,
}

impl PdfExtractor {
    /// Create an extractor with the default strategies.
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }

    /// Create an extractor with explicit strategies, tried in the given order.
    pub fn with_strategies(strategies: Vec<Box<dyn TextStrategy>>) -> Self {
        Self { strategies }
    }

    /// Create an extractor from configured strategy names.
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        if config.strategies.is_empty() {
            return Err(BylawError::Config(
                "at least one extraction strategy is required".to_string(),
            ));
        }

        let strategies = config
            .strategies
            .iter()
            .map(|name| {
                strategy_by_name(name).ok_or_else(|| {
                    BylawError::Config(format!("unknown extraction strategy: {}", name))
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self { strategies })
    }

    /// Strategy names in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract text, timing from now.
    pub fn extract(&self, raw: &RawDocument) -> ExtractionResult {
        self.extract_since(raw, Instant::now())
    }

    /// Extract text, reporting elapsed time from `started`.
    ///
    /// Lets callers include download time in the reported duration.
    pub fn extract_since(&self, raw: &RawDocument, started: Instant) -> ExtractionResult {
        debug!(
            "Extracting {} ({} bytes) with strategies {:?}",
            raw.source(),
            raw.size(),
            self.strategy_names()
        );

        match self.run_strategies(raw.data()) {
            Ok((text, method)) => {
                let stats = TextStats::of(&text);
                let extraction_time = started.elapsed();
                info!(
                    "Extracted {} chars from {} using {} in {:.2}s",
                    stats.char_count,
                    raw.source(),
                    method,
                    extraction_time.as_secs_f64()
                );

                ExtractionResult::Success(ExtractedText {
                    content_hash: content_hash(&text),
                    metadata: ExtractionMetadata {
                        source: raw.source().to_string(),
                        file_size_bytes: raw.size(),
                        char_count: stats.char_count,
                        word_count: stats.word_count,
                        line_count: stats.line_count,
                        extraction_method: method.to_string(),
                        extraction_time,
                    },
                    text,
                })
            }
            Err(err) => {
                warn!("No text extracted from {}: {}", raw.source(), err);
                let ExtractionError::NoTextExtracted { attempts } = &err;
                ExtractionResult::Failure(ExtractionFailure {
                    error: err.to_string(),
                    attempts: attempts.clone(),
                    extraction_time: started.elapsed(),
                })
            }
        }
    }

    /// Try each strategy in order; return the first non-empty trimmed text.
    fn run_strategies(
        &self,
        data: &[u8],
    ) -> std::result::Result<(String, &'static str), ExtractionError> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let output = run_strategy(strategy.as_ref(), data);
            let trimmed = output.text.trim();

            if !trimmed.is_empty() {
                debug!(
                    "Strategy {} produced {} chars ({} pages failed)",
                    strategy.name(),
                    trimmed.len(),
                    output.attempt.pages_failed
                );
                return Ok((trimmed.to_string(), strategy.name()));
            }

            debug!(
                "Strategy {} produced no text: {}",
                strategy.name(),
                output.attempt.error.as_deref().unwrap_or("empty")
            );
            attempts.push(output.attempt);
        }

        Err(ExtractionError::NoTextExtracted { attempts })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one strategy over every page, skipping pages that fail.
fn run_strategy(strategy: &dyn TextStrategy, data: &[u8]) -> StrategyOutput {
    let started = Instant::now();
    let name = strategy.name();

    let mut source = match guarded(|| strategy.open(data)) {
        Ok(source) => source,
        Err(reason) => {
            return StrategyOutput {
                text: String::new(),
                attempt: StrategyAttempt {
                    strategy: name.to_string(),
                    outcome: AttemptOutcome::Failed,
                    error: Some(reason),
                    elapsed: started.elapsed(),
                    pages_failed: 0,
                },
            };
        }
    };

    let page_count = source.page_count();
    let mut text = String::new();
    let mut pages_failed = 0;
    let mut last_error = None;

    for page in 1..=page_count {
        match guarded(|| source.page_text(page)) {
            Ok(page_text) => {
                if !page_text.trim().is_empty() {
                    text.push_str(&page_text);
                    text.push('\n');
                }
            }
            Err(reason) => {
                warn!("{}: failed to extract page {}: {}", name, page, reason);
                pages_failed += 1;
                last_error = Some(reason);
            }
        }
    }

    let (outcome, error) = if !text.trim().is_empty() {
        (AttemptOutcome::Text, None)
    } else if page_count > 0 && pages_failed == page_count {
        let reason = last_error.unwrap_or_default();
        (
            AttemptOutcome::Failed,
            Some(format!("all {} pages failed, last error: {}", page_count, reason)),
        )
    } else {
        (AttemptOutcome::Empty, Some("no text extracted".to_string()))
    };

    StrategyOutput {
        text,
        attempt: StrategyAttempt {
            strategy: name.to_string(),
            outcome,
            error,
            elapsed: started.elapsed(),
            pages_failed,
        },
    }
}

thread_local! {
    static IN_GUARD: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Chain a panic hook that stays silent while this thread is inside
/// [`guarded`]; every other panic reaches the previous hook unchanged.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_GUARD.with(Cell::get) {
                debug!("Recovered parser panic: {}", info);
            } else {
                previous(info);
            }
        }));
    });
}

/// Run a parser step, turning a panic into an error.
fn guarded<T>(f: impl FnOnce() -> super::Result<T>) -> super::Result<T> {
    install_quiet_hook();

    let outer = IN_GUARD.with(|g| g.replace(true));
    let caught = panic::catch_unwind(AssertUnwindSafe(f));
    IN_GUARD.with(|g| g.set(outer));

    match caught {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("parser panicked: {}", message))
        }
    }
}
