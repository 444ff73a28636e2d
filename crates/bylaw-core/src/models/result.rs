//! Extraction outcomes and the flat record handed to callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a single strategy attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Produced non-empty text.
    Text,
    /// Ran to completion but produced only whitespace.
    Empty,
    /// Could not open or parse the document.
    Failed,
}

/// One strategy tried during an extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    /// Strategy name.
    pub strategy: String,
    /// Outcome of the attempt.
    pub outcome: AttemptOutcome,
    /// Reason the attempt produced no usable text.
    pub error: Option<String>,
    /// Wall-clock time spent in this strategy.
    pub elapsed: Duration,
    /// Pages skipped because they failed to extract.
    pub pages_failed: u32,
}

/// Metadata describing successfully extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMetadata {
    /// URL or path the document came from.
    pub source: String,
    /// Size of the raw document.
    pub file_size_bytes: usize,
    /// Unicode scalar values in the text.
    pub char_count: usize,
    /// Whitespace-delimited tokens in the text.
    pub word_count: usize,
    /// Newline-delimited segments in the text.
    pub line_count: usize,
    /// Name of the strategy that produced the text.
    pub extraction_method: String,
    /// Time since the start of the call.
    pub extraction_time: Duration,
}

/// Text produced by the first strategy that yielded any.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    /// Trimmed, non-empty text.
    pub text: String,
    /// Hex SHA-256 of `text`.
    pub content_hash: String,
    pub metadata: ExtractionMetadata,
}

/// Why an extraction call produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionFailure {
    /// Human-readable summary.
    pub error: String,
    /// Strategies tried, in order. Empty when the fetch stage failed.
    pub attempts: Vec<StrategyAttempt>,
    /// Time since the start of the call.
    pub extraction_time: Duration,
}

/// Outcome of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Success(ExtractedText),
    Failure(ExtractionFailure),
}

impl ExtractionResult {
    /// Build a failure outcome from any error.
    pub fn failure(error: impl std::fmt::Display, extraction_time: Duration) -> Self {
        ExtractionResult::Failure(ExtractionFailure {
            error: error.to_string(),
            attempts: Vec::new(),
            extraction_time,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success(_))
    }

    pub fn extraction_time(&self) -> Duration {
        match self {
            ExtractionResult::Success(s) => s.metadata.extraction_time,
            ExtractionResult::Failure(f) => f.extraction_time,
        }
    }

    /// Text of a successful extraction.
    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success(s) => Some(&s.text),
            ExtractionResult::Failure(_) => None,
        }
    }

    /// Name of the strategy that produced the text.
    pub fn method(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success(s) => Some(&s.metadata.extraction_method),
            ExtractionResult::Failure(_) => None,
        }
    }

    pub fn content_hash(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success(s) => Some(&s.content_hash),
            ExtractionResult::Failure(_) => None,
        }
    }

    /// Error message of a failed extraction.
    pub fn error(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success(_) => None,
            ExtractionResult::Failure(f) => Some(&f.error),
        }
    }
}

/// Metadata block of a successful [`ExtractionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub source: String,
    pub file_size_bytes: usize,
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
    pub extraction_method: String,
    pub extraction_time_seconds: f64,
}

/// Flat, serializable form of an [`ExtractionResult`].
///
/// Success:
/// `{"success": true, "content_text": ..., "content_hash": ..., "metadata": {...}}`
///
/// Failure:
/// `{"success": false, "error": ..., "extraction_time_seconds": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_time_seconds: Option<f64>,
}

impl ExtractionRecord {
    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<&ExtractionResult> for ExtractionRecord {
    fn from(result: &ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success(s) => ExtractionRecord {
                success: true,
                content_text: Some(s.text.clone()),
                content_hash: Some(s.content_hash.clone()),
                metadata: Some(RecordMetadata {
                    source: s.metadata.source.clone(),
                    file_size_bytes: s.metadata.file_size_bytes,
                    char_count: s.metadata.char_count,
                    word_count: s.metadata.word_count,
                    line_count: s.metadata.line_count,
                    extraction_method: s.metadata.extraction_method.clone(),
                    extraction_time_seconds: round_seconds(s.metadata.extraction_time),
                }),
                error: None,
                extraction_time_seconds: None,
            },
            ExtractionResult::Failure(f) => ExtractionRecord {
                success: false,
                content_text: None,
                content_hash: None,
                metadata: None,
                error: Some(f.error.clone()),
                extraction_time_seconds: Some(round_seconds(f.extraction_time)),
            },
        }
    }
}

impl From<ExtractionResult> for ExtractionRecord {
    fn from(result: ExtractionResult) -> Self {
        ExtractionRecord::from(&result)
    }
}

/// Seconds rounded to two decimal places.
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn success() -> ExtractionResult {
        ExtractionResult::Success(ExtractedText {
            text: "Section 1 text".to_string(),
            content_hash: "abc123".to_string(),
            metadata: ExtractionMetadata {
                source: "bylaw.pdf".to_string(),
                file_size_bytes: 1024,
                char_count: 14,
                word_count: 3,
                line_count: 1,
                extraction_method: "pdf_extract".to_string(),
                extraction_time: Duration::from_millis(1234),
            },
        })
    }

    #[test]
    fn test_success_record_shape() {
        let json = serde_json::to_value(ExtractionRecord::from(success())).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["content_text"], "Section 1 text");
        assert_eq!(json["content_hash"], "abc123");
        assert_eq!(json["metadata"]["extraction_method"], "pdf_extract");
        assert_eq!(json["metadata"]["file_size_bytes"], 1024);
        assert_eq!(json["metadata"]["extraction_time_seconds"], 1.23);
        assert!(json.get("error").is_none());
        assert!(json.get("extraction_time_seconds").is_none());
    }

    #[test]
    fn test_failure_record_shape() {
        let result = ExtractionResult::failure("file not found: x.pdf", Duration::from_millis(7));
        let json = serde_json::to_value(ExtractionRecord::from(&result)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "file not found: x.pdf");
        assert_eq!(json["extraction_time_seconds"], 0.01);
        assert!(json.get("content_text").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_round_seconds() {
        assert_eq!(round_seconds(Duration::from_millis(1006)), 1.01);
        assert_eq!(round_seconds(Duration::from_millis(1004)), 1.0);
        assert_eq!(round_seconds(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_accessors() {
        let ok = success();
        assert!(ok.is_success());
        assert_eq!(ok.method(), Some("pdf_extract"));
        assert_eq!(ok.error(), None);

        let failed = ExtractionResult::failure("boom", Duration::ZERO);
        assert!(!failed.is_success());
        assert_eq!(failed.text(), None);
        assert_eq!(failed.error(), Some("boom"));
    }
}
