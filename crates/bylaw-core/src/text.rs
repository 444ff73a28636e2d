//! Content fingerprinting and text statistics.

use sha2::{Digest, Sha256};

/// SHA-256 of the exact text, as 64 lowercase hex characters.
///
/// No normalization is applied: any change to the text, whitespace
/// included, changes the hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Counts reported alongside extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            line_count: text.split('\n').count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_text_same_hash() {
        let text = "By-law No. 2023-45 respecting parking";
        assert_eq!(content_hash(text), content_hash(text));
    }

    #[test]
    fn test_whitespace_changes_hash() {
        assert_ne!(
            content_hash("Section 1 text"),
            content_hash("Section  1 text")
        );
        assert_ne!(content_hash("Section 1 text"), content_hash("Section 1 text\n"));
    }

    #[test]
    fn test_hash_format() {
        let hash = content_hash("Test content");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_stats() {
        let stats = TextStats::of("Section 1\nParking   is\tprohibited\n\nSchedule A");
        assert_eq!(
            stats,
            TextStats {
                char_count: 45,
                word_count: 7,
                line_count: 4,
            }
        );
    }

    #[test]
    fn test_stats_counts_chars_not_bytes() {
        let stats = TextStats::of("règlement municipal");
        assert_eq!(stats.char_count, 19);
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.line_count, 1);
    }
}
