//! Paragraph-boundary fragmenting of source bodies.
//!
//! Long source bodies are split into bounded fragments before selection, so
//! keyword and embedding scoring operate on pieces small enough to drop into
//! a prompt whole. Splitting happens on paragraph boundaries (`\n\n`) to keep
//! each fragment coherent; a single oversized paragraph is hard-split at a
//! space or newline near the limit.

use sha2::{Digest, Sha256};

use crate::models::ContentItem;

/// Split one source body into fragments of at most `max_chars` characters.
///
/// Fragments keep the parent source identifier, suffixed with `#<index>`
/// when the body was split into more than one piece. Empty bodies produce
/// no fragments.
pub fn fragment_body(source: &str, body: &str, max_chars: usize) -> Vec<ContentItem> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for para in body.split("\n\n") {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }

        let would_be = if current.is_empty() {
            trimmed.len()
        } else {
            current.len() + 2 + trimmed.len() // +2 for \n\n separator
        };

        if would_be > max_chars && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }

        if trimmed.len() > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let mut remaining = trimmed;
            while !remaining.is_empty() {
                let mut split_at = floor_char_boundary(remaining, remaining.len().min(max_chars));
                if split_at == 0 {
                    // Limit smaller than one character; take the character.
                    split_at = remaining
                        .chars()
                        .next()
                        .map(|c| c.len_utf8())
                        .unwrap_or(remaining.len());
                }
                let actual_split = if split_at < remaining.len() {
                    remaining[..split_at]
                        .rfind('\n')
                        .or_else(|| remaining[..split_at].rfind(' '))
                        .map(|pos| pos + 1)
                        .unwrap_or(split_at)
                } else {
                    split_at
                };
                pieces.push(remaining[..actual_split].trim().to_string());
                remaining = &remaining[actual_split..];
            }
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(trimmed);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces.retain(|p| !p.is_empty());

    let single = pieces.len() == 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let label = if single {
                source.to_string()
            } else {
                format!("{}#{}", source, i)
            };
            ContentItem::new(label, text)
        })
        .collect()
}

/// SHA-256 hex digest of a fragment's text, for duplicate detection.
pub fn fragment_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Largest index <= `at` that falls on a UTF-8 character boundary.
fn floor_char_boundary(s: &str, at: usize) -> usize {
    let mut idx = at.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_body_single_fragment() {
        let frags = fragment_body("brochure.md", "Hello, world!", 2000);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].source, "brochure.md");
        assert_eq!(frags[0].text, "Hello, world!");
    }

    #[test]
    fn empty_body_produces_nothing() {
        assert!(fragment_body("x", "", 2000).is_empty());
        assert!(fragment_body("x", "\n\n  \n\n", 2000).is_empty());
    }

    #[test]
    fn paragraphs_under_limit_stay_together() {
        let body = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let frags = fragment_body("doc", body, 2000);
        assert_eq!(frags.len(), 1);
        assert!(frags[0].text.contains("First paragraph."));
        assert!(frags[0].text.contains("Third paragraph."));
    }

    #[test]
    fn split_fragments_get_indexed_sources() {
        let body = "This is paragraph one.\n\nThis is paragraph two.\n\nThis is paragraph three.";
        let frags = fragment_body("doc", body, 20);
        assert!(frags.len() > 1);
        for (i, f) in frags.iter().enumerate() {
            assert_eq!(f.source, format!("doc#{}", i));
        }
    }

    #[test]
    fn oversized_paragraph_is_hard_split() {
        let body = "word ".repeat(100);
        let frags = fragment_body("doc", &body, 40);
        assert!(frags.len() > 1);
        for f in &frags {
            assert!(f.text.len() <= 40, "fragment too long: {}", f.text.len());
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let body = "é".repeat(50);
        let frags = fragment_body("doc", &body, 21);
        assert!(!frags.is_empty());
        let total: usize = frags.iter().map(|f| f.text.chars().count()).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn deterministic() {
        let body = "Alpha\n\nBeta\n\nGamma\n\nDelta";
        let a = fragment_body("doc", body, 10);
        let b = fragment_body("doc", body, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_distinguishes_texts() {
        assert_eq!(fragment_hash("abc"), fragment_hash("abc"));
        assert_ne!(fragment_hash("abc"), fragment_hash("abd"));
    }
}
