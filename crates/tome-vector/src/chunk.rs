//! Character-window text chunking for document ingestion.
//!
//! Splits extracted document text into overlapping chunks sized for the
//! embedding model. Boundaries prefer whitespace near the window edge so
//! words are not cut mid-token.

use tome_core::types::DocumentChunk;

/// Split `text` into chunks of at most `max_chars` characters with
/// `overlap_chars` of trailing context carried into the next chunk.
///
/// Whitespace-only chunks are dropped. `overlap_chars` must be smaller than
/// `max_chars` (validated at config load).
pub fn split_text(text: &str, source_id: &str, max_chars: usize, overlap_chars: usize) -> Vec<DocumentChunk> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + max_chars).min(chars.len());

        // Back off to the nearest whitespace so we do not split words,
        // unless that would empty the chunk.
        let mut end = hard_end;
        if end < chars.len() {
            while end > start + 1 && !chars[end - 1].is_whitespace() {
                end -= 1;
            }
            if end == start + 1 {
                end = hard_end;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(DocumentChunk {
                text: piece.trim().to_string(),
                source_id: source_id.to_string(),
            });
        }

        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap_chars).max(start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("a short document", "doc", 2000, 400);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].source_id, "doc");
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_text("", "doc", 2000, 400).is_empty());
        assert!(split_text("   \n\t ", "doc", 2000, 400).is_empty());
    }

    #[test]
    fn test_long_text_respects_max_chars() {
        let word = "lorem ";
        let text = word.repeat(100); // 600 chars
        let chunks = split_text(&text, "doc", 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 100);
        }
    }

    #[test]
    fn test_chunks_overlap() {
        let text = "one two three four five six seven eight nine ten ".repeat(10);
        let chunks = split_text(&text, "doc", 100, 30);
        assert!(chunks.len() >= 2);

        // The tail of one chunk should reappear at the head of the next.
        let first_tail: String = chunks[0].text.chars().rev().take(10).collect();
        let reversed_tail: String = first_tail.chars().rev().collect();
        assert!(
            chunks[1].text.contains(reversed_tail.trim()),
            "Expected overlap between consecutive chunks"
        );
    }

    #[test]
    fn test_no_mid_word_split_when_possible() {
        let text = "alpha beta gamma delta epsilon zeta ".repeat(20);
        let chunks = split_text(&text, "doc", 50, 10);
        for chunk in &chunks[..chunks.len() - 1] {
            let last_word = chunk.text.split_whitespace().last().unwrap();
            assert!(
                ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"].contains(&last_word),
                "Chunk ends mid-word: {:?}",
                last_word
            );
        }
    }

    #[test]
    fn test_unbroken_text_still_progresses() {
        let text = "x".repeat(500);
        let chunks = split_text(&text, "doc", 100, 20);
        assert!(chunks.len() >= 5);
        let total: usize = chunks.iter().map(|c| c.text.len()).sum();
        assert!(total >= 500);
    }
}
