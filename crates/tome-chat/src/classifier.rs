//! Interpretation of the retrieval-necessity classifier's reply.
//!
//! The classifier is a fallible oracle: its reply is matched strictly
//! against the two expected keywords, and anything ambiguous resolves to
//! retrieval (more context than needed, never less).

use crate::parser::split_reasoning;
use crate::prompts::{KEYWORD_FOLLOW_UP, KEYWORD_NEEDS_RETRIEVAL};

/// Outcome of the retrieval-necessity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalVerdict {
    /// Fresh document search is required.
    NeedsRetrieval,
    /// The question is answerable from the existing active context.
    FollowUp,
    /// The reply matched neither keyword (or both); treated as retrieval.
    Ambiguous,
}

impl RetrievalVerdict {
    /// Interpret a raw classifier reply.
    ///
    /// The reply is first stripped of any reasoning markers (trace models
    /// deliberate even on yes/no questions), then the first non-empty line
    /// is matched against the keywords.
    pub fn from_reply(raw: &str) -> Self {
        let parsed = split_reasoning(raw);
        let line = parsed
            .answer
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");

        let upper = line.to_uppercase();
        let needs = upper.contains(KEYWORD_NEEDS_RETRIEVAL);
        // NEEDS_RETRIEVAL contains no FOLLOW_UP substring and vice versa,
        // but a reply quoting both keywords is indecisive.
        let follow = upper.contains(KEYWORD_FOLLOW_UP);

        match (needs, follow) {
            (true, false) => RetrievalVerdict::NeedsRetrieval,
            (false, true) => RetrievalVerdict::FollowUp,
            _ => RetrievalVerdict::Ambiguous,
        }
    }

    /// Whether this verdict requires a document search.
    pub fn requires_retrieval(self) -> bool {
        !matches!(self, RetrievalVerdict::FollowUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_needs_retrieval() {
        let v = RetrievalVerdict::from_reply("NEEDS_RETRIEVAL");
        assert_eq!(v, RetrievalVerdict::NeedsRetrieval);
        assert!(v.requires_retrieval());
    }

    #[test]
    fn test_clean_follow_up() {
        let v = RetrievalVerdict::from_reply("FOLLOW_UP");
        assert_eq!(v, RetrievalVerdict::FollowUp);
        assert!(!v.requires_retrieval());
    }

    #[test]
    fn test_lowercase_is_accepted() {
        assert_eq!(
            RetrievalVerdict::from_reply("follow_up"),
            RetrievalVerdict::FollowUp
        );
    }

    #[test]
    fn test_keyword_with_trailing_prose() {
        assert_eq!(
            RetrievalVerdict::from_reply("NEEDS_RETRIEVAL because the topic changed"),
            RetrievalVerdict::NeedsRetrieval
        );
    }

    #[test]
    fn test_reasoning_block_is_stripped_first() {
        let raw = "<think>The user changed topic entirely.</think>\nNEEDS_RETRIEVAL";
        assert_eq!(
            RetrievalVerdict::from_reply(raw),
            RetrievalVerdict::NeedsRetrieval
        );
    }

    #[test]
    fn test_first_non_empty_line_wins() {
        let raw = "\n\n  FOLLOW_UP\nNEEDS_RETRIEVAL";
        assert_eq!(RetrievalVerdict::from_reply(raw), RetrievalVerdict::FollowUp);
    }

    #[test]
    fn test_unrelated_reply_is_ambiguous() {
        let v = RetrievalVerdict::from_reply("I think the answer is yes.");
        assert_eq!(v, RetrievalVerdict::Ambiguous);
        assert!(v.requires_retrieval());
    }

    #[test]
    fn test_both_keywords_is_ambiguous() {
        let v = RetrievalVerdict::from_reply("NEEDS_RETRIEVAL or FOLLOW_UP, hard to say");
        assert_eq!(v, RetrievalVerdict::Ambiguous);
        assert!(v.requires_retrieval());
    }

    #[test]
    fn test_empty_reply_is_ambiguous() {
        assert_eq!(RetrievalVerdict::from_reply(""), RetrievalVerdict::Ambiguous);
    }

    #[test]
    fn test_reply_entirely_inside_think_is_ambiguous() {
        let raw = "<think>FOLLOW_UP probably</think>";
        assert_eq!(RetrievalVerdict::from_reply(raw), RetrievalVerdict::Ambiguous);
    }
}
