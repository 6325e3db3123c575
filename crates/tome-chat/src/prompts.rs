//! Prompt templates for the three model calls the engine makes.
//!
//! A closed set of template variants, each a pure rendering struct over a
//! fixed input record. Rendering never fails.

use std::fmt::Write as _;

use tome_core::types::{Passage, Turn};

use crate::parser::{REASONING_CLOSE, REASONING_OPEN};

/// Keyword the classifier must emit when fresh retrieval is required.
pub const KEYWORD_NEEDS_RETRIEVAL: &str = "NEEDS_RETRIEVAL";
/// Keyword the classifier must emit for a follow-up question.
pub const KEYWORD_FOLLOW_UP: &str = "FOLLOW_UP";

/// Marker inserted in place of retrieved passages when the search returned
/// nothing relevant.
pub const NO_CONTEXT_MARKER: &str = "No relevant context was found in the document corpus.";

/// Template deciding whether a new question needs fresh retrieval.
#[derive(Debug, Clone, Copy)]
pub struct FollowupTemplate<'a> {
    /// The newly submitted question.
    pub question: &'a str,
    /// The most recent recorded turn.
    pub last_turn: &'a Turn,
}

impl FollowupTemplate<'_> {
    pub fn render(&self) -> String {
        format!(
            "You are deciding whether answering a new question requires retrieving fresh \
             passages from a document corpus, or whether it is a follow-up that can be \
             answered from the context already retrieved for the previous question. \
             Reply with exactly {} or {} on the first line.\n\n\
             **Previous Question:** {}\n\
             **Previous Answer:** {}\n\n\
             **New Question:** {}\n\n\
             **Decision:**",
            KEYWORD_NEEDS_RETRIEVAL,
            KEYWORD_FOLLOW_UP,
            self.last_turn.question,
            self.last_turn.answer,
            self.question,
        )
    }
}

/// Template producing the answer for one turn.
#[derive(Debug, Clone, Copy)]
pub struct AnswerTemplate<'a> {
    /// The user's question.
    pub question: &'a str,
    /// Passages currently considered relevant (may be empty).
    pub context: &'a [Passage],
    /// Condensed text of older turns, if any.
    pub summary: Option<&'a str>,
}

impl AnswerTemplate<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = write!(
            out,
            "You are an assistant answering questions based strictly on the provided context. \
             Wrap your deliberation in {} and {}, then state your final answer after the \
             closing marker. If the answer is not found in the context, say you do not know \
             based on the given information.\n\n",
            REASONING_OPEN, REASONING_CLOSE,
        );

        if let Some(summary) = self.summary {
            let _ = write!(out, "**Previous Summary:**\n{}\n\n", summary);
        }

        if self.context.is_empty() {
            let _ = write!(
                out,
                "**Context:**\n{}\nState clearly that your answer is low-confidence.\n\n",
                NO_CONTEXT_MARKER,
            );
        } else {
            out.push_str("**Context:**\n");
            for passage in self.context {
                let _ = write!(out, "[{}] {}\n\n", passage.source_id, passage.text);
            }
        }

        let _ = write!(out, "**User Question:** {}\n\n**Answer:**", self.question);
        out
    }
}

/// Template condensing older turns into a rolling summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryTemplate<'a> {
    /// The previous rolling summary, if any.
    pub prior_summary: Option<&'a str>,
    /// The turns being summarized away, oldest first.
    pub turns: &'a [Turn],
}

impl SummaryTemplate<'_> {
    pub fn render(&self) -> String {
        let mut out = String::from(
            "Summarize the following conversation history concisely, preserving facts, \
             names, and figures that later questions may refer back to.\n\n",
        );

        if let Some(prior) = self.prior_summary {
            let _ = write!(out, "Earlier summary:\n{}\n\n", prior);
        }

        for turn in self.turns {
            let _ = write!(out, "Q: {}\nA: {}\n", turn.question, turn.answer);
        }

        out.push_str("\n**Summary:**");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(question: &str, answer: &str) -> Turn {
        Turn {
            question: question.to_string(),
            reasoning: String::new(),
            answer: answer.to_string(),
            retrieval_performed: false,
            created_at: 0,
        }
    }

    fn passage(text: &str, source: &str) -> Passage {
        Passage {
            text: text.to_string(),
            source_id: source.to_string(),
            score: 0.5,
        }
    }

    #[test]
    fn test_followup_template_contains_both_keywords() {
        let last = turn("What is the refund window?", "30 days.");
        let rendered = FollowupTemplate {
            question: "And for international orders?",
            last_turn: &last,
        }
        .render();

        assert!(rendered.contains(KEYWORD_NEEDS_RETRIEVAL));
        assert!(rendered.contains(KEYWORD_FOLLOW_UP));
        assert!(rendered.contains("What is the refund window?"));
        assert!(rendered.contains("30 days."));
        assert!(rendered.contains("And for international orders?"));
    }

    #[test]
    fn test_answer_template_includes_context_and_markers() {
        let context = vec![passage("Refunds within 30 days.", "policy.md")];
        let rendered = AnswerTemplate {
            question: "What is the refund window?",
            context: &context,
            summary: None,
        }
        .render();

        assert!(rendered.contains(REASONING_OPEN));
        assert!(rendered.contains(REASONING_CLOSE));
        assert!(rendered.contains("[policy.md] Refunds within 30 days."));
        assert!(rendered.contains("What is the refund window?"));
        assert!(!rendered.contains(NO_CONTEXT_MARKER));
    }

    #[test]
    fn test_answer_template_empty_context_uses_marker() {
        let rendered = AnswerTemplate {
            question: "Anything?",
            context: &[],
            summary: None,
        }
        .render();

        assert!(rendered.contains(NO_CONTEXT_MARKER));
        assert!(rendered.contains("low-confidence"));
    }

    #[test]
    fn test_answer_template_includes_summary_when_present() {
        let rendered = AnswerTemplate {
            question: "q",
            context: &[],
            summary: Some("earlier we discussed refunds"),
        }
        .render();

        assert!(rendered.contains("earlier we discussed refunds"));
    }

    #[test]
    fn test_summary_template_lists_turns_and_prior() {
        let turns = vec![turn("q1", "a1"), turn("q2", "a2")];
        let rendered = SummaryTemplate {
            prior_summary: Some("old gist"),
            turns: &turns,
        }
        .render();

        assert!(rendered.contains("old gist"));
        assert!(rendered.contains("Q: q1"));
        assert!(rendered.contains("A: a2"));
    }

    #[test]
    fn test_summary_template_without_prior() {
        let turns = vec![turn("q1", "a1")];
        let rendered = SummaryTemplate {
            prior_summary: None,
            turns: &turns,
        }
        .render();

        assert!(!rendered.contains("Earlier summary"));
        assert!(rendered.contains("Q: q1"));
    }
}
