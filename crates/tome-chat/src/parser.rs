//! Best-effort splitting of raw model output into reasoning and answer.
//!
//! Reasoning-trace models are instructed to wrap their deliberation in
//! `<think>...</think>`. The split is total: if the model did not honor the
//! convention, the reasoning is empty and the whole output becomes the
//! answer. A turn is never failed over missing markers.

/// Marker opening the reasoning segment.
pub const REASONING_OPEN: &str = "<think>";
/// Marker closing the reasoning segment.
pub const REASONING_CLOSE: &str = "</think>";

/// A raw model reply split into its reasoning trace and final answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Text between the reasoning markers (empty if absent).
    pub reasoning: String,
    /// Everything outside the markers, trimmed.
    pub answer: String,
}

/// Split raw model output into reasoning and answer segments.
///
/// Reasoning requires both markers in order; anything else leaves the
/// reasoning empty and returns the whole trimmed output as the answer.
pub fn split_reasoning(raw: &str) -> ParsedReply {
    let open = raw.find(REASONING_OPEN);
    let close = open.and_then(|start| {
        raw[start + REASONING_OPEN.len()..]
            .find(REASONING_CLOSE)
            .map(|offset| start + REASONING_OPEN.len() + offset)
    });

    match (open, close) {
        (Some(start), Some(end)) => {
            let reasoning = raw[start + REASONING_OPEN.len()..end].trim().to_string();
            let before = &raw[..start];
            let after = &raw[end + REASONING_CLOSE.len()..];
            let answer = format!("{} {}", before.trim(), after.trim())
                .trim()
                .to_string();
            ParsedReply { reasoning, answer }
        }
        _ => ParsedReply {
            reasoning: String::new(),
            answer: raw.trim().to_string(),
        },
    }
}
