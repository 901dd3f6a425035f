//! Sliding-window history compression.
//!
//! Keeps conversation history bounded as sessions grow: once the estimated
//! size crosses the threshold, everything older than the last few raw
//! messages collapses into a single synthetic summary message. The persona
//! (first system message) is folded into the summary first so interviewer
//! identity survives compression. Purely local and deterministic — the
//! compressor never calls the model.
//!
//! Invariants:
//! - below the threshold, `compress` is the identity (hence idempotent)
//! - at or above the threshold, the result estimates below the threshold
//!   (the kept tail shrinks further if the summary alone is not enough)

use super::models::{Message, Role};

/// Size threshold in token-equivalents above which history is compressed.
pub const COMPRESSION_THRESHOLD_TOKENS: usize = 2000;
/// Raw messages preserved verbatim at the end of a compressed history.
pub const KEEP_LAST_N: usize = 5;
/// Upper bound on the synthetic summary, in token-equivalents.
pub const SUMMARY_BUDGET_TOKENS: usize = 500;

// Rough token estimate: ~4 chars per token plus per-message framing.
const CHARS_PER_TOKEN: usize = 4;
const MESSAGE_OVERHEAD_TOKENS: usize = 4;
const SNIPPET_CHARS: usize = 120;

/// Estimated size of a history in token-equivalents.
pub fn estimated_tokens(history: &[Message]) -> usize {
    history
        .iter()
        .map(|m| m.content.chars().count().div_ceil(CHARS_PER_TOKEN) + MESSAGE_OVERHEAD_TOKENS)
        .sum()
}

pub fn should_compress(history: &[Message]) -> bool {
    estimated_tokens(history) >= COMPRESSION_THRESHOLD_TOKENS
}

/// Compresses a history if it has outgrown the threshold; otherwise returns
/// it unchanged.
pub fn compress(history: Vec<Message>) -> Vec<Message> {
    if !should_compress(&history) {
        return history;
    }

    let mut keep = KEEP_LAST_N.min(history.len());
    loop {
        let compressed = compress_keeping(&history, keep);
        // keep == 0 collapses everything into the summary, which is bounded
        // by the budget and therefore always lands below the threshold
        if !should_compress(&compressed) || keep == 0 {
            return compressed;
        }
        keep -= 1;
    }
}

/// Summary message followed by the last `keep` raw messages.
fn compress_keeping(history: &[Message], keep: usize) -> Vec<Message> {
    let split = history.len().saturating_sub(keep);
    let (older, tail) = history.split_at(split);

    let mut compressed = Vec::with_capacity(tail.len() + 1);
    compressed.push(Message::new(Role::System, summarize(older)));
    compressed.extend(tail.iter().cloned());
    compressed
}

/// Deterministic digest of the collapsed prefix, truncated to the summary
/// budget. Persona first, then one snippet line per exchange message.
fn summarize(older: &[Message]) -> String {
    let mut summary = String::new();

    if let Some(persona) = older.iter().find(|m| m.role == Role::System) {
        summary.push_str("Interviewer persona: ");
        summary.push_str(persona.content.trim());
        summary.push('\n');
    }

    summary.push_str("Earlier exchange, condensed:\n");
    for message in older.iter().filter(|m| m.role != Role::System) {
        let snippet: String = message.content.chars().take(SNIPPET_CHARS).collect();
        let line = match message.role {
            Role::Assistant => format!("Q: {snippet}\n"),
            Role::User => format!("A: {snippet}\n"),
            Role::System => continue,
        };
        summary.push_str(&line);
    }

    let budget_chars = SUMMARY_BUDGET_TOKENS * CHARS_PER_TOKEN;
    if summary.chars().count() > budget_chars {
        summary = summary.chars().take(budget_chars).collect();
    }
    summary
}
