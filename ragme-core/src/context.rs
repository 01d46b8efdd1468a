//! Context assembly for downstream consumers.

use serde_json::Value;

use crate::document::ScoredPoint;

/// Format ranked results into a single context block.
///
/// Each result becomes `"[{rank}] (Score: {score})\n{text}"` with a 1-based
/// rank and the score rendered to three decimal places; blocks are joined by
/// a blank line. An empty result list yields an empty string.
///
/// This exact format is a compatibility contract — downstream prompt
/// builders parse it. Do not change it without versioning the API.
pub fn assemble_context(results: &[ScoredPoint]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let text = result.payload.get("text").and_then(Value::as_str).unwrap_or_default();
            format!("[{}] (Score: {:.3})\n{}", i + 1, result.score, text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
