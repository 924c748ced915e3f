#![warn(missing_docs)]
//! # shield-benchmarks
//!
//! Deterministic workloads for the normalize-then-highlight hot path.

use serde_json::{Value, json};

/// Builds `count` raw replies that rotate through the accepted key aliases.
pub fn alias_replies(count: usize) -> Vec<Value> {
    (0..count)
        .map(|index| match index % 3 {
            0 => json!({
                "toxicityScore": index % 101,
                "categories": ["harassment", "profanity"],
                "highlightedWords": ["annoying", "stupid"],
                "severity": "high",
                "explanation": "camelCase reply",
            }),
            1 => json!({
                "toxicity_score": (index % 101) as f64 + 0.4,
                "category": "spam",
                "highlighted_words": ["buy"],
                "reason": "snake_case reply",
                "model_used": "gpt",
            }),
            _ => json!({"toxicity": format!("{}", index % 101), "severity": null}),
        })
        .collect()
}

/// Builds a message of roughly `words` words with toxic words sprinkled in.
pub fn long_message(words: usize) -> String {
    const VOCAB: [&str; 6] = ["you", "are", "so", "annoying!", "please", "STUPID,"];
    (0..words)
        .map(|index| VOCAB[index % VOCAB.len()])
        .collect::<Vec<_>>()
        .join(if words % 2 == 0 { " " } else { "  " })
}
