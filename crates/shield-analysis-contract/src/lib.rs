#![warn(missing_docs)]
//! # shield-analysis-contract
//!
//! ## Purpose
//! Defines the canonical analysis result and normalizes remote classifier
//! replies into it.
//!
//! ## Responsibilities
//! - Absorb camelCase, snake_case and legacy singular field names.
//! - Coerce loosely typed values (numeric strings, floats, single strings).
//! - Default every missing field so presentation never sees a hole.
//! - Map toxicity scores to coarse severity buckets for stored records.
//!
//! ## Data flow
//! Raw gateway reply -> [`normalize_analysis`] -> [`AnalysisResult`] ->
//! scanner view state and history records.
//!
//! ## Ownership and lifetimes
//! Normalization borrows the raw reply and returns owned values, so the reply
//! buffer can be dropped as soon as normalization returns.
//!
//! ## Error model
//! Normalization never fails. Missing or malformed fields fall back to the
//! documented defaults; only the gateway produces errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Accepted keys for the toxicity score, in priority order.
pub const SCORE_KEYS: &[&str] = &["toxicityScore", "toxicity_score", "toxicity"];
/// Accepted keys for the category list.
pub const CATEGORY_KEYS: &[&str] = &["categories", "category"];
/// Accepted keys for the flagged word list.
pub const HIGHLIGHT_KEYS: &[&str] = &["highlightedWords", "highlighted_words"];
/// Accepted keys for the severity label.
pub const SEVERITY_KEYS: &[&str] = &["severity"];
/// Accepted keys for the explanation text.
pub const EXPLANATION_KEYS: &[&str] = &["explanation", "reason"];
/// Accepted keys for the echoed model id.
pub const MODEL_KEYS: &[&str] = &["modelUsed", "model_used"];
/// Accepted keys for the safer rewrite.
pub const SAFER_VERSION_KEYS: &[&str] = &["saferVersion", "safer_version", "safer"];
/// Accepted keys for the safety advice.
pub const ADVICE_KEYS: &[&str] = &["advice", "result"];

/// Upper bound of the toxicity score range.
pub const MAX_TOXICITY_SCORE: u8 = 100;

/// Coarse severity bucket reported by the classifier.
///
/// The set is open: labels outside the four known buckets are preserved in
/// [`Severity::Other`] so newly introduced server labels never break clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Low severity.
    #[default]
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
    /// Unrecognized label, kept verbatim.
    Other(String),
}

impl Severity {
    /// Parses a label; matching is case-insensitive and trims whitespace.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Other(label.to_string()),
        }
    }

    /// Derives a bucket from a toxicity score.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Severity::Low,
            25..=49 => Severity::Medium,
            50..=79 => Severity::High,
            _ => Severity::Critical,
        }
    }

    /// Returns the wire label.
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Other(label) => label,
        }
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        Severity::from_label(&label)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical toxicity analysis consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Toxicity score in [0, 100].
    pub toxicity_score: u8,
    /// Category labels in classifier order; duplicates preserved.
    pub categories: Vec<String>,
    /// Surface-form tokens flagged by the classifier.
    pub highlighted_words: Vec<String>,
    /// Severity bucket.
    pub severity: Severity,
    /// Free-text explanation, possibly empty.
    pub explanation: String,
    /// Model that produced the result.
    pub model_used: String,
}

/// Normalizes an `analyze-toxicity` reply.
///
/// Each field takes the first candidate key holding a well-typed value; JSON
/// `null` counts as absent. `requested_model` fills `model_used` when the
/// reply does not echo one.
pub fn normalize_analysis(raw: &Value, requested_model: &str) -> AnalysisResult {
    AnalysisResult {
        toxicity_score: first_candidate(raw, SCORE_KEYS, as_score).unwrap_or(0),
        categories: first_candidate(raw, CATEGORY_KEYS, as_string_list).unwrap_or_default(),
        highlighted_words: first_candidate(raw, HIGHLIGHT_KEYS, as_string_list)
            .unwrap_or_default(),
        severity: first_candidate(raw, SEVERITY_KEYS, as_text)
            .map(|label| Severity::from_label(&label))
            .unwrap_or_default(),
        explanation: first_candidate(raw, EXPLANATION_KEYS, as_text).unwrap_or_default(),
        model_used: first_candidate(raw, MODEL_KEYS, as_non_blank_text)
            .unwrap_or_else(|| requested_model.to_string()),
    }
}

/// Extracts the rewrite from a `generate-safer-version` reply.
///
/// Returns an empty string when the reply carries none.
pub fn normalize_safer_version(raw: &Value) -> String {
    first_candidate(raw, SAFER_VERSION_KEYS, as_text).unwrap_or_default()
}

/// Extracts the advice from a `generate-advice` reply.
///
/// Returns an empty string when the reply carries none.
pub fn normalize_advice(raw: &Value) -> String {
    first_candidate(raw, ADVICE_KEYS, as_text).unwrap_or_default()
}

fn first_candidate<T>(raw: &Value, keys: &[&str], accept: fn(&Value) -> Option<T>) -> Option<T> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| !value.is_null())
        .find_map(accept)
}

fn as_score(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }

    Some(number.round().clamp(0.0, f64::from(MAX_TOXICITY_SCORE)) as u8)
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        Value::String(single) if single.trim().is_empty() => Some(Vec::new()),
        Value::String(single) => Some(vec![single.clone()]),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_non_blank_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
