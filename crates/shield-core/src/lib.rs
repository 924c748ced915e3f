#![warn(missing_docs)]
//! # shield-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `digital-shield` workspace.
//!
//! ## Responsibilities
//! - Name the three remote functions and build their request bodies.
//! - Carry the default model selector and the known model catalogue.
//! - Represent persisted scan history records.
//! - Provide the fixed sample texts used by demo scenarios.
//!
//! ## Data flow
//! The scanner view builds a [`FunctionRequest`] from user input, the gateway
//! serializes it with [`FunctionRequest::to_body`], and saved results travel
//! as [`NewScanRecord`] into the history store which returns [`ScanRecord`].
//!
//! ## Ownership and lifetimes
//! Requests and records own their strings so they can cross async task
//! boundaries without borrowing view state.
//!
//! ## Error model
//! Blank input, unknown names and JSON codec failures return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use shield_core::{DEFAULT_MODEL, FunctionRequest, RemoteFunction};
//!
//! let request = FunctionRequest::analyze("hello there", None).unwrap();
//! assert_eq!(request.function(), RemoteFunction::AnalyzeToxicity);
//! assert_eq!(request.model(), DEFAULT_MODEL);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

/// Model selector used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini";

/// Models offered by the scanner, as `(id, label)` pairs.
pub const KNOWN_MODELS: [(&str, &str); 2] = [
    ("gemini", "Google Gemini (Recommended)"),
    ("gpt", "OpenAI GPT-5"),
];

/// Example message loaded by the scanner's "Load example" action.
pub const EXAMPLE_MESSAGE: &str =
    "Hey, I saw your profile and you're so annoying - stop posting like that!";

/// Named remote function exposed by the managed backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteFunction {
    /// Classifies text toxicity.
    AnalyzeToxicity,
    /// Rewrites text in a safer tone.
    GenerateSaferVersion,
    /// Produces free-text safety advice.
    GenerateAdvice,
}

impl RemoteFunction {
    /// All remote functions in display order.
    pub const ALL: [RemoteFunction; 3] = [
        RemoteFunction::AnalyzeToxicity,
        RemoteFunction::GenerateSaferVersion,
        RemoteFunction::GenerateAdvice,
    ];

    /// Returns the wire name used in the invocation path.
    pub fn name(self) -> &'static str {
        match self {
            RemoteFunction::AnalyzeToxicity => "analyze-toxicity",
            RemoteFunction::GenerateSaferVersion => "generate-safer-version",
            RemoteFunction::GenerateAdvice => "generate-advice",
        }
    }
}

impl fmt::Display for RemoteFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemoteFunction {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        RemoteFunction::ALL
            .into_iter()
            .find(|function| function.name() == raw)
            .ok_or_else(|| CoreError::UnknownFunction(raw.to_string()))
    }
}

/// Body of `analyze-toxicity` and `generate-safer-version` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    /// Message under analysis.
    pub text: String,
    /// Backend model selector.
    pub model: String,
}

/// Body of `generate-advice` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceRequest {
    /// Message under analysis.
    pub text: String,
    /// Categories detected by a previous analysis.
    pub categories: Vec<String>,
    /// Severity reported by a previous analysis.
    pub severity: String,
    /// Backend model selector.
    pub model: String,
}

/// One invocation of a remote function with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRequest {
    /// `analyze-toxicity` call.
    Analyze(TextRequest),
    /// `generate-safer-version` call.
    SaferVersion(TextRequest),
    /// `generate-advice` call.
    Advice(AdviceRequest),
}

impl FunctionRequest {
    /// Builds an `analyze-toxicity` request.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyText`] when `text` is blank.
    pub fn analyze(text: impl Into<String>, model: Option<&str>) -> Result<Self, CoreError> {
        Ok(FunctionRequest::Analyze(text_request(text, model)?))
    }

    /// Builds a `generate-safer-version` request.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyText`] when `text` is blank.
    pub fn safer_version(text: impl Into<String>, model: Option<&str>) -> Result<Self, CoreError> {
        Ok(FunctionRequest::SaferVersion(text_request(text, model)?))
    }

    /// Builds a `generate-advice` request.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyText`] when `text` is blank.
    pub fn advice(
        text: impl Into<String>,
        categories: Vec<String>,
        severity: impl Into<String>,
        model: Option<&str>,
    ) -> Result<Self, CoreError> {
        let TextRequest { text, model } = text_request(text, model)?;
        Ok(FunctionRequest::Advice(AdviceRequest {
            text,
            categories,
            severity: severity.into(),
            model,
        }))
    }

    /// Returns the remote function this request targets.
    pub fn function(&self) -> RemoteFunction {
        match self {
            FunctionRequest::Analyze(_) => RemoteFunction::AnalyzeToxicity,
            FunctionRequest::SaferVersion(_) => RemoteFunction::GenerateSaferVersion,
            FunctionRequest::Advice(_) => RemoteFunction::GenerateAdvice,
        }
    }

    /// Returns the model selector carried by the request.
    pub fn model(&self) -> &str {
        match self {
            FunctionRequest::Analyze(request) | FunctionRequest::SaferVersion(request) => {
                &request.model
            }
            FunctionRequest::Advice(request) => &request.model,
        }
    }

    /// Returns the message text carried by the request.
    pub fn text(&self) -> &str {
        match self {
            FunctionRequest::Analyze(request) | FunctionRequest::SaferVersion(request) => {
                &request.text
            }
            FunctionRequest::Advice(request) => &request.text,
        }
    }

    /// Serializes the payload into the JSON body sent to the backend.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_body(&self) -> Result<Value, CoreError> {
        let body = match self {
            FunctionRequest::Analyze(request) | FunctionRequest::SaferVersion(request) => {
                serde_json::to_value(request)
            }
            FunctionRequest::Advice(request) => serde_json::to_value(request),
        };
        body.map_err(CoreError::Codec)
    }
}

fn text_request(text: impl Into<String>, model: Option<&str>) -> Result<TextRequest, CoreError> {
    let text = text.into();
    if text.trim().is_empty() {
        return Err(CoreError::EmptyText);
    }

    Ok(TextRequest {
        text,
        model: model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string(),
    })
}

/// Scan result as persisted in the per-user history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Store-assigned record identifier.
    pub id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Message that was analyzed.
    pub original_text: String,
    /// Toxicity score in [0, 100].
    pub toxicity_score: u8,
    /// Detected categories, in classifier order.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Flagged surface-form tokens.
    #[serde(default)]
    pub highlighted_words: Vec<String>,
    /// Optional safer rewrite produced after analysis.
    pub safer_version: Option<String>,
    /// Optional safety advice produced after analysis.
    pub advice: Option<String>,
    /// Model selector used for the scan.
    pub model_used: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Scan result before the store assigns identity and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScanRecord {
    /// Owning user identifier.
    pub user_id: String,
    /// Message that was analyzed.
    pub original_text: String,
    /// Toxicity score in [0, 100].
    pub toxicity_score: u8,
    /// Detected categories.
    pub categories: Vec<String>,
    /// Flagged surface-form tokens.
    pub highlighted_words: Vec<String>,
    /// Optional safer rewrite.
    pub safer_version: Option<String>,
    /// Optional safety advice.
    pub advice: Option<String>,
    /// Model selector used for the scan.
    pub model_used: String,
}

impl NewScanRecord {
    /// Attaches identity and creation time, producing a stored record.
    pub fn into_record(self, id: impl Into<String>, created_at: OffsetDateTime) -> ScanRecord {
        ScanRecord {
            id: id.into(),
            user_id: self.user_id,
            original_text: self.original_text,
            toxicity_score: self.toxicity_score,
            categories: self.categories,
            highlighted_words: self.highlighted_words,
            safer_version: self.safer_version,
            advice: self.advice,
            model_used: self.model_used,
            created_at,
        }
    }
}

/// Canned demo scenario levels offered by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoScenario {
    /// Friendly message.
    Low,
    /// Uncomfortable but not abusive message.
    Medium,
    /// Abusive message.
    High,
}

impl DemoScenario {
    /// Returns the fixed sample text for this scenario.
    pub fn sample_text(self) -> &'static str {
        match self {
            DemoScenario::Low => "Thanks for your comment! I appreciate your perspective.",
            DemoScenario::Medium => {
                "Your post is frustrating and makes me uncomfortable. Please stop."
            }
            DemoScenario::High => "You are so stupid and should disappear. Nobody wants you here.",
        }
    }
}

impl FromStr for DemoScenario {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(DemoScenario::Low),
            "medium" => Ok(DemoScenario::Medium),
            "high" => Ok(DemoScenario::High),
            other => Err(CoreError::UnknownScenario(other.to_string())),
        }
    }
}

/// Error type for core model validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Message text is blank.
    #[error("Please enter some text to analyze")]
    EmptyText,
    /// Function name is not one of the known remote functions.
    #[error("unknown remote function: {0}")]
    UnknownFunction(String),
    /// Demo scenario name is not recognized.
    #[error("unknown demo scenario: {0}")]
    UnknownScenario(String),
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
