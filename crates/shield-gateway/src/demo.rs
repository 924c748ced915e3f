//! Offline demo substitution: flag detection and canned replies.

use std::time::Duration;

use serde_json::{Value, json};
use shield_core::RemoteFunction;
use url::Url;

/// Simulated latency before a canned reply is returned.
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(600);

/// Query parameter that enables demo mode on a page URL.
pub const DEMO_QUERY_PARAM: &str = "demo";

/// Canned explanation returned for `analyze-toxicity`.
pub const DEMO_EXPLANATION: &str =
    "Contains insulting language and harassment towards the recipient.";

/// Canned rewrite returned for `generate-safer-version`.
pub const DEMO_SAFER_VERSION: &str =
    "I disagree with your post and would prefer if we kept the conversation respectful.";

/// Canned advice returned for `generate-advice`.
pub const DEMO_ADVICE: &str = "Document the message, block the sender, and avoid engaging. If threats continue, report to platform and local authorities.";

/// Whether failed calls are replaced by canned replies.
///
/// Built once and handed to the gateway at construction; the gateway never
/// consults ambient state on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoMode {
    enabled: bool,
    delay: Duration,
}

impl DemoMode {
    /// Demo substitution off; failures always propagate.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            delay: DEFAULT_DEMO_DELAY,
        }
    }

    /// Demo substitution on with the given simulated delay.
    ///
    /// A zero delay is raised to one millisecond so the substitution is
    /// always observably asynchronous.
    pub fn enabled(delay: Duration) -> Self {
        Self {
            enabled: true,
            delay: delay.max(Duration::from_millis(1)),
        }
    }

    /// Resolves the flag from a page URL and a persisted flag value.
    ///
    /// Either source being set enables demo mode.
    pub fn detect(page_url: Option<&str>, persisted_flag: Option<&str>, delay: Duration) -> Self {
        let from_url = page_url.is_some_and(demo_flag_in_url);
        let from_storage = persisted_flag.is_some_and(demo_flag_value);
        if from_url || from_storage {
            Self::enabled(delay)
        } else {
            Self::disabled()
        }
    }

    /// Returns `true` when substitution is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the simulated delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for DemoMode {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Returns `true` when `url` carries `demo=1` in its query string.
pub fn demo_flag_in_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| {
            parsed
                .query_pairs()
                .any(|(key, value)| key == DEMO_QUERY_PARAM && value == "1")
        })
        .unwrap_or(false)
}

/// Returns `true` for a persisted flag value of `1`.
pub fn demo_flag_value(raw: &str) -> bool {
    raw.trim() == "1"
}

/// Canned reply substituted for `function` in demo mode.
pub fn demo_reply(function: RemoteFunction) -> Value {
    match function {
        RemoteFunction::AnalyzeToxicity => json!({
            "toxicityScore": 72,
            "categories": ["harassment", "profanity"],
            "highlightedWords": ["annoying"],
            "severity": "high",
            "explanation": DEMO_EXPLANATION,
        }),
        RemoteFunction::GenerateSaferVersion => json!({ "saferVersion": DEMO_SAFER_VERSION }),
        RemoteFunction::GenerateAdvice => json!({ "advice": DEMO_ADVICE }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_flag_requires_exact_value() {
        assert!(demo_flag_in_url("https://shield.test/scanner?demo=1"));
        assert!(demo_flag_in_url("https://shield.test/?sample=1&demo=1"));
        assert!(!demo_flag_in_url("https://shield.test/scanner?demo=true"));
        assert!(!demo_flag_in_url("https://shield.test/scanner"));
        assert!(!demo_flag_in_url("not a url?demo=1"));
    }

    #[test]
    fn detect_prefers_any_source() {
        let delay = Duration::from_millis(5);
        assert!(DemoMode::detect(None, Some("1"), delay).is_enabled());
        assert!(DemoMode::detect(Some("https://a.test/?demo=1"), None, delay).is_enabled());
        assert!(!DemoMode::detect(Some("https://a.test/"), Some("0"), delay).is_enabled());
        assert!(!DemoMode::detect(None, None, delay).is_enabled());
    }

    #[test]
    fn zero_delay_is_raised() {
        assert!(DemoMode::enabled(Duration::ZERO).delay() > Duration::ZERO);
    }
}
