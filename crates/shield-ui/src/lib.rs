#![warn(missing_docs)]
//! # shield-ui
//!
//! ## Purpose
//! Defines the scanner view state model for digital-shield.
//!
//! ## Responsibilities
//! - Hold the message, model choice, results and in-flight flags of a scan.
//! - Resolve overlapping requests by cancel-and-replace tickets.
//! - Produce the notifications shown after each action.
//! - Project severity and categories into display styles and labels.
//! - Split the message into highlighted tokens.
//! - Resolve interface labels in the user's language.
//!
//! ## Data flow
//! Controller actions call `begin_*` for a [`RequestTicket`], await the
//! gateway, then hand the outcome back through `complete_*` or
//! [`ScannerState::fail`]. Stale tickets are dropped without touching state.
//!
//! ## Ownership and lifetimes
//! `ScannerState` owns every string and result so reducers never borrow from
//! in-flight requests.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Rejected actions
//! surface as error [`Notification`]s.
//!
//! ## Security and privacy notes
//! View state excludes credentials and tokens.

use shield_analysis_contract::{AnalysisResult, Severity};
use shield_core::{DEFAULT_MODEL, DemoScenario, EXAMPLE_MESSAGE};
use shield_settings::UserSettings;
use tracing::debug;
use url::Url;

mod highlight;

pub use highlight::{HighlightToken, highlight_tokens};

/// Query parameter that pre-fills the example message when set to `1`.
pub const SAMPLE_QUERY_PARAM: &str = "sample";

/// Scores above this value are reported as toxic.
pub const TOXIC_SCORE_THRESHOLD: u8 = 30;

/// Message shown when analysis is requested for blank text.
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to analyze";

/// UI-auth state projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAuthState {
    /// User is not authenticated.
    Unauthenticated,
    /// Valid authenticated session.
    Authenticated,
    /// Session expired and requires reauth.
    ReauthRequired,
}

/// Visual treatment of a severity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityStyle {
    /// Critical severity.
    Destructive,
    /// High severity.
    Orange,
    /// Medium severity.
    Yellow,
    /// Low severity.
    Green,
    /// Any unrecognized label.
    Muted,
}

impl SeverityStyle {
    /// Maps a severity to its badge style.
    pub fn for_severity(severity: &Severity) -> Self {
        match severity {
            Severity::Critical => SeverityStyle::Destructive,
            Severity::High => SeverityStyle::Orange,
            Severity::Medium => SeverityStyle::Yellow,
            Severity::Low => SeverityStyle::Green,
            Severity::Other(_) => SeverityStyle::Muted,
        }
    }
}

/// Display label for a category: its first `_` becomes a space.
pub fn display_category(category: &str) -> String {
    category.replacen('_', " ", 1)
}

/// Notification variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Completed action.
    Success,
    /// Rejected or failed action.
    Error,
}

/// Dismissable message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Variant.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Detail text.
    pub description: String,
}

impl Notification {
    /// Builds a success notification.
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Builds an error notification.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Kind of remote request issued from the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Toxicity analysis.
    Analyze,
    /// Safer rewrite.
    SaferVersion,
    /// Safety advice.
    Advice,
}

impl RequestKind {
    fn failure_title(self) -> &'static str {
        match self {
            RequestKind::Analyze => "Analysis Failed",
            RequestKind::SaferVersion => "Failed to generate safer version",
            RequestKind::Advice => "Failed to generate advice",
        }
    }
}

/// Handle for one in-flight request; only the newest ticket per kind is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    id: u64,
}

impl RequestTicket {
    /// Returns the request kind.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Inputs captured when a request is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Ticket to present on completion.
    pub ticket: RequestTicket,
    /// Message text at start time.
    pub text: String,
    /// Selected model at start time.
    pub model: String,
    /// Categories of the current analysis (advice only).
    pub categories: Vec<String>,
    /// Severity label of the current analysis (advice only).
    pub severity: String,
}

/// Scanner view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Current auth status.
    pub auth: UiAuthState,
    /// Message being analyzed.
    pub text: String,
    /// Selected model.
    pub model: String,
    /// Latest analysis.
    pub analysis: Option<AnalysisResult>,
    /// Latest safer rewrite, empty when none.
    pub safer_version: String,
    /// Latest advice, empty when none.
    pub advice: String,
    /// Language and theme of the signed-in user; defaults when signed out.
    pub settings: UserSettings,
    analyzing: Option<u64>,
    rewriting: Option<u64>,
    advising: Option<u64>,
    next_ticket: u64,
    notifications: Vec<Notification>,
}

impl ScannerState {
    /// Creates empty scanner state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            auth: UiAuthState::Unauthenticated,
            text: String::new(),
            model: DEFAULT_MODEL.to_string(),
            analysis: None,
            safer_version: String::new(),
            advice: String::new(),
            settings: UserSettings::default(),
            analyzing: None,
            rewriting: None,
            advising: None,
            next_ticket: 0,
            notifications: Vec::new(),
        }
    }

    /// Replaces the message text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Selects the model; blank input keeps the default.
    pub fn set_model(&mut self, model: &str) {
        let model = model.trim();
        self.model = if model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.to_string()
        };
    }

    /// Loads the example message.
    pub fn load_example(&mut self) {
        self.text = EXAMPLE_MESSAGE.to_string();
    }

    /// Loads the sample text of a demo scenario.
    pub fn load_scenario(&mut self, scenario: DemoScenario) {
        self.text = scenario.sample_text().to_string();
    }

    /// Pre-fills the example when `page_url` carries `sample=1`.
    ///
    /// Returns `true` when the example was loaded.
    pub fn prefill_from_url(&mut self, page_url: &str) -> bool {
        let requested = Url::parse(page_url)
            .map(|url| {
                url.query_pairs()
                    .any(|(key, value)| key == SAMPLE_QUERY_PARAM && value == "1")
            })
            .unwrap_or(false);
        if requested {
            self.load_example();
        }
        requested
    }

    /// Clears the message and every result.
    pub fn clear(&mut self) {
        self.text.clear();
        self.clear_results();
        self.analyzing = None;
        self.rewriting = None;
        self.advising = None;
    }

    /// Interface message for `key` in the current language.
    pub fn label<'a>(&self, key: &'a str) -> &'a str {
        self.settings.translate(key)
    }

    /// Returns `true` while a request of `kind` is in flight.
    pub fn is_busy(&self, kind: RequestKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Starts an analysis, superseding every in-flight request.
    ///
    /// Blank text records an error notification and returns `None`.
    pub fn begin_analysis(&mut self) -> Option<PendingRequest> {
        if self.text.trim().is_empty() {
            self.notify(Notification::error("Error", EMPTY_TEXT_MESSAGE));
            return None;
        }

        self.clear_results();
        self.rewriting = None;
        self.advising = None;
        Some(self.issue(RequestKind::Analyze, Vec::new(), String::new()))
    }

    /// Applies a finished analysis when its ticket is still current.
    pub fn complete_analysis(&mut self, ticket: RequestTicket, analysis: AnalysisResult) -> bool {
        if !self.settle(ticket) {
            return false;
        }

        let description = if analysis.toxicity_score > TOXIC_SCORE_THRESHOLD {
            format!("Toxicity detected ({} severity)", analysis.severity)
        } else {
            "Message appears safe".to_string()
        };
        self.notify(Notification::success("Analysis Complete", description));
        self.analysis = Some(analysis);
        true
    }

    /// Starts a safer rewrite, superseding any earlier rewrite.
    ///
    /// Blank text records an error notification and returns `None`.
    pub fn begin_safer_version(&mut self) -> Option<PendingRequest> {
        if self.text.trim().is_empty() {
            self.notify(Notification::error(
                RequestKind::SaferVersion.failure_title(),
                EMPTY_TEXT_MESSAGE,
            ));
            return None;
        }
        Some(self.issue(RequestKind::SaferVersion, Vec::new(), String::new()))
    }

    /// Applies a finished rewrite when its ticket is still current.
    pub fn complete_safer_version(&mut self, ticket: RequestTicket, safer: String) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        self.safer_version = safer;
        self.notify(Notification::success(
            "Safer version generated",
            "Review the alternative message below",
        ));
        true
    }

    /// Starts an advice request for the current analysis.
    ///
    /// Returns `None` without a notification when no analysis exists.
    pub fn begin_advice(&mut self) -> Option<PendingRequest> {
        let (categories, severity) = {
            let analysis = self.analysis.as_ref()?;
            (
                analysis.categories.clone(),
                analysis.severity.as_str().to_string(),
            )
        };
        Some(self.issue(RequestKind::Advice, categories, severity))
    }

    /// Applies finished advice when its ticket is still current.
    pub fn complete_advice(&mut self, ticket: RequestTicket, advice: String) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        self.advice = advice;
        self.notify(Notification::success(
            "Safety advice generated",
            "Review recommendations below",
        ));
        true
    }

    /// Records a failed request when its ticket is still current.
    ///
    /// Results of that action are left empty; nothing partial is kept.
    pub fn fail(&mut self, ticket: RequestTicket, message: &str) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        let description = if message.trim().is_empty() {
            "Please try again"
        } else {
            message
        };
        self.notify(Notification::error(
            ticket.kind.failure_title(),
            description,
        ));
        true
    }

    /// Appends a notification.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Returns pending notifications without draining them.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drains pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Highlight tokens for the current text and analysis.
    pub fn highlighted(&self) -> Vec<HighlightToken> {
        let words = self
            .analysis
            .as_ref()
            .map(|analysis| analysis.highlighted_words.as_slice())
            .unwrap_or(&[]);
        highlight_tokens(&self.text, words)
    }

    /// Badge style for the current analysis.
    pub fn severity_style(&self) -> Option<SeverityStyle> {
        self.analysis
            .as_ref()
            .map(|analysis| SeverityStyle::for_severity(&analysis.severity))
    }

    fn clear_results(&mut self) {
        self.analysis = None;
        self.safer_version.clear();
        self.advice.clear();
    }

    fn issue(
        &mut self,
        kind: RequestKind,
        categories: Vec<String>,
        severity: String,
    ) -> PendingRequest {
        self.next_ticket += 1;
        let id = self.next_ticket;
        if let Some(previous) = self.slot_mut(kind).replace(id) {
            debug!(?kind, superseded = previous, current = id, "request superseded");
        }

        PendingRequest {
            ticket: RequestTicket { kind, id },
            text: self.text.clone(),
            model: self.model.clone(),
            categories,
            severity,
        }
    }

    fn settle(&mut self, ticket: RequestTicket) -> bool {
        let slot = self.slot_mut(ticket.kind);
        if *slot == Some(ticket.id) {
            *slot = None;
            true
        } else {
            debug!(kind = ?ticket.kind, ticket = ticket.id, "dropping stale completion");
            false
        }
    }

    fn slot(&self, kind: RequestKind) -> &Option<u64> {
        match kind {
            RequestKind::Analyze => &self.analyzing,
            RequestKind::SaferVersion => &self.rewriting,
            RequestKind::Advice => &self.advising,
        }
    }

    fn slot_mut(&mut self, kind: RequestKind) -> &mut Option<u64> {
        match kind {
            RequestKind::Analyze => &mut self.analyzing,
            RequestKind::SaferVersion => &mut self.rewriting,
            RequestKind::Advice => &mut self.advising,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for scanner reducers.

    use super::*;

    #[test]
    fn blank_text_never_issues_a_request() {
        let mut state = ScannerState::new("0.1.0");
        state.set_text("   ");
        assert!(state.begin_analysis().is_none());
        assert_eq!(state.notifications()[0].description, EMPTY_TEXT_MESSAGE);
        assert!(!state.is_busy(RequestKind::Analyze));
    }

    #[test]
    fn advice_requires_analysis() {
        let mut state = ScannerState::new("0.1.0");
        state.set_text("hi");
        assert!(state.begin_advice().is_none());
        assert!(state.notifications().is_empty());
    }

    #[test]
    fn category_label_replaces_first_underscore_only() {
        assert_eq!(display_category("hate_speech_x"), "hate speech_x");
        assert_eq!(display_category("insult"), "insult");
    }

    #[test]
    fn severity_styles_follow_label() {
        assert_eq!(
            SeverityStyle::for_severity(&Severity::Critical),
            SeverityStyle::Destructive
        );
        assert_eq!(
            SeverityStyle::for_severity(&Severity::Other("extreme".to_string())),
            SeverityStyle::Muted
        );
    }

    #[test]
    fn sample_query_prefills_example() {
        let mut state = ScannerState::new("0.1.0");
        assert!(!state.prefill_from_url("https://app.test/scanner?sample=0"));
        assert!(state.prefill_from_url("https://app.test/scanner?demo=1&sample=1"));
        assert_eq!(state.text, EXAMPLE_MESSAGE);
    }
}
