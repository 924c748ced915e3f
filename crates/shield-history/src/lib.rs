#![warn(missing_docs)]
//! # shield-history
//!
//! ## Purpose
//! Persists saved scans per user and derives the dashboard summary.
//!
//! ## Responsibilities
//! - Build history records from an analysis plus optional rewrite and advice.
//! - Store, list (newest first) and delete records through [`HistoryStore`].
//! - Compute dashboard statistics and the recent score trend.
//! - Provide sample records for disconnected demos.
//!
//! ## Data flow
//! Scanner "save" -> [`new_record_from_analysis`] -> [`HistoryStore::insert`];
//! history and dashboard views -> [`HistoryStore::list_for_user`] ->
//! [`dashboard_stats`] / export.
//!
//! ## Ownership and lifetimes
//! Stores hand out cloned records; callers never borrow store internals.
//!
//! ## Error model
//! I/O, codec and missing-record failures return [`HistoryError`].
//!
//! ## Security and privacy notes
//! Stores filter by owner on every read and delete; one user's records are
//! never visible to another.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shield_analysis_contract::AnalysisResult;
use shield_core::{DEFAULT_MODEL, NewScanRecord, ScanRecord};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

mod file;
mod memory;

pub use file::JsonFileHistoryStore;
pub use memory::MemoryHistoryStore;

/// Number of newest records summarized by the dashboard.
pub const DASHBOARD_WINDOW: usize = 10;

/// Number of newest records plotted in the score trend.
pub const TREND_WINDOW: usize = 7;

/// Source of creation timestamps for new records.
pub type Clock = fn() -> OffsetDateTime;

/// Persistent per-user scan history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Stores a new record, assigning identity and creation time.
    async fn insert(&self, record: NewScanRecord) -> Result<ScanRecord, HistoryError>;

    /// Lists the user's records, newest first, truncated to `limit`.
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ScanRecord>, HistoryError>;

    /// Deletes one of the user's records.
    ///
    /// Returns [`HistoryError::NotFound`] when the user owns no such record.
    async fn delete(&self, user_id: &str, id: &str) -> Result<(), HistoryError>;
}

/// Copies an analysis into a pending history record.
///
/// Blank rewrite or advice text is stored as absent. `model` is the selector
/// chosen in the view, not the model echoed by the backend.
pub fn new_record_from_analysis(
    user_id: &str,
    original_text: &str,
    analysis: &AnalysisResult,
    safer_version: &str,
    advice: &str,
    model: &str,
) -> NewScanRecord {
    NewScanRecord {
        user_id: user_id.to_string(),
        original_text: original_text.to_string(),
        toxicity_score: analysis.toxicity_score,
        categories: analysis.categories.clone(),
        highlighted_words: analysis.highlighted_words.clone(),
        safer_version: non_blank(safer_version),
        advice: non_blank(advice),
        model_used: model.to_string(),
    }
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Derives a stable record id from owner, creation time, text and sequence.
pub fn record_id(user_id: &str, created_at: OffsetDateTime, text: &str, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(created_at.unix_timestamp_nanos().to_be_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..16])
}

/// Derives an id for a new record that no stored record already uses.
///
/// Starts at `sequence` and moves to the next sequence on collision.
pub(crate) fn fresh_record_id(
    records: &[ScanRecord],
    user_id: &str,
    created_at: OffsetDateTime,
    text: &str,
    mut sequence: u64,
) -> String {
    loop {
        let id = record_id(user_id, created_at, text, sequence);
        if !records.iter().any(|record| record.id == id) {
            return id;
        }
        sequence = sequence.wrapping_add(1);
    }
}

/// Orders records newest first; ties keep the later insertion first.
pub(crate) fn newest_first(records: impl DoubleEndedIterator<Item = ScanRecord>) -> Vec<ScanRecord> {
    let mut ordered: Vec<ScanRecord> = records.rev().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

/// Dashboard summary over the newest records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    /// Number of records summarized.
    pub total: usize,
    /// Records created within the last seven days.
    pub this_week: usize,
    /// Rounded mean toxicity score; zero when empty.
    pub avg_score: u8,
}

/// Summarizes `records` as seen at `now`.
pub fn dashboard_stats(records: &[ScanRecord], now: OffsetDateTime) -> DashboardStats {
    if records.is_empty() {
        return DashboardStats::default();
    }

    let week_ago = now - Duration::days(7);
    let this_week = records
        .iter()
        .filter(|record| record.created_at > week_ago)
        .count();
    let sum: u64 = records
        .iter()
        .map(|record| u64::from(record.toxicity_score))
        .sum();
    let avg = (sum as f64 / records.len() as f64).round() as u8;

    DashboardStats {
        total: records.len(),
        this_week,
        avg_score: avg,
    }
}

/// Labeled scores of the newest records in chronological order.
pub fn score_trend(records: &[ScanRecord]) -> Vec<(String, u8)> {
    let mut window: Vec<&ScanRecord> = records.iter().take(TREND_WINDOW).collect();
    window.reverse();
    window
        .into_iter()
        .enumerate()
        .map(|(index, record)| (format!("Scan {}", index + 1), record.toxicity_score))
        .collect()
}

/// Sample records shown by the dashboard's "load demo data" action.
pub fn demo_records(now: OffsetDateTime) -> Vec<ScanRecord> {
    let sample = |id: &str, text: &str, score: u8, word: &str, created_at: OffsetDateTime| {
        ScanRecord {
            id: id.to_string(),
            user_id: "demo".to_string(),
            original_text: text.to_string(),
            toxicity_score: score,
            categories: vec!["harassment".to_string()],
            highlighted_words: vec![word.to_string()],
            safer_version: None,
            advice: None,
            model_used: DEFAULT_MODEL.to_string(),
            created_at,
        }
    };

    vec![
        sample("1", "You are annoying and nobody likes you", 78, "annoying", now),
        sample(
            "2",
            "Stop posting this nonsense",
            55,
            "nonsense",
            now - Duration::days(1),
        ),
    ]
}

/// History store errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Backing file could not be read or written.
    #[error("history storage failure: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded.
    #[error("history codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// No record with this id is owned by the user.
    #[error("history record not found: {0}")]
    NotFound(String),
}
