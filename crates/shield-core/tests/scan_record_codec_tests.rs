//! Tests decoding of persisted history rows.

use shield_core::{NewScanRecord, ScanRecord};
use time::macros::datetime;

#[test]
fn scan_record_codec_tests_decodes_store_row_with_null_optionals() {
    let raw = r#"{
        "id": "rec-1",
        "user_id": "user-1",
        "original_text": "You are annoying",
        "toxicity_score": 78,
        "categories": ["harassment"],
        "highlighted_words": ["annoying"],
        "safer_version": null,
        "advice": null,
        "model_used": "gemini",
        "created_at": "2026-01-02T03:04:05Z"
    }"#;

    let record: ScanRecord = serde_json::from_str(raw).expect("row should decode");
    assert_eq!(record.toxicity_score, 78);
    assert!(record.safer_version.is_none());
    assert_eq!(record.created_at, datetime!(2026-01-02 03:04:05 UTC));
}

#[test]
fn scan_record_codec_tests_into_record_keeps_fields_verbatim() {
    let pending = NewScanRecord {
        user_id: "user-1".to_string(),
        original_text: "text".to_string(),
        toxicity_score: 12,
        categories: vec!["x".to_string(), "x".to_string()],
        highlighted_words: vec![],
        safer_version: Some("kinder".to_string()),
        advice: None,
        model_used: "gpt".to_string(),
    };

    let record = pending
        .clone()
        .into_record("rec-9", datetime!(2026-03-01 00:00:00 UTC));
    assert_eq!(record.id, "rec-9");
    assert_eq!(record.categories, pending.categories);
    assert_eq!(record.safer_version, pending.safer_version);
}
