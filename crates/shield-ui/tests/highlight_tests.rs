//! Integration tests for message highlighting.

use shield_ui::{HighlightToken, highlight_tokens};

fn joined(tokens: &[HighlightToken]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[test]
fn highlight_tests_flags_only_matching_word() {
    let text = "You are so annoying!";
    let tokens = highlight_tokens(text, &["annoying".to_string()]);

    let flagged: Vec<&str> = tokens
        .iter()
        .filter(|token| token.flagged)
        .map(|token| token.text.as_str())
        .collect();
    assert_eq!(flagged, vec!["annoying!"]);
    assert_eq!(tokens.len(), 7);
    assert_eq!(joined(&tokens), text);
}

#[test]
fn highlight_tests_matches_case_insensitively() {
    let tokens = highlight_tokens("STUPID idea, Stupid.", &["stupid".to_string()]);
    assert!(tokens[0].flagged);
    assert!(!tokens[2].flagged);
    assert!(tokens[4].flagged);
}

#[test]
fn highlight_tests_empty_word_list_is_one_plain_token() {
    let text = "  leading and trailing  ";
    let tokens = highlight_tokens(text, &[]);
    assert_eq!(
        tokens,
        vec![HighlightToken {
            text: text.to_string(),
            flagged: false
        }]
    );
}

#[test]
fn highlight_tests_preserves_mixed_whitespace_and_unicode() {
    let text = "héllo\n\n  wörld\tnasty_word?";
    let tokens = highlight_tokens(text, &["nasty_word".to_string()]);
    assert_eq!(joined(&tokens), text);
    assert!(tokens.last().is_some_and(|token| token.flagged));
}
