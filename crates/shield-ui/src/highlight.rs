//! Flags the words of a message that the analysis marked as harmful.

/// One display token of the analyzed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    /// Token text exactly as it appears in the message.
    pub text: String,
    /// Whether the token matches a highlighted word.
    pub flagged: bool,
}

impl HighlightToken {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            flagged: false,
        }
    }
}

/// Splits `text` into word and whitespace tokens, flagging highlighted words.
///
/// Concatenating the token texts reproduces `text` exactly. A word matches
/// when, stripped of non-word characters and lower-cased, it equals one of
/// `words` compared case-insensitively. With no words the whole message is a
/// single unflagged token.
pub fn highlight_tokens(text: &str, words: &[String]) -> Vec<HighlightToken> {
    if words.is_empty() {
        return vec![HighlightToken::plain(text)];
    }

    let needles: Vec<String> = words.iter().map(|word| word.to_lowercase()).collect();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (index, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if in_space.is_some_and(|previous| previous != is_space) {
            tokens.push(classify(&text[start..index], &needles));
            start = index;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(classify(&text[start..], &needles));
    }

    tokens
}

fn classify(token: &str, needles: &[String]) -> HighlightToken {
    if token.chars().all(char::is_whitespace) {
        return HighlightToken::plain(token);
    }

    let stripped: String = token
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    HighlightToken {
        text: token.to_string(),
        flagged: needles.iter().any(|needle| *needle == stripped),
    }
}
