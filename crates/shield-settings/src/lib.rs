#![warn(missing_docs)]
//! # shield-settings
//!
//! ## Purpose
//! Keeps each user's display preferences: interface language and theme.
//!
//! ## Responsibilities
//! - Model [`UserSettings`] and partial [`SettingsUpdate`]s.
//! - Load and update a user's settings through [`SettingsStore`].
//! - Look up interface messages by language with [`translate`].
//!
//! ## Data flow
//! Sign-in -> [`SettingsStore::load`] -> view state; settings command ->
//! [`SettingsStore::update`] -> persisted row -> view state.
//!
//! ## Ownership and lifetimes
//! Stores hand out copies; settings are small `Copy` values.
//!
//! ## Error model
//! I/O and codec failures return [`SettingsError`]. Unknown language or
//! theme names fail to parse with [`SettingsError::Invalid`].
//!
//! ## Security and privacy notes
//! Rows are keyed by user id; a user only ever reads or writes their own.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod file;
mod i18n;
mod memory;

pub use file::JsonFileSettingsStore;
pub use i18n::{MESSAGE_KEYS, translate};
pub use memory::MemorySettingsStore;

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Kiswahili.
    #[serde(rename = "sw")]
    Swahili,
}

impl Language {
    /// Every supported language in menu order.
    pub const ALL: [Language; 2] = [Language::English, Language::Swahili];

    /// Short code stored in settings rows.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Swahili => "sw",
        }
    }

    /// Name shown in the language picker.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Swahili => "Kiswahili",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| SettingsError::Invalid(format!("unknown language: {value}")))
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(SettingsError::Invalid(format!("unknown theme: {value}"))),
        }
    }
}

/// Stored preferences of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSettings {
    /// Interface language.
    #[serde(default)]
    pub language: Language,
    /// Color theme.
    #[serde(default)]
    pub theme: Theme,
}

impl UserSettings {
    /// Returns these settings with `update` applied.
    pub fn with(self, update: SettingsUpdate) -> Self {
        Self {
            language: update.language.unwrap_or(self.language),
            theme: update.theme.unwrap_or(self.theme),
        }
    }

    /// Looks up an interface message in this language.
    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        translate(self.language, key)
    }
}

/// Partial settings change; absent fields keep their stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsUpdate {
    /// New language, if changing.
    pub language: Option<Language>,
    /// New theme, if changing.
    pub theme: Option<Theme>,
}

impl SettingsUpdate {
    /// Returns `true` when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.theme.is_none()
    }
}

/// Per-user settings persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the user's settings, or the defaults when none are stored.
    async fn load(&self, user_id: &str) -> Result<UserSettings, SettingsError>;

    /// Applies `update` to the user's settings and returns the result.
    async fn update(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<UserSettings, SettingsError>;
}

/// Settings store errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Backing file could not be read or written.
    #[error("settings storage failure: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded.
    #[error("settings codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// A language or theme name was not recognized.
    #[error("{0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("SW".parse::<Language>().ok(), Some(Language::Swahili));
        assert_eq!(" dark ".parse::<Theme>().ok(), Some(Theme::Dark));
        assert!("fr".parse::<Language>().is_err());
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn update_keeps_unset_fields() {
        let stored = UserSettings {
            language: Language::Swahili,
            theme: Theme::Light,
        };
        let changed = stored.with(SettingsUpdate {
            language: None,
            theme: Some(Theme::Light.toggled()),
        });
        assert_eq!(changed.language, Language::Swahili);
        assert_eq!(changed.theme, Theme::Dark);
    }

    #[test]
    fn rows_use_short_codes() {
        let encoded = serde_json::to_value(UserSettings {
            language: Language::Swahili,
            theme: Theme::Dark,
        })
        .expect("settings encode");
        assert_eq!(encoded, serde_json::json!({"language": "sw", "theme": "dark"}));

        let decoded: UserSettings =
            serde_json::from_value(serde_json::json!({})).expect("empty row decodes");
        assert_eq!(decoded, UserSettings::default());
    }
}
