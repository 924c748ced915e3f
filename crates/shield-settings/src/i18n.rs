//! Interface message catalog.

use crate::Language;

/// Every message key, in catalog order.
pub const MESSAGE_KEYS: [&str; 34] = [
    "nav.scanner",
    "nav.dashboard",
    "nav.history",
    "nav.safety",
    "nav.settings",
    "landing.title",
    "landing.subtitle",
    "landing.cta",
    "landing.login",
    "landing.signup",
    "landing.activism",
    "scanner.title",
    "scanner.placeholder",
    "scanner.analyze",
    "scanner.analyzing",
    "scanner.score",
    "scanner.categories",
    "scanner.rewrite",
    "scanner.advice",
    "scanner.save",
    "dashboard.title",
    "dashboard.recent",
    "dashboard.chart",
    "history.title",
    "history.export",
    "history.delete",
    "safety.title",
    "safety.search",
    "settings.title",
    "settings.darkMode",
    "settings.language",
    "settings.dangerZone",
    "settings.deleteAccount",
    "settings.theme",
];

// Indexed in the same order as `MESSAGE_KEYS`.
const ENGLISH: [&str; 34] = [
    "Scanner",
    "Dashboard",
    "History",
    "Safety Tips",
    "Settings",
    "AI Digital Shield",
    "Protecting women and girls from digital harassment",
    "Start Scanning",
    "Login",
    "Sign Up",
    "16 Days of Activism Against Gender-Based Violence",
    "Message Scanner",
    "Paste the message you want to analyze here...",
    "Analyze Message",
    "Analyzing...",
    "Toxicity Score",
    "Detected Categories",
    "Get Safer Version",
    "Get Safety Advice",
    "Save to History",
    "Dashboard",
    "Recent Scans",
    "Toxicity Trend",
    "Scan History",
    "Export PDF",
    "Delete",
    "Safety Tips Library",
    "Search tips...",
    "Settings",
    "Dark Mode",
    "Language",
    "Danger Zone",
    "Delete Account",
    "Theme",
];

const SWAHILI: [&str; 34] = [
    "Skana",
    "Dashibodi",
    "Historia",
    "Vidokezo vya Usalama",
    "Mipangilio",
    "Ngao ya Dijitali ya AI",
    "Kulinda wanawake na wasichana dhidi ya udhalimu wa kidijitali",
    "Anza Kuskana",
    "Ingia",
    "Jisajili",
    "Siku 16 za Utetezi dhidi ya Unyanyasaji wa Kijinsia",
    "Skana ya Ujumbe",
    "Bandika ujumbe unaotaka kuchanganua hapa...",
    "Changanuza Ujumbe",
    "Inachanganua...",
    "Alama ya Sumu",
    "Aina Zilizogunduliwa",
    "Pata Toleo Salama",
    "Pata Ushauri wa Usalama",
    "Hifadhi kwenye Historia",
    "Dashibodi",
    "Uchunguzi wa Hivi Karibuni",
    "Mwenendo wa Sumu",
    "Historia ya Uchunguzi",
    "Hamisha PDF",
    "Futa",
    "Maktaba ya Vidokezo vya Usalama",
    "Tafuta vidokezo...",
    "Mipangilio",
    "Hali ya Giza",
    "Lugha",
    "Eneo la Hatari",
    "Futa Akaunti",
    "Mandhari",
];

/// Returns the message for `key` in `language`.
///
/// Unknown keys are returned unchanged.
pub fn translate<'a>(language: Language, key: &'a str) -> &'a str {
    let table = match language {
        Language::English => &ENGLISH,
        Language::Swahili => &SWAHILI,
    };
    MESSAGE_KEYS
        .iter()
        .position(|candidate| *candidate == key)
        .map(|index| table[index])
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_both_languages() {
        assert_eq!(translate(Language::English, "history.title"), "Scan History");
        assert_eq!(
            translate(Language::Swahili, "history.title"),
            "Historia ya Uchunguzi"
        );
        assert_eq!(translate(Language::Swahili, "scanner.score"), "Alama ya Sumu");
    }

    #[test]
    fn unknown_keys_fall_back_to_the_key() {
        assert_eq!(translate(Language::Swahili, "scanner.missing"), "scanner.missing");
    }

    #[test]
    fn keys_are_unique() {
        for (index, key) in MESSAGE_KEYS.iter().enumerate() {
            assert_eq!(MESSAGE_KEYS.iter().position(|other| other == key), Some(index));
        }
    }
}
