//! Integration tests for settings stores.

use shield_settings::{
    JsonFileSettingsStore, Language, MemorySettingsStore, SettingsStore, SettingsUpdate, Theme,
    UserSettings,
};

async fn exercise_store(store: &dyn SettingsStore) {
    let fresh = store.load("alice").await.expect("load should succeed");
    assert_eq!(fresh, UserSettings::default());
    assert_eq!(fresh.language, Language::English);
    assert_eq!(fresh.theme, Theme::Light);

    let switched = store
        .update(
            "alice",
            SettingsUpdate {
                language: Some(Language::Swahili),
                theme: None,
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(switched.language, Language::Swahili);
    assert_eq!(switched.theme, Theme::Light);

    store
        .update(
            "alice",
            SettingsUpdate {
                language: None,
                theme: Some(Theme::Dark),
            },
        )
        .await
        .expect("update should succeed");

    let loaded = store.load("alice").await.expect("load should succeed");
    assert_eq!(
        loaded,
        UserSettings {
            language: Language::Swahili,
            theme: Theme::Dark,
        }
    );
    assert_eq!(loaded.translate("nav.settings"), "Mipangilio");

    let other = store.load("bob").await.expect("load should succeed");
    assert_eq!(other, UserSettings::default(), "rows are per user");
}

#[tokio::test]
async fn settings_store_tests_memory_store_updates_per_user() {
    exercise_store(&MemorySettingsStore::new()).await;
}

#[tokio::test]
async fn settings_store_tests_file_store_updates_per_user() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    exercise_store(&JsonFileSettingsStore::new(dir.path().join("settings.json"))).await;
}

#[tokio::test]
async fn settings_store_tests_file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("nested").join("settings.json");

    JsonFileSettingsStore::new(&path)
        .update(
            "alice",
            SettingsUpdate {
                language: Some(Language::Swahili),
                theme: Some(Theme::Dark),
            },
        )
        .await
        .expect("update should succeed");

    let reopened = JsonFileSettingsStore::new(&path)
        .load("alice")
        .await
        .expect("load should succeed");
    assert_eq!(reopened.language, Language::Swahili);
    assert_eq!(reopened.theme, Theme::Dark);

    let raw = std::fs::read_to_string(&path).expect("file should exist");
    let rows: serde_json::Value = serde_json::from_str(&raw).expect("file should be JSON");
    assert_eq!(rows["alice"]["language"], "sw");
}
