//! In-process settings store used by tests and signed-out sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::{SettingsError, SettingsStore, SettingsUpdate, UserSettings};

/// Settings kept in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemorySettingsStore {
    rows: RwLock<HashMap<String, UserSettings>>,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, user_id: &str) -> Result<UserSettings, SettingsError> {
        Ok(self
            .rows
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn update(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<UserSettings, SettingsError> {
        let mut rows = self.rows.write().await;
        let row = rows.entry(user_id.to_string()).or_default();
        *row = row.with(update);
        info!(user_id, language = %row.language, theme = %row.theme, "settings updated");
        Ok(*row)
    }
}
