//! Settings persisted as one JSON object keyed by user id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{SettingsError, SettingsStore, SettingsUpdate, UserSettings};

type Rows = BTreeMap<String, UserSettings>;

/// Settings store backed by a JSON file.
///
/// Updates rewrite the whole file through a sibling temporary file.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileSettingsStore {
    /// Opens (lazily) the store at `path`; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_rows(&self) -> Result<Rows, SettingsError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) if raw.is_empty() => Ok(Rows::new()),
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file absent; using defaults");
                Ok(Rows::new())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn write_rows(&self, rows: &Rows) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, serde_json::to_vec_pretty(rows)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self, user_id: &str) -> Result<UserSettings, SettingsError> {
        let _lock = self.guard.lock().await;
        Ok(self
            .read_rows()
            .await?
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn update(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<UserSettings, SettingsError> {
        let _lock = self.guard.lock().await;
        let mut rows = self.read_rows().await?;
        let settings = rows
            .get(user_id)
            .copied()
            .unwrap_or_default()
            .with(update);
        rows.insert(user_id.to_string(), settings);
        self.write_rows(&rows).await?;
        info!(user_id, path = %self.path.display(), "settings saved");
        Ok(settings)
    }
}
