//! History store persisted as one JSON document on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shield_core::{NewScanRecord, ScanRecord};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Clock, HistoryError, HistoryStore, fresh_record_id, newest_first};

/// History store backed by a JSON array file.
///
/// Every operation reads the file, applies the change and rewrites it through
/// a sibling temporary file, so a crash never leaves a half-written document.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    clock: Clock,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl JsonFileHistoryStore {
    /// Opens (lazily) the store at `path`; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, OffsetDateTime::now_utc)
    }

    /// Opens the store stamping new records with `clock`.
    pub fn with_clock(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self {
            path: path.into(),
            clock,
            guard: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ScanRecord>, HistoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) if raw.is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "history file absent; starting empty");
                Ok(Vec::new())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn persist(&self, records: &[ScanRecord]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let encoded = serde_json::to_vec_pretty(records)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn insert(&self, record: NewScanRecord) -> Result<ScanRecord, HistoryError> {
        let _lock = self.guard.lock().await;
        let mut records = self.load().await?;
        let created_at = (self.clock)();
        let id = fresh_record_id(
            &records,
            &record.user_id,
            created_at,
            &record.original_text,
            records.len() as u64,
        );
        let stored = record.into_record(id, created_at);
        records.push(stored.clone());
        self.persist(&records).await?;
        info!(id = %stored.id, path = %self.path.display(), "scan saved to history file");
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ScanRecord>, HistoryError> {
        let _lock = self.guard.lock().await;
        let owned = self
            .load()
            .await?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .collect::<Vec<_>>();
        let mut ordered = newest_first(owned.into_iter());
        ordered.truncate(limit.unwrap_or(usize::MAX));
        Ok(ordered)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), HistoryError> {
        let _lock = self.guard.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|record| !(record.id == id && record.user_id == user_id));
        if records.len() == before {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        self.persist(&records).await?;
        info!(id, user_id, "history record deleted");
        Ok(())
    }
}
