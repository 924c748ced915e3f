//! In-process history store used by tests and demo sessions.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use shield_core::{NewScanRecord, ScanRecord};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Clock, HistoryError, HistoryStore, fresh_record_id, newest_first};

/// History store kept in memory for the lifetime of the process.
pub struct MemoryHistoryStore {
    records: RwLock<Vec<ScanRecord>>,
    clock: Clock,
    // Never reused, even after deletes.
    next_sequence: AtomicU64,
}

impl MemoryHistoryStore {
    /// Creates an empty store stamping records with the system clock.
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }

    /// Creates an empty store stamping records with `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            clock,
            next_sequence: AtomicU64::new(0),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, record: NewScanRecord) -> Result<ScanRecord, HistoryError> {
        let mut records = self.records.write().await;
        let created_at = (self.clock)();
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let id = fresh_record_id(
            &records,
            &record.user_id,
            created_at,
            &record.original_text,
            sequence,
        );
        let stored = record.into_record(id, created_at);
        records.push(stored.clone());
        info!(id = %stored.id, user_id = %stored.user_id, "scan saved to history");
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ScanRecord>, HistoryError> {
        let records = self.records.read().await;
        let owned = records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        let mut ordered = newest_first(owned.into_iter());
        ordered.truncate(limit.unwrap_or(usize::MAX));
        Ok(ordered)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), HistoryError> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|record| record.id == id && record.user_id == user_id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        records.remove(position);
        info!(id, user_id, "history record deleted");
        Ok(())
    }
}
