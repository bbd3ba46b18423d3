//! In-memory record store.
//!
//! Backs tests and offline development with the same upsert/range/delete
//! contract as the hosted store, including the server-side `updated_at` stamp.

use crate::error::AppResult;
use crate::storage::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use shared::DailyRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Record store keeping rows in a map keyed by (owner_id, date)
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    rows: Arc<RwLock<HashMap<(String, String), DailyRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, across all owners
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_records(
        &self,
        owner_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyRecord>> {
        let rows = self.rows.read().await;
        // Lexicographic comparison is date order for YYYY-MM-DD keys
        let mut records: Vec<DailyRecord> = rows
            .values()
            .filter(|r| {
                r.owner_id == owner_id
                    && r.date.as_str() >= start_date
                    && r.date.as_str() <= end_date
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(records)
    }

    async fn upsert_record(&self, record: &DailyRecord) -> AppResult<DailyRecord> {
        let mut stored = record.clone();
        stored.updated_at = Some(Utc::now().to_rfc3339());

        let key = (stored.owner_id.clone(), stored.date.clone());
        let mut rows = self.rows.write().await;
        let replaced = rows.insert(key, stored.clone()).is_some();
        info!(
            "{} record for {} (owner {})",
            if replaced { "replaced" } else { "stored" },
            stored.date,
            stored.owner_id
        );
        Ok(stored)
    }

    async fn delete_record(&self, owner_id: &str, date: &str) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        rows.remove(&(owner_id.to_string(), date.to_string()));
        Ok(())
    }
}
