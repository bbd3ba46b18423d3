//! # Storage Traits
//!
//! Defines the storage abstraction that lets the domain layer work against
//! different persistence collaborators (hosted row store, in-memory fake)
//! without modification. Date parameters at this boundary are always
//! `YYYY-MM-DD` civil date keys.

use crate::error::AppResult;
use async_trait::async_trait;
use shared::DailyRecord;

/// Interface for daily record storage operations
///
/// Concurrency control is the collaborator's upsert-by-composite-key; the core
/// treats every save as idempotent-by-overwrite and performs no retries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inclusive range query by date, filtered to the given owner
    async fn list_records(
        &self,
        owner_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyRecord>>;

    /// Create or wholesale-replace the record for its (owner_id, date) key.
    /// The store stamps `updated_at`; returns the stored row.
    async fn upsert_record(&self, record: &DailyRecord) -> AppResult<DailyRecord>;

    /// Remove the record for (owner_id, date) entirely. Deleting an absent
    /// record is not an error.
    async fn delete_record(&self, owner_id: &str, date: &str) -> AppResult<()>;
}
