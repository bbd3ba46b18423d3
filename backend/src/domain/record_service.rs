//! Record service domain logic for the habit tracker.
//!
//! Owns the save/delete/load contract against the persistence collaborator:
//! validation and authentication are checked before any I/O, records are
//! stamped with their owner, and month loads come back as a date-keyed index
//! for constant-time lookup during grid rendering.

use crate::domain::calendar::{date_key, month_grid, parse_date_key};
use crate::domain::scoring::ScoringPolicy;
use crate::error::{AppError, AppResult};
use crate::storage::RecordStore;
use chrono::NaiveDate;
use log::{info, warn};
use shared::{DailyRecord, SaveDayScoreRequest, Session};
use std::collections::HashMap;
use std::sync::Arc;

/// Index a batch of records by their exact `YYYY-MM-DD` date key.
///
/// A well-formed batch never has two records sharing a key; if it does, that
/// is a data-integrity issue upstream. It is surfaced loudly here and
/// resolved last-write-wins, not silently.
pub fn index_by_date(records: Vec<DailyRecord>) -> HashMap<String, DailyRecord> {
    let mut index: HashMap<String, DailyRecord> = HashMap::with_capacity(records.len());
    for record in records {
        let key = record.date.clone();
        if let Some(previous) = index.insert(key, record) {
            warn!(
                "duplicate record for date {} (owner {}); keeping the later row",
                previous.date, previous.owner_id
            );
        }
    }
    index
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    policy: ScoringPolicy,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, policy: ScoringPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Create or overwrite the record for one day.
    ///
    /// Validation errors and missing sessions fail here, before the store is
    /// touched; a write is never attributed to a default owner.
    pub async fn save_day(
        &self,
        session: Option<&Session>,
        request: SaveDayScoreRequest,
    ) -> AppResult<DailyRecord> {
        self.policy.validate_scores(&request.category_scores)?;
        let date = parse_date_key(&request.date)?;
        let session = session.ok_or(AppError::Unauthenticated)?;

        let record = DailyRecord {
            date: date_key(date),
            owner_id: session.owner_id.clone(),
            category_scores: request.category_scores,
            notes: request.notes,
            // Stamped by the store on write
            updated_at: None,
        };

        let stored = self.store.upsert_record(&record).await?;
        info!("saved day {} for owner {}", stored.date, stored.owner_id);
        Ok(stored)
    }

    /// Remove the record for one day entirely
    pub async fn delete_day(&self, session: Option<&Session>, date: &str) -> AppResult<()> {
        let date = parse_date_key(date)?;
        let session = session.ok_or(AppError::Unauthenticated)?;

        self.store
            .delete_record(&session.owner_id, &date_key(date))
            .await?;
        info!("deleted day {} for owner {}", date_key(date), session.owner_id);
        Ok(())
    }

    /// Load every record visible in the month grid containing `month`/`year`,
    /// overflow days included, indexed by date key.
    pub async fn load_month(
        &self,
        session: Option<&Session>,
        month: u32,
        year: u32,
    ) -> AppResult<HashMap<String, DailyRecord>> {
        let session = session.ok_or(AppError::Unauthenticated)?;
        let reference = NaiveDate::from_ymd_opt(year as i32, month, 1)
            .ok_or_else(|| AppError::InvalidDate(format!("{:04}-{:02}-01", year, month)))?;

        let grid = month_grid(reference);
        let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
            return Ok(HashMap::new());
        };

        let records = self
            .store
            .list_records(&session.owner_id, &date_key(*first), &date_key(*last))
            .await?;
        Ok(index_by_date(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use shared::ScoreTier;
    use std::collections::BTreeMap;

    fn service() -> (RecordService, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let service = RecordService::new(store.clone(), ScoringPolicy::checklist_v2());
        (service, store)
    }

    fn session(owner: &str) -> Session {
        Session {
            owner_id: owner.to_string(),
            email: None,
            access_token: "token".to_string(),
        }
    }

    fn scores(teeth: u32, food: u32, sport: u32) -> BTreeMap<String, u32> {
        let mut map = BTreeMap::new();
        map.insert("teeth".to_string(), teeth);
        map.insert("food".to_string(), food);
        map.insert("sport".to_string(), sport);
        map
    }

    fn record(owner: &str, date: &str, teeth: u32) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            owner_id: owner.to_string(),
            category_scores: scores(teeth, 0, 0),
            notes: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_index_by_date_distinct_keys() {
        let records = vec![
            record("u1", "2024-03-01", 5),
            record("u1", "2024-03-02", 10),
            record("u1", "2024-03-15", 0),
        ];
        let index = index_by_date(records);

        assert_eq!(index.len(), 3);
        assert!(index.contains_key("2024-03-15"));
        assert!(!index.contains_key("2024-03-03"));
    }

    #[test]
    fn test_index_distinguishes_absent_from_zero() {
        let index = index_by_date(vec![record("u1", "2024-03-01", 0)]);

        // Present record with total 0 is not the same as no record
        let zero = index.get("2024-03-01").unwrap();
        assert_eq!(zero.total(), 0);
        assert!(index.get("2024-03-02").is_none());
    }

    #[test]
    fn test_index_duplicate_key_last_write_wins() {
        let records = vec![record("u1", "2024-03-01", 5), record("u1", "2024-03-01", 10)];
        let index = index_by_date(records);

        assert_eq!(index.len(), 1);
        assert_eq!(index["2024-03-01"].category_scores["teeth"], 10);
    }

    #[tokio::test]
    async fn test_save_day_stamps_owner() {
        let (service, _) = service();
        let stored = service
            .save_day(
                Some(&session("u1")),
                SaveDayScoreRequest {
                    date: "2024-03-15".to_string(),
                    category_scores: scores(10, 10, 10),
                    notes: Some("great day".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(stored.owner_id, "u1");
        assert_eq!(stored.total(), 30);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_save_day_unauthenticated_fails_before_io() {
        let (service, store) = service();
        let result = service
            .save_day(
                None,
                SaveDayScoreRequest {
                    date: "2024-03-15".to_string(),
                    category_scores: scores(5, 5, 5),
                    notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthenticated)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_day_rejects_invalid_scores_before_io() {
        let (service, store) = service();
        let mut bad = scores(10, 10, 10);
        bad.insert("teeth".to_string(), 42);

        let result = service
            .save_day(
                Some(&session("u1")),
                SaveDayScoreRequest {
                    date: "2024-03-15".to_string(),
                    category_scores: bad,
                    notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_day_rejects_malformed_date() {
        let (service, _) = service();
        let result = service
            .save_day(
                Some(&session("u1")),
                SaveDayScoreRequest {
                    date: "15/03/2024".to_string(),
                    category_scores: scores(5, 5, 5),
                    notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_load_month_includes_overflow_days() {
        let (service, store) = service();
        // Feb 26 2024 is an overflow day on the March grid
        store.upsert_record(&record("u1", "2024-02-26", 5)).await.unwrap();
        store.upsert_record(&record("u1", "2024-03-15", 10)).await.unwrap();
        // Outside the grid entirely
        store.upsert_record(&record("u1", "2024-02-01", 5)).await.unwrap();

        let index = service.load_month(Some(&session("u1")), 3, 2024).await.unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains_key("2024-02-26"));
        assert!(index.contains_key("2024-03-15"));
    }

    #[tokio::test]
    async fn test_load_month_is_owner_scoped() {
        let (service, store) = service();
        store.upsert_record(&record("u1", "2024-03-15", 5)).await.unwrap();
        store.upsert_record(&record("u2", "2024-03-16", 5)).await.unwrap();

        let index = service.load_month(Some(&session("u1")), 3, 2024).await.unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains_key("2024-03-15"));
    }

    #[tokio::test]
    async fn test_save_classify_delete_round_trip() {
        let (service, _) = service();
        let u1 = session("u1");

        let stored = service
            .save_day(
                Some(&u1),
                SaveDayScoreRequest {
                    date: "2024-03-15".to_string(),
                    category_scores: scores(10, 10, 10),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(stored.total(), 30);
        assert_eq!(service.policy().classify(stored.total()), ScoreTier::Top);

        service.delete_day(Some(&u1), "2024-03-15").await.unwrap();

        let index = service.load_month(Some(&u1), 3, 2024).await.unwrap();
        assert!(index.get("2024-03-15").is_none());
    }
}
