//! Hosted record store client.
//!
//! Speaks the PostgREST dialect of the hosted row store: range queries via
//! `gte.`/`lte.` filters, upserts via `Prefer: resolution=merge-duplicates`
//! with the (owner_id, date) conflict key, deletes via `eq.` filters. The
//! wire format beyond that is the collaborator's concern.

use crate::config::RemoteConfig;
use crate::error::{AppError, AppResult};
use crate::storage::RecordStore;
use async_trait::async_trait;
use log::{debug, error};
use shared::DailyRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const RECORDS_TABLE: &str = "daily_records";

/// Record store backed by the hosted PostgREST endpoint
#[derive(Clone)]
pub struct RestRecordStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Session bearer token; falls back to the anonymous key when signed out
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestRecordStore {
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Attach (or clear) the session token used for row-level authorization
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    fn records_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, RECORDS_TABLE)
    }

    async fn bearer(&self) -> String {
        self.access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    async fn check_status(operation: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} failed with status {}: {}", operation, status, body);
            return Err(AppError::store(format!(
                "{} failed with status {}",
                operation, status
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn list_records(
        &self,
        owner_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyRecord>> {
        debug!("listing records {}..{} for owner {}", start_date, end_date, owner_id);
        let owner_filter = format!("eq.{}", owner_id);
        let start_filter = format!("gte.{}", start_date);
        let end_filter = format!("lte.{}", end_date);
        let response = self
            .client
            .get(self.records_url())
            .query(&[
                ("select", "*"),
                ("owner_id", owner_filter.as_str()),
                ("date", start_filter.as_str()),
                ("date", end_filter.as_str()),
                ("order", "date.asc"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        let response = Self::check_status("list_records", response).await?;
        Ok(response.json::<Vec<DailyRecord>>().await?)
    }

    async fn upsert_record(&self, record: &DailyRecord) -> AppResult<DailyRecord> {
        debug!("upserting record {} for owner {}", record.date, record.owner_id);
        let response = self
            .client
            .post(self.records_url())
            .query(&[("on_conflict", "owner_id,date")])
            .header("apikey", &self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .bearer_auth(self.bearer().await)
            .json(record)
            .send()
            .await?;

        let response = Self::check_status("upsert_record", response).await?;
        let mut rows = response.json::<Vec<DailyRecord>>().await?;
        rows.pop()
            .ok_or_else(|| AppError::store("upsert returned no row"))
    }

    async fn delete_record(&self, owner_id: &str, date: &str) -> AppResult<()> {
        debug!("deleting record {} for owner {}", date, owner_id);
        let owner_filter = format!("eq.{}", owner_id);
        let date_filter = format!("eq.{}", date);
        let response = self
            .client
            .delete(self.records_url())
            .query(&[
                ("owner_id", owner_filter.as_str()),
                ("date", date_filter.as_str()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        Self::check_status("delete_record", response).await?;
        Ok(())
    }
}
