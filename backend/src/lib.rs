//! # Habit Tracker Backend
//!
//! Core of a personal habit-tracking calendar: a user authenticates, views a
//! month grid, and records a per-day score across a small set of categories,
//! persisted remotely and re-rendered as colored day cells.
//!
//! The backend is UI-agnostic. It is organized in layers:
//!
//! - **Domain**: calendar grid math, the day score engine, and the month view
//!   state machine
//! - **Storage**: the record store abstraction plus hosted and in-memory
//!   implementations
//! - **Auth**: the identity collaborator boundary
//!
//! The presentation layer is a pure consumer of [`AppState`] and the view
//! types in the `shared` crate.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

use crate::auth::{AuthProvider, MemoryAuth, RestAuthClient};
use crate::config::RemoteConfig;
use crate::domain::{CalendarService, MonthViewService, RecordService, ScoringPolicy};
use crate::error::AppResult;
use crate::storage::{MemoryRecordStore, RestRecordStore};
use log::info;
use std::sync::Arc;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub calendar_service: CalendarService,
    pub record_service: RecordService,
    pub month_view: MonthViewService,
}

impl AppState {
    fn assemble(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn storage::RecordStore>,
        policy: ScoringPolicy,
    ) -> Self {
        let calendar_service = CalendarService::new();
        let record_service = RecordService::new(store, policy);
        let month_view = MonthViewService::new(record_service.clone(), calendar_service.clone());
        Self {
            auth,
            calendar_service,
            record_service,
            month_view,
        }
    }

    /// State wired against in-memory collaborators, for tests and offline use
    pub fn in_memory(policy: ScoringPolicy) -> Self {
        Self::assemble(
            Arc::new(MemoryAuth::new()),
            Arc::new(MemoryRecordStore::new()),
            policy,
        )
    }
}

/// Initialize the backend against the hosted collaborators
pub async fn initialize_backend(config: &RemoteConfig) -> AppResult<AppState> {
    info!("setting up remote record store at {}", config.base_url);
    let store = Arc::new(RestRecordStore::new(config)?);

    info!("setting up identity client");
    let auth = Arc::new(RestAuthClient::new(config)?);

    // Keep the store's bearer token in step with the session lifecycle, so
    // writes after logout fail at the collaborator instead of running as a
    // stale user
    let mut sessions = auth.subscribe();
    let authorized_store = store.clone();
    tokio::spawn(async move {
        loop {
            let token = sessions
                .borrow_and_update()
                .as_ref()
                .map(|s| s.access_token.clone());
            authorized_store.set_access_token(token).await;
            if sessions.changed().await.is_err() {
                break;
            }
        }
    });

    info!("setting up domain services");
    Ok(AppState::assemble(auth, store, ScoringPolicy::checklist_v2()))
}
