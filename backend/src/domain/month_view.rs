//! Month view orchestration for the habit tracker.
//!
//! Models the browsing/editing flow as an explicit state machine instead of
//! implicit UI state, and guards month loads against out-of-order completion:
//! every load carries a generation tag, and a completion whose tag is no
//! longer the newest is discarded on arrival. Last-requested-month-wins.

use crate::domain::calendar::{parse_date_key, CalendarService};
use crate::domain::record_service::RecordService;
use crate::error::{AppError, AppResult};
use log::{debug, error};
use shared::{CalendarFocusDate, CalendarMonth, DailyRecord, SaveDayScoreRequest, Session};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Where the user is in the browse/edit flow
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    /// Looking at the month grid
    Browsing,
    /// A day cell is open for editing. `existing` is the stored record when
    /// the day already has one.
    Editing {
        date: String,
        existing: Option<DailyRecord>,
    },
}

/// Snapshot of the month view state handed to the presentation layer
#[derive(Debug, Clone)]
pub struct MonthViewState {
    pub focus: CalendarFocusDate,
    /// Date-keyed index of the loaded records; absence of a key is the
    /// canonical "no record for this date"
    pub records: HashMap<String, DailyRecord>,
    pub mode: ViewMode,
    /// A load is in flight; the grid stays interactive for navigation
    pub loading: bool,
    /// The last applied load failed and the view degraded to an empty month.
    /// Lets the consumer distinguish this from a genuinely empty month.
    pub load_failed: bool,
}

/// Tag identifying one month load request
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
    pub month: u32,
    pub year: u32,
}

/// Drives the month view: navigation, tagged loads, and the edit flow
#[derive(Clone)]
pub struct MonthViewService {
    records: RecordService,
    calendar: CalendarService,
    state: Arc<Mutex<MonthViewState>>,
    latest_generation: Arc<AtomicU64>,
}

impl MonthViewService {
    pub fn new(records: RecordService, calendar: CalendarService) -> Self {
        let focus = calendar.get_focus_date();
        Self {
            records,
            calendar,
            state: Arc::new(Mutex::new(MonthViewState {
                focus,
                records: HashMap::new(),
                mode: ViewMode::Browsing,
                loading: false,
                load_failed: false,
            })),
            latest_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn calendar(&self) -> &CalendarService {
        &self.calendar
    }

    pub fn records(&self) -> &RecordService {
        &self.records
    }

    /// Current state snapshot
    pub fn state(&self) -> MonthViewState {
        self.state.lock().unwrap().clone()
    }

    /// Start a month load: moves focus, marks the view loading, and issues
    /// the generation tag the completion must present.
    pub fn begin_load(&self, month: u32, year: u32) -> LoadTicket {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().unwrap();
        state.focus = CalendarFocusDate { month, year };
        state.loading = true;
        LoadTicket {
            generation,
            month,
            year,
        }
    }

    /// Commit a completed load if its ticket is still the newest; a stale
    /// completion is discarded and may not clobber newer state.
    ///
    /// A failed load degrades to an empty index so the grid still renders,
    /// but is logged and flagged so it is not mistaken for an empty month.
    pub fn apply_load(
        &self,
        ticket: &LoadTicket,
        result: AppResult<HashMap<String, DailyRecord>>,
    ) -> bool {
        if ticket.generation != self.latest_generation.load(Ordering::SeqCst) {
            debug!(
                "discarding stale load of {}/{} (generation {})",
                ticket.month, ticket.year, ticket.generation
            );
            return false;
        }

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(index) => {
                state.records = index;
                state.load_failed = false;
            }
            Err(err) => {
                error!(
                    "load of {}/{} failed: {}; showing an empty month",
                    ticket.month, ticket.year, err
                );
                state.records = HashMap::new();
                state.load_failed = true;
            }
        }
        state.loading = false;
        true
    }

    /// Load the currently focused month
    pub async fn refresh(&self, session: Option<&Session>) -> bool {
        let focus = self.calendar.get_focus_date();
        let ticket = self.begin_load(focus.month, focus.year);
        let result = self
            .records
            .load_month(session, focus.month, focus.year)
            .await;
        self.apply_load(&ticket, result)
    }

    pub async fn navigate_previous(&self, session: Option<&Session>) -> CalendarFocusDate {
        let focus = self.calendar.navigate_previous_month();
        self.refresh(session).await;
        focus
    }

    pub async fn navigate_next(&self, session: Option<&Session>) -> CalendarFocusDate {
        let focus = self.calendar.navigate_next_month();
        self.refresh(session).await;
        focus
    }

    pub async fn navigate_today(&self, session: Option<&Session>) -> CalendarFocusDate {
        let focus = self.calendar.navigate_today();
        self.refresh(session).await;
        focus
    }

    /// Browsing → Editing on an explicit cell selection
    pub fn open_day(&self, date: &str) -> AppResult<ViewMode> {
        parse_date_key(date)?;
        let mut state = self.state.lock().unwrap();
        if !matches!(state.mode, ViewMode::Browsing) {
            return Err(AppError::validation("a day is already being edited"));
        }
        let existing = state.records.get(date).cloned();
        state.mode = ViewMode::Editing {
            date: date.to_string(),
            existing,
        };
        Ok(state.mode.clone())
    }

    /// Editing → Browsing without touching the store
    pub fn cancel_edit(&self) {
        let mut state = self.state.lock().unwrap();
        state.mode = ViewMode::Browsing;
    }

    /// Editing → Saved: persists the edited day, returns to browsing, and
    /// reloads the month. On failure the edit stays open so the caller can
    /// surface the error.
    pub async fn save_edited_day(
        &self,
        session: Option<&Session>,
        category_scores: std::collections::BTreeMap<String, u32>,
        notes: Option<String>,
    ) -> AppResult<DailyRecord> {
        let date = self.edited_date()?;
        let stored = self
            .records
            .save_day(
                session,
                SaveDayScoreRequest {
                    date,
                    category_scores,
                    notes,
                },
            )
            .await?;

        self.state.lock().unwrap().mode = ViewMode::Browsing;
        self.refresh(session).await;
        Ok(stored)
    }

    /// Editing → Deleted: removes the edited day, returns to browsing, and
    /// reloads the month.
    pub async fn delete_edited_day(&self, session: Option<&Session>) -> AppResult<()> {
        let date = self.edited_date()?;
        self.records.delete_day(session, &date).await?;

        self.state.lock().unwrap().mode = ViewMode::Browsing;
        self.refresh(session).await;
        Ok(())
    }

    /// Assemble the month view for the presentation layer from current state
    pub fn calendar_month(&self) -> AppResult<CalendarMonth> {
        let (focus, records) = {
            let state = self.state.lock().unwrap();
            (state.focus.clone(), state.records.clone())
        };
        self.calendar
            .generate_calendar_month(focus.month, focus.year, &records, self.records.policy())
    }

    fn edited_date(&self) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        match &state.mode {
            ViewMode::Editing { date, .. } => Ok(date.clone()),
            ViewMode::Browsing => Err(AppError::validation("no day is being edited")),
        }
    }
}
