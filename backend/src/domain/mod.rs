//! # Domain Module
//!
//! Business logic for the habit tracker: calendar grid math, the day score
//! engine, the record save/delete/load contract, and the month view state
//! machine. Nothing in here renders anything or owns a connection; storage
//! and identity are reached through the traits in the sibling modules.

pub mod calendar;
pub mod month_view;
pub mod record_service;
pub mod scoring;

pub use calendar::{date_key, month_grid, parse_date_key, CalendarService};
pub use month_view::{LoadTicket, MonthViewService, MonthViewState, ViewMode};
pub use record_service::{index_by_date, RecordService};
pub use scoring::{
    checklist_from_score, compute_total, score_from_checklist, CategoryInput, CategorySpec,
    ScoringPolicy, SUB_SCORE_MAX,
};
