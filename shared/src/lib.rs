use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One habit record per (owner, civil date).
///
/// The natural key is the (owner_id, date) pair; the persistence layer enforces
/// uniqueness through upsert conflict resolution on that composite key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Civil date in `YYYY-MM-DD` format, no time or timezone component
    pub date: String,
    /// ID of the authenticated user this record belongs to
    pub owner_id: String,
    /// Category name mapped to its integer sub-score (0-10 each)
    pub category_scores: BTreeMap<String, u32>,
    /// Optional free-text annotation for the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Server-assigned timestamp, set on every write, never by the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl DailyRecord {
    /// Sum of all category sub-scores for this record
    pub fn total(&self) -> u32 {
        self.category_scores.values().sum()
    }
}

/// Classification tier derived from a daily total via two threshold cuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTier {
    /// Total above the high cut
    Top,
    /// Total above the low cut but not the high cut
    Ok,
    /// Everything else
    Oops,
}

impl ScoreTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreTier::Top => "Top",
            ScoreTier::Ok => "Ok",
            ScoreTier::Oops => "Oops",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarDayType {
    /// Overflow day from the previous month, shown to complete the first week
    OverflowBefore,
    /// Actual day within the focused month
    MonthDay,
    /// Overflow day from the next month, shown to complete the last week
    OverflowAfter,
}

/// Represents a calendar month view with its associated habit data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: u32,
    /// Full-week grid, Monday-start, always a multiple of 7 days
    pub days: Vec<CalendarDay>,
}

/// Represents a single day cell in the calendar grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Date key in `YYYY-MM-DD` format
    pub date: String,
    /// Day of month (1-31)
    pub day: u32,
    pub day_type: CalendarDayType,
    /// Whether this cell is today's civil date
    pub is_today: bool,
    /// The stored record for this date, if any. `None` means "no record",
    /// which renders differently from a record of all-zero scores.
    pub record: Option<DailyRecord>,
    /// Derived total, present only when a record exists
    pub total: Option<u32>,
    /// Derived classification tier, present only when a record exists
    pub tier: Option<ScoreTier>,
}

/// Represents the current focus date for calendar navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarFocusDate {
    pub month: u32,
    pub year: u32,
}

impl Default for CalendarFocusDate {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year() as u32,
        }
    }
}

/// Current date information for display and grid highlighting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentDateResponse {
    pub month: u32,
    pub year: u32,
    pub day: u32,
    pub formatted_date: String,
    pub iso_date: String,
}

/// Request to create or overwrite the record for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDayScoreRequest {
    /// Civil date key in `YYYY-MM-DD` format
    pub date: String,
    /// Category name mapped to its sub-score; validated against the active policy
    pub category_scores: BTreeMap<String, u32>,
    /// Optional free-text annotation
    pub notes: Option<String>,
}

/// An authenticated session supplied by the identity collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier of the authenticated user
    pub owner_id: String,
    pub email: Option<String>,
    /// Bearer token presented to the persistence collaborator
    pub access_token: String,
}

/// Email/password credentials for sign-in and sign-up pass-throughs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
