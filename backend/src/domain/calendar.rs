//! Calendar domain logic for the habit tracker.
//!
//! This module contains the month grid builder and all calendar navigation
//! business logic. The UI should only handle presentation concerns; date math
//! and grid assembly live here.

use crate::domain::scoring::ScoringPolicy;
use crate::error::{AppError, AppResult};
use chrono::{Datelike, Days, Local, NaiveDate};
use log::debug;
use shared::{
    CalendarDay, CalendarDayType, CalendarFocusDate, CalendarMonth, CurrentDateResponse,
    DailyRecord,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canonical civil date key format used at every boundary
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a civil date as its canonical `YYYY-MM-DD` key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a canonical `YYYY-MM-DD` key back into a civil date
pub fn parse_date_key(key: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|_| AppError::InvalidDate(key.to_string()))
}

/// Build the fixed matrix of dates shown for the month containing `reference`.
///
/// The sequence starts on the Monday on/before the first of the month and ends
/// on the Sunday on/after the last day, so its length is always a multiple of
/// seven. Pure and deterministic; overflow membership is derivable by month
/// comparison.
pub fn month_grid(reference: NaiveDate) -> Vec<NaiveDate> {
    let first_of_month = reference.with_day(1).unwrap_or(reference);
    let last_of_month = first_of_month
        .checked_add_days(Days::new(
            days_in_month(first_of_month.month(), first_of_month.year()) as u64 - 1,
        ))
        .unwrap_or(first_of_month);

    let back = first_of_month.weekday().num_days_from_monday() as u64;
    let forward = 6 - last_of_month.weekday().num_days_from_monday() as u64;
    let grid_start = first_of_month
        .checked_sub_days(Days::new(back))
        .unwrap_or(first_of_month);
    let grid_end = last_of_month
        .checked_add_days(Days::new(forward))
        .unwrap_or(last_of_month);

    let len = (grid_end - grid_start).num_days() as usize + 1;
    grid_start.iter_days().take(len).collect()
}

/// Get the number of days in a given month and year
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Check if a year is a leap year
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Get the human-readable name for a month number
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Invalid Month",
    }
}

/// Calendar service that handles navigation state and month view assembly
#[derive(Clone)]
pub struct CalendarService {
    /// Current focus date for calendar navigation (month/year only).
    /// Kept in memory, never persisted.
    current_focus_date: Arc<Mutex<CalendarFocusDate>>,
}

impl CalendarService {
    pub fn new() -> Self {
        Self {
            current_focus_date: Arc::new(Mutex::new(CalendarFocusDate::default())),
        }
    }

    /// Assemble a month view: one cell per grid date, with the stored record
    /// (if any) attached and its total/tier derived through the policy.
    ///
    /// A date missing from `records` stays empty; a record of all-zero scores
    /// still carries a total of 0 and an Oops tier. The two render differently.
    pub fn generate_calendar_month(
        &self,
        month: u32,
        year: u32,
        records: &HashMap<String, DailyRecord>,
        policy: &ScoringPolicy,
    ) -> AppResult<CalendarMonth> {
        let reference = NaiveDate::from_ymd_opt(year as i32, month, 1)
            .ok_or_else(|| AppError::InvalidDate(format!("{:04}-{:02}-01", year, month)))?;
        let grid = month_grid(reference);
        let today = Local::now().date_naive();

        debug!(
            "generating calendar for {}/{} ({} grid days, {} records)",
            month,
            year,
            grid.len(),
            records.len()
        );

        let days = grid
            .into_iter()
            .map(|date| {
                let key = date_key(date);
                let record = records.get(&key).cloned();
                let total = record.as_ref().map(|r| r.total());
                let tier = total.map(|t| policy.classify(t));
                let day_type = if date.month() == month && date.year() == year as i32 {
                    CalendarDayType::MonthDay
                } else if date < reference {
                    CalendarDayType::OverflowBefore
                } else {
                    CalendarDayType::OverflowAfter
                };
                CalendarDay {
                    date: key,
                    day: date.day(),
                    day_type,
                    is_today: date == today,
                    record,
                    total,
                    tier,
                }
            })
            .collect();

        Ok(CalendarMonth { month, year, days })
    }

    /// Navigate to the previous month
    pub fn previous_month(&self, current_month: u32, current_year: u32) -> (u32, u32) {
        if current_month == 1 {
            (12, current_year - 1)
        } else {
            (current_month - 1, current_year)
        }
    }

    /// Navigate to the next month
    pub fn next_month(&self, current_month: u32, current_year: u32) -> (u32, u32) {
        if current_month == 12 {
            (1, current_year + 1)
        } else {
            (current_month + 1, current_year)
        }
    }

    /// Get current date information
    pub fn get_current_date(&self) -> CurrentDateResponse {
        let now = Local::now();
        let month = now.month();
        let year = now.year() as u32;
        let day = now.day();

        CurrentDateResponse {
            month,
            year,
            day,
            formatted_date: format!("{} {}, {}", month_name(month), day, year),
            iso_date: format!("{:04}-{:02}-{:02}", year, month, day),
        }
    }

    /// Get the current focus date for calendar navigation
    pub fn get_focus_date(&self) -> CalendarFocusDate {
        self.current_focus_date.lock().unwrap().clone()
    }

    /// Set the focus date for calendar navigation
    pub fn set_focus_date(&self, month: u32, year: u32) -> AppResult<CalendarFocusDate> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!(
                "invalid month: {}. Must be between 1 and 12",
                month
            )));
        }

        let new_focus_date = CalendarFocusDate { month, year };
        {
            let mut focus_date = self.current_focus_date.lock().unwrap();
            *focus_date = new_focus_date.clone();
        }
        Ok(new_focus_date)
    }

    /// Navigate the focus to the previous month
    pub fn navigate_previous_month(&self) -> CalendarFocusDate {
        let current = self.get_focus_date();
        let (month, year) = self.previous_month(current.month, current.year);
        // previous_month always yields a valid month
        self.set_focus_date(month, year).unwrap_or(current)
    }

    /// Navigate the focus to the next month
    pub fn navigate_next_month(&self) -> CalendarFocusDate {
        let current = self.get_focus_date();
        let (month, year) = self.next_month(current.month, current.year);
        self.set_focus_date(month, year).unwrap_or(current)
    }

    /// Reset the focus to the month containing today
    pub fn navigate_today(&self) -> CalendarFocusDate {
        let current = self.get_focus_date();
        let today = CalendarFocusDate::default();
        self.set_focus_date(today.month, today.year).unwrap_or(current)
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
