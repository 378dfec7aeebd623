use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::analytics::period::DateRange;
use crate::domain::errors::ValidationError;

/// Years accepted by the yearly, calendar and goal views. Dates are stored as
/// `YYYY-MM-DD` text, so anything outside four digits cannot match a row.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::new(format!(
            "year {year} is out of range ({}-{})",
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: u32,
    pub count: u64,
}

/// Twelve monthly counts from sparse `(month, count)` rows.
pub fn monthly_counts(rows: &[(u32, u64)]) -> Vec<MonthCount> {
    (1..=12)
        .map(|month| MonthCount {
            month,
            count: rows
                .iter()
                .filter(|(m, _)| *m == month)
                .map(|(_, count)| count)
                .sum(),
        })
        .collect()
}

/// Books finished per month of a year, optionally alongside the year before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyBreakdown {
    pub year: i32,
    pub total_read: u64,
    pub months: Vec<MonthCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PreviousYear>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousYear {
    pub year: i32,
    pub total_read: u64,
    pub months: Vec<MonthCount>,
}

impl YearlyBreakdown {
    pub fn build(year: i32, rows: &[(u32, u64)], previous_rows: Option<&[(u32, u64)]>) -> Self {
        let months = monthly_counts(rows);
        let previous = previous_rows.map(|rows| {
            let months = monthly_counts(rows);
            PreviousYear {
                year: year.saturating_sub(1),
                total_read: months.iter().map(|m| m.count).sum(),
                months,
            }
        });
        Self {
            year,
            total_read: months.iter().map(|m| m.count).sum(),
            months,
            previous,
        }
    }
}

/// Whole calendar month as a date range.
pub fn month_range(year: i32, month: u32) -> Result<DateRange, ValidationError> {
    let year = validate_year(year)?;
    let invalid = || ValidationError::new(format!("invalid month {year}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    DateRange::new(first, last).map_err(|err| ValidationError::new(err.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub pages: i64,
    pub minutes: i64,
    pub sessions: u64,
}

/// Days with at least one session in a calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub total_sessions: u64,
    pub days_read: u64,
    pub streak: u32,
}

impl ActivityCalendar {
    pub fn build(range: &DateRange, mut days: Vec<CalendarDay>, streak: u32) -> Self {
        days.retain(|day| range.contains(day.date) && day.sessions > 0);
        days.sort_by_key(|day| day.date);
        Self {
            year: range.from().year(),
            month: range.from().month(),
            total_sessions: days.iter().map(|d| d.sessions).sum(),
            days_read: days.len() as u64,
            days,
            streak,
        }
    }
}
