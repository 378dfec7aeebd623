//! Date-ranged and all-time reading statistics.
//!
//! Status counts describe the library as it is now and are never range-filtered.
//! Book-level figures are filtered by finish date; session-level figures by
//! session date. The streak is always current.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::books::books::BookStatus;
use crate::domain::errors::InvalidRange;

/// Longest range, in days, that gets a per-day breakdown.
pub const MAX_DAILY_DAYS: i64 = 366;

/// Inclusive calendar date range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, InvalidRange> {
        if from > to {
            return Err(InvalidRange::new(format!(
                "from ({from}) must not be after to ({to})"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Every calendar day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |day| *day <= self.to)
    }

    pub fn months_spanned(&self) -> u32 {
        months_spanned(self.from, self.to)
    }

    /// Number of calendar days in the range, counting both ends.
    pub fn day_count(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn has_daily_breakdown(&self) -> bool {
        self.day_count() <= MAX_DAILY_DAYS
    }

    /// The range itself, if it is short enough for a per-day breakdown.
    pub fn for_daily_breakdown(self) -> Result<Self, InvalidRange> {
        if self.has_daily_breakdown() {
            Ok(self)
        } else {
            Err(InvalidRange::new(format!(
                "daily breakdown covers at most {MAX_DAILY_DAYS} days, got {}",
                self.day_count()
            )))
        }
    }
}

/// Period a statistics request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    AllTime,
    Range(DateRange),
}

impl StatsPeriod {
    /// Resolves optional query bounds. A lone `from` runs to `today`; a lone `to`
    /// is rejected.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, InvalidRange> {
        match (from, to) {
            (None, None) => Ok(StatsPeriod::AllTime),
            (Some(from), Some(to)) => DateRange::new(from, to).map(StatsPeriod::Range),
            (Some(from), None) => DateRange::new(from, today).map(StatsPeriod::Range),
            (None, Some(_)) => Err(InvalidRange::new("to requires a from date")),
        }
    }

    pub fn range(&self) -> Option<&DateRange> {
        match self {
            StatsPeriod::AllTime => None,
            StatsPeriod::Range(range) => Some(range),
        }
    }
}

/// Number of calendar months touched by `from..=to`, at least 1.
pub fn months_spanned(from: NaiveDate, to: NaiveDate) -> u32 {
    let start = i64::from(from.year()) * 12 + i64::from(from.month0());
    let end = i64::from(to.year()) * 12 + i64::from(to.month0());
    u32::try_from(end - start + 1).unwrap_or(1).max(1)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn books_per_month(read: u64, months: u32) -> f64 {
    round_one_decimal(read as f64 / f64::from(months.max(1)))
}

/// Current number of books per status, over the whole library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub want_to_read: u64,
    pub up_next: u64,
    pub reading: u64,
    pub read: u64,
}

impl StatusCounts {
    pub fn from_rows(rows: impl IntoIterator<Item = (BookStatus, u64)>) -> Self {
        let mut counts = Self::default();
        for (status, count) in rows {
            match status {
                BookStatus::WantToRead => counts.want_to_read += count,
                BookStatus::UpNext => counts.up_next += count,
                BookStatus::Reading => counts.reading += count,
                BookStatus::Read => counts.read += count,
            }
        }
        counts
    }
}

/// Book-level totals over finished books, filtered by finish date when ranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishedTotals {
    pub read: u64,
    pub total_pages: i64,
    /// Pages across all formats, estimated the same way goal progress is.
    pub estimated_pages: i64,
    /// Sum of total durations of finished audiobooks.
    pub listen_minutes: i64,
    pub avg_days_to_finish: Option<f64>,
    pub earliest_finish: Option<NaiveDate>,
}

/// Session-level minute sums, filtered by session date when ranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMinutes {
    /// Sessions on paper and ebook books.
    pub read_minutes: i64,
    /// Sessions on audiobooks that are not yet read.
    pub listen_minutes: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub read_minutes: i64,
    pub listen_minutes: i64,
    pub pages: i64,
}

impl DailyActivity {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }
}

/// One entry per day of `range`, taking activity from `rows` where present.
pub fn fill_daily(range: &DateRange, rows: &[DailyActivity]) -> Vec<DailyActivity> {
    let mut by_date: HashMap<NaiveDate, DailyActivity> = HashMap::with_capacity(rows.len());
    for row in rows.iter().filter(|row| range.contains(row.date)) {
        let day = by_date
            .entry(row.date)
            .or_insert_with(|| DailyActivity::empty(row.date));
        day.read_minutes += row.read_minutes;
        day.listen_minutes += row.listen_minutes;
        day.pages += row.pages;
    }

    range
        .days()
        .map(|date| {
            by_date
                .remove(&date)
                .unwrap_or_else(|| DailyActivity::empty(date))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub want_to_read: u64,
    pub up_next: u64,
    pub reading: u64,
    pub read: u64,
    pub total_pages: i64,
    pub estimated_pages: i64,
    pub read_minutes: i64,
    pub listen_minutes: i64,
    pub avg_days_to_finish: Option<f64>,
    pub books_per_month: f64,
    pub streak: u32,
    /// Present only for ranged requests no longer than `MAX_DAILY_DAYS`.
    pub daily: Option<Vec<DailyActivity>>,
}

/// Inputs gathered from storage for one period.
#[derive(Debug, Clone, Default)]
pub struct PeriodInputs {
    pub counts: StatusCounts,
    pub finished: FinishedTotals,
    pub sessions: SessionMinutes,
    pub streak: u32,
    pub daily_rows: Vec<DailyActivity>,
}

impl PeriodStats {
    pub fn assemble(period: &StatsPeriod, inputs: PeriodInputs, today: NaiveDate) -> Self {
        let PeriodInputs {
            counts,
            finished,
            sessions,
            streak,
            daily_rows,
        } = inputs;

        let (read, months, daily) = match period {
            StatsPeriod::Range(range) => (
                finished.read,
                range.months_spanned(),
                range
                    .has_daily_breakdown()
                    .then(|| fill_daily(range, &daily_rows)),
            ),
            StatsPeriod::AllTime => {
                let months = finished
                    .earliest_finish
                    .map_or(1, |first| months_spanned(first.min(today), today));
                (counts.read, months, None)
            }
        };

        Self {
            from: period.range().map(DateRange::from),
            to: period.range().map(DateRange::to),
            want_to_read: counts.want_to_read,
            up_next: counts.up_next,
            reading: counts.reading,
            read,
            total_pages: finished.total_pages,
            estimated_pages: finished.estimated_pages,
            read_minutes: sessions.read_minutes,
            listen_minutes: finished.listen_minutes + sessions.listen_minutes,
            avg_days_to_finish: finished.avg_days_to_finish.map(round_one_decimal),
            books_per_month: books_per_month(read, months),
            streak,
            daily,
        }
    }
}
