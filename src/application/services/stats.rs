//! Read-only statistics over a user's books and sessions.
//!
//! Session-backed figures are optional: when a session query fails the
//! service logs a warning and reports zeros instead of failing the request.
//! Book-backed figures always propagate their errors.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::application::errors::AppError;
use crate::domain::activity::{ActivityCalendar, YearlyBreakdown, month_range, validate_year};
use crate::domain::genres::GenreBreakdown;
use crate::domain::ids::UserId;
use crate::domain::period::{
    DailyActivity, DateRange, PeriodInputs, PeriodStats, SessionMinutes, StatsPeriod, fill_daily,
};
use crate::domain::repositories::StatsRepository;
use crate::domain::streak::{StreakOverview, current_streak, lookback_start};
use crate::domain::{InvalidRange, RepositoryError, today};

#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsRepository>,
}

/// Falls back to the default value when an optional read fails.
fn degrade<T: Default>(result: Result<T, RepositoryError>, what: &str, user_id: UserId) -> T {
    result.unwrap_or_else(|err| {
        warn!(error = %err, %user_id, what, "session statistics unavailable, reporting empty");
        T::default()
    })
}

impl StatsService {
    pub fn new(stats: Arc<dyn StatsRepository>) -> Self {
        Self { stats }
    }

    #[tracing::instrument(skip(self))]
    pub async fn period_stats(
        &self,
        user_id: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<PeriodStats, AppError> {
        let start = Instant::now();
        let today = today();
        let period = StatsPeriod::resolve(from, to, today)?;
        let range = period.range().copied();

        let (counts, finished, minutes, dates, daily) = tokio::join!(
            self.stats.status_counts(user_id),
            self.stats.finished_totals(user_id, range),
            self.stats.session_minutes(user_id, range),
            self.stats.session_dates(user_id, lookback_start(today)),
            async {
                match range.filter(DateRange::has_daily_breakdown) {
                    Some(range) => self.stats.daily_activity(user_id, range).await,
                    None => Ok(Vec::new()),
                }
            },
        );

        let dates: HashSet<NaiveDate> = degrade(dates, "session dates", user_id);
        let inputs = PeriodInputs {
            counts: counts?,
            finished: finished?,
            sessions: degrade::<SessionMinutes>(minutes, "session minutes", user_id),
            streak: current_streak(&dates, today),
            daily_rows: degrade(daily, "daily activity", user_id),
        };

        let stats = PeriodStats::assemble(&period, inputs, today);
        info!(
            duration_ms = start.elapsed().as_millis(),
            %user_id,
            ranged = range.is_some(),
            "period stats computed"
        );
        Ok(stats)
    }

    pub async fn streak(&self, user_id: UserId) -> Result<u32, AppError> {
        let today = today();
        let dates = degrade(
            self.stats
                .session_dates(user_id, lookback_start(today))
                .await,
            "session dates",
            user_id,
        );
        Ok(current_streak(&dates, today))
    }

    pub async fn streak_overview(
        &self,
        user_id: UserId,
        days: u32,
    ) -> Result<StreakOverview, AppError> {
        let today = today();
        let dates = degrade(
            self.stats
                .session_dates(user_id, lookback_start(today))
                .await,
            "session dates",
            user_id,
        );
        Ok(StreakOverview::build(&dates, today, days))
    }

    /// One entry per day from `from` through `to` (default today).
    pub async fn daily_breakdown(
        &self,
        user_id: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyActivity>, AppError> {
        let period = StatsPeriod::resolve(from, to, today())?;
        let Some(range) = period.range().copied() else {
            return Err(InvalidRange::new("daily breakdown requires a from date").into());
        };
        let range = range.for_daily_breakdown()?;
        let rows = degrade(
            self.stats.daily_activity(user_id, range).await,
            "daily activity",
            user_id,
        );
        Ok(fill_daily(&range, &rows))
    }

    /// Genre and topic counts over books finished in the period.
    pub async fn genres(
        &self,
        user_id: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<GenreBreakdown, AppError> {
        let period = StatsPeriod::resolve(from, to, today())?;
        Ok(self
            .stats
            .tag_counts(user_id, period.range().copied())
            .await?)
    }

    pub async fn yearly(
        &self,
        user_id: UserId,
        year: i32,
        compare: bool,
    ) -> Result<YearlyBreakdown, AppError> {
        let year = validate_year(year)?;
        let rows = self.stats.finished_per_month(user_id, year).await?;
        let previous = if compare {
            Some(self.stats.finished_per_month(user_id, year - 1).await?)
        } else {
            None
        };
        Ok(YearlyBreakdown::build(year, &rows, previous.as_deref()))
    }

    pub async fn calendar(
        &self,
        user_id: UserId,
        year: i32,
        month: u32,
    ) -> Result<ActivityCalendar, AppError> {
        let today = today();
        let range: DateRange = month_range(year, month)?;
        let (days, dates) = tokio::join!(
            self.stats.calendar_days(user_id, range),
            self.stats.session_dates(user_id, lookback_start(today)),
        );
        let days = degrade(days, "calendar days", user_id);
        let dates = degrade(dates, "session dates", user_id);
        Ok(ActivityCalendar::build(
            &range,
            days,
            current_streak(&dates, today),
        ))
    }
}
