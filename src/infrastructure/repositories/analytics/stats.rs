use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::activity::CalendarDay;
use crate::domain::book_items::{BookFormat, BookStatus};
use crate::domain::genres::{GenreBreakdown, TagCount};
use crate::domain::goals::{DEFAULT_BOOK_PAGES, FinishedBook, MINUTES_PER_PAGE};
use crate::domain::ids::{BookId, UserId};
use crate::domain::period::{
    DailyActivity, DateRange, FinishedTotals, SessionMinutes, StatusCounts,
};
use crate::domain::repositories::StatsRepository;
use crate::infrastructure::database::{DatabaseDriver, DatabasePool};

// --- Internal record types ---

#[derive(sqlx::FromRow)]
struct StatusCount {
    status: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct FinishedRow {
    read: i64,
    total_pages: i64,
    estimated_pages: i64,
    listen_minutes: i64,
    avg_days: Option<f64>,
    earliest_finish: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct MinutesRow {
    read_minutes: i64,
    listen_minutes: i64,
}

#[derive(sqlx::FromRow)]
struct DailyRow {
    date: NaiveDate,
    read_minutes: i64,
    listen_minutes: i64,
    pages: i64,
}

#[derive(sqlx::FromRow)]
struct CalendarRow {
    date: NaiveDate,
    pages: i64,
    minutes: i64,
    sessions: i64,
}

#[derive(sqlx::FromRow)]
struct MonthCountRow {
    month: i64,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct FinishedBookRow {
    id: i64,
    title: String,
    format: String,
    finish_date: NaiveDate,
    total_pages: Option<i32>,
    total_duration_minutes: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct TagCountRow {
    name: String,
    count: i64,
}

// --- Helpers ---

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn push_range_filter(
    qb: &mut QueryBuilder<'_, DatabaseDriver>,
    range: Option<&DateRange>,
    column: &str,
) {
    if let Some(range) = range {
        qb.push(format!(" AND {column} >= "));
        qb.push_bind(range.from());
        qb.push(format!(" AND {column} <= "));
        qb.push_bind(range.to());
    }
}

/// Counts the values of one JSON array column across finished books, ignoring
/// case.
async fn count_finished_tags(
    pool: &DatabasePool,
    user_id: UserId,
    range: Option<&DateRange>,
    column: &str,
) -> Result<Vec<TagCount>, RepositoryError> {
    let mut qb = QueryBuilder::<DatabaseDriver>::new(format!(
        r"SELECT MIN(j.value) AS name, COUNT(*) AS count
          FROM books b, json_each(b.{column}) j
          WHERE b.status = 'read' AND trim(j.value) != '' AND b.user_id = "
    ));
    qb.push_bind(user_id.into_inner());
    push_range_filter(&mut qb, range, "b.finish_date");
    qb.push(" GROUP BY lower(trim(j.value))");

    let rows: Vec<TagCountRow> = qb
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| TagCount {
            name: r.name,
            count: count(r.count),
        })
        .collect())
}

fn push_year_filter(qb: &mut QueryBuilder<'_, DatabaseDriver>, year: i32, column: &str) {
    qb.push(format!(" AND CAST(strftime('%Y', {column}) AS INTEGER) = "));
    qb.push_bind(year);
}

// --- Repository ---

#[derive(Clone)]
pub struct SqlStatsRepository {
    pool: DatabasePool,
}

impl SqlStatsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for SqlStatsRepository {
    async fn status_counts(&self, user_id: UserId) -> Result<StatusCounts, RepositoryError> {
        let records = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM books WHERE user_id = ? GROUP BY status",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let rows = records
            .into_iter()
            .map(|r| {
                BookStatus::from_str(&r.status)
                    .map(|status| (status, count(r.count)))
                    .map_err(|()| {
                        RepositoryError::unexpected(format!("invalid book status: {}", r.status))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StatusCounts::from_rows(rows))
    }

    async fn finished_totals(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<FinishedTotals, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(format!(
            r"SELECT COUNT(*) AS read,
                     COALESCE(SUM(total_pages), 0) AS total_pages,
                     COALESCE(SUM(CASE
                         WHEN total_pages > 0 THEN total_pages
                         WHEN format = 'audiobook'
                             THEN CAST(ROUND(COALESCE(total_duration_minutes, 0) / {MINUTES_PER_PAGE:.1})
                                       AS INTEGER)
                         ELSE {DEFAULT_BOOK_PAGES}
                     END), 0) AS estimated_pages,
                     COALESCE(SUM(CASE WHEN format = 'audiobook' THEN total_duration_minutes END), 0)
                         AS listen_minutes,
                     AVG(CASE WHEN start_date IS NOT NULL AND finish_date IS NOT NULL
                                   AND finish_date >= start_date
                              THEN julianday(finish_date) - julianday(start_date) END) AS avg_days,
                     MIN(finish_date) AS earliest_finish
              FROM books
              WHERE status = 'read' AND user_id = "
        ));
        qb.push_bind(user_id.into_inner());
        push_range_filter(&mut qb, range.as_ref(), "finish_date");

        let row: FinishedRow = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(FinishedTotals {
            read: count(row.read),
            total_pages: row.total_pages,
            estimated_pages: row.estimated_pages,
            listen_minutes: row.listen_minutes,
            avg_days_to_finish: row.avg_days,
            earliest_finish: row.earliest_finish,
        })
    }

    async fn session_minutes(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<SessionMinutes, RepositoryError> {
        // Listening sessions on finished audiobooks are already covered by the
        // book's total duration.
        let mut qb = QueryBuilder::<DatabaseDriver>::new(
            r"SELECT COALESCE(SUM(CASE WHEN b.format != 'audiobook' THEN s.duration_minutes END), 0)
                         AS read_minutes,
                     COALESCE(SUM(CASE WHEN b.format = 'audiobook' AND b.status != 'read'
                                       THEN s.duration_minutes END), 0) AS listen_minutes
              FROM reading_sessions s
              JOIN books b ON b.id = s.book_id
              WHERE s.user_id = ",
        );
        qb.push_bind(user_id.into_inner());
        push_range_filter(&mut qb, range.as_ref(), "s.session_date");

        let row: MinutesRow = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(SessionMinutes {
            read_minutes: row.read_minutes,
            listen_minutes: row.listen_minutes,
        })
    }

    async fn session_dates(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, RepositoryError> {
        let dates: Vec<NaiveDate> = query_scalar(
            "SELECT DISTINCT session_date FROM reading_sessions WHERE user_id = ? AND session_date >= ?",
        )
        .bind(user_id.into_inner())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(dates.into_iter().collect())
    }

    async fn daily_activity(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<DailyActivity>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(
            r"SELECT s.session_date AS date,
                     COALESCE(SUM(CASE WHEN b.format != 'audiobook' THEN s.duration_minutes END), 0)
                         AS read_minutes,
                     COALESCE(SUM(CASE WHEN b.format = 'audiobook' THEN s.duration_minutes END), 0)
                         AS listen_minutes,
                     COALESCE(SUM(s.pages_read), 0) AS pages
              FROM reading_sessions s
              JOIN books b ON b.id = s.book_id
              WHERE s.user_id = ",
        );
        qb.push_bind(user_id.into_inner());
        push_range_filter(&mut qb, Some(&range), "s.session_date");
        qb.push(" GROUP BY s.session_date ORDER BY s.session_date");

        let rows: Vec<DailyRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| DailyActivity {
                date: r.date,
                read_minutes: r.read_minutes,
                listen_minutes: r.listen_minutes,
                pages: r.pages,
            })
            .collect())
    }

    async fn finished_per_month(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Vec<(u32, u64)>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(
            r"SELECT CAST(strftime('%m', finish_date) AS INTEGER) AS month, COUNT(*) AS count
              FROM books
              WHERE status = 'read' AND finish_date IS NOT NULL AND user_id = ",
        );
        qb.push_bind(user_id.into_inner());
        push_year_filter(&mut qb, year, "finish_date");
        qb.push(" GROUP BY month ORDER BY month");

        let rows: Vec<MonthCountRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|r| u32::try_from(r.month).ok().map(|m| (m, count(r.count))))
            .collect())
    }

    async fn calendar_days(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<CalendarDay>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(
            r"SELECT session_date AS date,
                     COALESCE(SUM(pages_read), 0) AS pages,
                     COALESCE(SUM(duration_minutes), 0) AS minutes,
                     COUNT(*) AS sessions
              FROM reading_sessions
              WHERE user_id = ",
        );
        qb.push_bind(user_id.into_inner());
        push_range_filter(&mut qb, Some(&range), "session_date");
        qb.push(" GROUP BY session_date ORDER BY session_date");

        let rows: Vec<CalendarRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| CalendarDay {
                date: r.date,
                pages: r.pages,
                minutes: r.minutes,
                sessions: count(r.sessions),
            })
            .collect())
    }

    async fn finished_books(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Vec<FinishedBook>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(
            r"SELECT id, title, format, finish_date, total_pages, total_duration_minutes
              FROM books
              WHERE status = 'read' AND finish_date IS NOT NULL AND user_id = ",
        );
        qb.push_bind(user_id.into_inner());
        push_year_filter(&mut qb, year, "finish_date");
        qb.push(" ORDER BY finish_date DESC, id DESC");

        let rows: Vec<FinishedBookRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                let format = BookFormat::from_str(&r.format).map_err(|()| {
                    RepositoryError::unexpected(format!("invalid book format: {}", r.format))
                })?;
                Ok(FinishedBook {
                    id: BookId::new(r.id),
                    title: r.title,
                    format,
                    finish_date: r.finish_date,
                    total_pages: r.total_pages,
                    total_duration_minutes: r.total_duration_minutes,
                })
            })
            .collect()
    }

    async fn tag_counts(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<GenreBreakdown, RepositoryError> {
        let (genres, topics) = tokio::try_join!(
            count_finished_tags(&self.pool, user_id, range.as_ref(), "genres"),
            count_finished_tags(&self.pool, user_id, range.as_ref(), "topics"),
        )?;
        Ok(GenreBreakdown::new(genres, topics))
    }
}
