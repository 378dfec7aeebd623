use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::{SeriesId, UserId};
use crate::domain::repositories::SeriesRepository;
use crate::domain::series::{NewSeries, Series, SeriesSummary};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlSeriesRepository {
    pool: DatabasePool,
}

impl SqlSeriesRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

#[async_trait]
impl SeriesRepository for SqlSeriesRepository {
    async fn insert(&self, user_id: UserId, series: NewSeries) -> Result<Series, RepositoryError> {
        let record = query_as::<_, SeriesRecord>(
            r"INSERT INTO series (user_id, name, total_books, created_at)
              VALUES (?, ?, ?, ?)
              RETURNING id, user_id, name, total_books, created_at",
        )
        .bind(user_id.into_inner())
        .bind(&series.name)
        .bind(series.total_books)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record.into_series())
    }

    async fn get(&self, user_id: UserId, id: SeriesId) -> Result<Series, RepositoryError> {
        let record = query_as::<_, SeriesRecord>(
            "SELECT id, user_id, name, total_books, created_at FROM series WHERE id = ? AND user_id = ?",
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_series())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<SeriesSummary>, RepositoryError> {
        let records = query_as::<_, SeriesSummaryRecord>(
            r"SELECT s.id, s.user_id, s.name, s.total_books, s.created_at,
                     COUNT(b.id) AS book_count,
                     COALESCE(SUM(CASE WHEN b.status = 'read' THEN 1 ELSE 0 END), 0) AS books_read
              FROM series s
              LEFT JOIN books b ON b.series_id = s.id AND b.user_id = s.user_id
              WHERE s.user_id = ?
              GROUP BY s.id
              ORDER BY s.name COLLATE NOCASE, s.id",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(records
            .into_iter()
            .map(SeriesSummaryRecord::into_summary)
            .collect())
    }

    async fn delete(&self, user_id: UserId, id: SeriesId) -> Result<(), RepositoryError> {
        // Member books lose their series through ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM series WHERE id = ? AND user_id = ?")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SeriesRecord {
    id: i64,
    user_id: i64,
    name: String,
    total_books: Option<i32>,
    created_at: DateTime<Utc>,
}

impl SeriesRecord {
    fn into_series(self) -> Series {
        Series {
            id: SeriesId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            total_books: self.total_books,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeriesSummaryRecord {
    #[sqlx(flatten)]
    series: SeriesRecord,
    book_count: i64,
    books_read: i64,
}

impl SeriesSummaryRecord {
    fn into_summary(self) -> SeriesSummary {
        SeriesSummary {
            series: self.series.into_series(),
            book_count: u64::try_from(self.book_count).unwrap_or(0),
            books_read: u64::try_from(self.books_read).unwrap_or(0),
        }
    }
}
