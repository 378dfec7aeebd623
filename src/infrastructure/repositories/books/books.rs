use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, QueryBuilder, query_as};

use crate::domain::RepositoryError;
use crate::domain::book_items::{Book, BookDraft, BookFilter, BookFormat, BookStatus};
use crate::domain::ids::{BookId, SeriesId, UserId};
use crate::domain::progress::BookProgress;
use crate::domain::repositories::BookRepository;
use crate::infrastructure::database::{DatabaseDriver, DatabasePool};

pub(crate) const BOOK_COLUMNS: &str = "id, user_id, title, authors, isbn, genres, topics, thoughts, status, format, \
     total_pages, current_page, current_percentage, total_duration_minutes, \
     current_duration_minutes, start_date, finish_date, series_id, series_order, version, \
     created_at, updated_at";

#[derive(Clone)]
pub struct SqlBookRepository {
    pool: DatabasePool,
}

impl SqlBookRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

/// Authors, genres and topics are stored as JSON arrays of strings.
fn encode_list(values: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(values).map_err(|err| RepositoryError::unexpected(err.to_string()))
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Column values of a `BookProgress`, with unused fields at their defaults.
struct ProgressColumns {
    format: &'static str,
    total_pages: Option<i32>,
    current_page: i32,
    current_percentage: f64,
    total_duration_minutes: Option<i32>,
    current_duration_minutes: i32,
}

impl From<&BookProgress> for ProgressColumns {
    fn from(progress: &BookProgress) -> Self {
        let mut columns = Self {
            format: progress.format().as_str(),
            total_pages: None,
            current_page: 0,
            current_percentage: 0.0,
            total_duration_minutes: None,
            current_duration_minutes: 0,
        };
        match *progress {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => {
                columns.total_pages = total_pages;
                columns.current_page = current_page;
            }
            BookProgress::Ebook {
                current_percentage,
                total_pages,
            } => {
                columns.current_percentage = current_percentage;
                columns.total_pages = total_pages;
            }
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => {
                columns.total_duration_minutes = total_duration_minutes;
                columns.current_duration_minutes = current_duration_minutes;
            }
        }
        columns
    }
}

/// Writes every mutable column of `book`, bumping its version.
pub(crate) async fn write_book<'e, E>(executor: E, book: &Book) -> Result<Book, RepositoryError>
where
    E: Executor<'e, Database = DatabaseDriver>,
{
    let progress = ProgressColumns::from(&book.progress);
    let query = format!(
        r"UPDATE books SET
            title = ?, authors = ?, isbn = ?, genres = ?, topics = ?, thoughts = ?,
            status = ?, format = ?,
            total_pages = ?, current_page = ?, current_percentage = ?,
            total_duration_minutes = ?, current_duration_minutes = ?,
            start_date = ?, finish_date = ?, series_id = ?, series_order = ?,
            version = version + 1, updated_at = ?
          WHERE id = ? AND user_id = ?
          RETURNING {BOOK_COLUMNS}"
    );

    let record = query_as::<_, BookRecord>(&query)
        .bind(&book.title)
        .bind(encode_list(&book.authors)?)
        .bind(&book.isbn)
        .bind(encode_list(&book.genres)?)
        .bind(encode_list(&book.topics)?)
        .bind(&book.thoughts)
        .bind(book.status.as_str())
        .bind(progress.format)
        .bind(progress.total_pages)
        .bind(progress.current_page)
        .bind(progress.current_percentage)
        .bind(progress.total_duration_minutes)
        .bind(progress.current_duration_minutes)
        .bind(book.start_date)
        .bind(book.finish_date)
        .bind(book.series_id.map(SeriesId::into_inner))
        .bind(book.series_order)
        .bind(Utc::now())
        .bind(book.id.into_inner())
        .bind(book.user_id.into_inner())
        .fetch_optional(executor)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

    record.to_domain()
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn insert(&self, user_id: UserId, book: BookDraft) -> Result<Book, RepositoryError> {
        let now = Utc::now();
        let progress = ProgressColumns::from(&book.progress);
        let query = format!(
            r"INSERT INTO books (
                user_id, title, authors, isbn, genres, topics, thoughts, status, format,
                total_pages, current_page, current_percentage,
                total_duration_minutes, current_duration_minutes,
                start_date, finish_date, series_id, series_order, created_at, updated_at
              )
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              RETURNING {BOOK_COLUMNS}"
        );

        let record = query_as::<_, BookRecord>(&query)
            .bind(user_id.into_inner())
            .bind(&book.title)
            .bind(encode_list(&book.authors)?)
            .bind(&book.isbn)
            .bind(encode_list(&book.genres)?)
            .bind(encode_list(&book.topics)?)
            .bind(&book.thoughts)
            .bind(book.status.as_str())
            .bind(progress.format)
            .bind(progress.total_pages)
            .bind(progress.current_page)
            .bind(progress.current_percentage)
            .bind(progress.total_duration_minutes)
            .bind(progress.current_duration_minutes)
            .bind(book.start_date)
            .bind(book.finish_date)
            .bind(book.series_id.map(SeriesId::into_inner))
            .bind(book.series_order)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        record.to_domain()
    }

    async fn get(&self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ? AND user_id = ?");

        let record = query_as::<_, BookRecord>(&query)
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        record.to_domain()
    }

    async fn list(
        &self,
        user_id: UserId,
        filter: &BookFilter,
    ) -> Result<Vec<Book>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = "
        ));
        qb.push_bind(user_id.into_inner());
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            qb.push(r" AND (title LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(r" ESCAPE '\' OR EXISTS (SELECT 1 FROM json_each(books.authors) WHERE value LIKE ");
            qb.push_bind(pattern);
            qb.push(r" ESCAPE '\'))");
        }
        if let Some(genre) = &filter.genre {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(books.genres) WHERE value = ");
            qb.push_bind(genre.clone());
            qb.push(")");
        }
        if let Some(topic) = &filter.topic {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(books.topics) WHERE lower(value) = lower(");
            qb.push_bind(topic.clone());
            qb.push("))");
        }
        qb.push(" ORDER BY updated_at DESC, id DESC");

        let records: Vec<BookRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        records.into_iter().map(BookRecord::to_domain).collect()
    }

    async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ? AND user_id = ?")
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
pub(crate) struct BookRecord {
    id: i64,
    user_id: i64,
    title: String,
    authors: String,
    isbn: Option<String>,
    genres: String,
    topics: String,
    thoughts: Option<String>,
    status: String,
    format: String,
    total_pages: Option<i32>,
    current_page: i32,
    current_percentage: f64,
    total_duration_minutes: Option<i32>,
    current_duration_minutes: i32,
    start_date: Option<NaiveDate>,
    finish_date: Option<NaiveDate>,
    series_id: Option<i64>,
    series_order: Option<i32>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookRecord {
    pub(crate) fn to_domain(self) -> Result<Book, RepositoryError> {
        let status = BookStatus::from_str(&self.status).map_err(|()| {
            RepositoryError::unexpected(format!("invalid book status: {}", self.status))
        })?;
        let format = BookFormat::from_str(&self.format).map_err(|()| {
            RepositoryError::unexpected(format!("invalid book format: {}", self.format))
        })?;
        let progress = match format {
            BookFormat::Paper => BookProgress::Paper {
                total_pages: self.total_pages,
                current_page: self.current_page,
            },
            BookFormat::Ebook => BookProgress::Ebook {
                current_percentage: self.current_percentage,
                total_pages: self.total_pages,
            },
            BookFormat::Audiobook => BookProgress::Audiobook {
                total_duration_minutes: self.total_duration_minutes,
                current_duration_minutes: self.current_duration_minutes,
            },
        };

        Ok(Book {
            id: BookId::new(self.id),
            user_id: UserId::new(self.user_id),
            title: self.title,
            authors: decode_list(&self.authors),
            isbn: self.isbn,
            genres: decode_list(&self.genres),
            topics: decode_list(&self.topics),
            thoughts: self.thoughts,
            status,
            progress,
            start_date: self.start_date,
            finish_date: self.finish_date,
            series_id: self.series_id.map(SeriesId::new),
            series_order: self.series_order,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
