use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, query_as};

use super::books::{BOOK_COLUMNS, BookRecord, write_book};
use crate::domain::RepositoryError;
use crate::domain::book_items::Book;
use crate::domain::ids::{BookId, SessionId, UserId};
use crate::domain::repositories::{ProgressTransaction, SessionRepository};
use crate::domain::sessions::{ReadingSession, SessionDraft};
use crate::infrastructure::database::{DatabaseDriver, DatabasePool, DatabaseTransaction};

const SESSION_COLUMNS: &str =
    "id, user_id, book_id, session_date, pages_read, duration_minutes, notes, created_at";

#[derive(Clone)]
pub struct SqlSessionRepository {
    pool: DatabasePool,
}

impl SqlSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

#[async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn begin(&self) -> Result<Box<dyn ProgressTransaction>, RepositoryError> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        Ok(Box::new(SqlProgressTransaction { tx }))
    }

    async fn get(&self, user_id: UserId, id: SessionId) -> Result<ReadingSession, RepositoryError> {
        let query =
            format!("SELECT {SESSION_COLUMNS} FROM reading_sessions WHERE id = ? AND user_id = ?");

        let record = query_as::<_, SessionRecord>(&query)
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_session())
    }

    async fn list(
        &self,
        user_id: UserId,
        book_id: Option<BookId>,
    ) -> Result<Vec<ReadingSession>, RepositoryError> {
        let mut qb = QueryBuilder::<DatabaseDriver>::new(format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions WHERE user_id = "
        ));
        qb.push_bind(user_id.into_inner());
        if let Some(book_id) = book_id {
            qb.push(" AND book_id = ");
            qb.push_bind(book_id.into_inner());
        }
        qb.push(" ORDER BY session_date DESC, id DESC");

        let records: Vec<SessionRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(records.into_iter().map(SessionRecord::into_session).collect())
    }

    async fn delete(&self, user_id: UserId, id: SessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reading_sessions WHERE id = ? AND user_id = ?")
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

/// A session write in flight. Rolls back when dropped uncommitted.
pub struct SqlProgressTransaction {
    tx: DatabaseTransaction<'static>,
}

#[async_trait]
impl ProgressTransaction for SqlProgressTransaction {
    async fn lock_book(&mut self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError> {
        // A no-op write takes SQLite's write lock before the book is read, so
        // concurrent sessions on the same book serialize here.
        let query = format!(
            "UPDATE books SET version = version WHERE id = ? AND user_id = ? RETURNING {BOOK_COLUMNS}"
        );

        let record = query_as::<_, BookRecord>(&query)
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        record.to_domain()
    }

    async fn insert_session(
        &mut self,
        session: &SessionDraft,
    ) -> Result<ReadingSession, RepositoryError> {
        let query = format!(
            r"INSERT INTO reading_sessions
                (user_id, book_id, session_date, pages_read, duration_minutes, notes, created_at)
              VALUES (?, ?, ?, ?, ?, ?, ?)
              RETURNING {SESSION_COLUMNS}"
        );

        let record = query_as::<_, SessionRecord>(&query)
            .bind(session.user_id.into_inner())
            .bind(session.book_id.into_inner())
            .bind(session.session_date)
            .bind(session.pages_read)
            .bind(session.duration_minutes)
            .bind(&session.notes)
            .bind(Utc::now())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_err)?;

        Ok(record.into_session())
    }

    async fn save_book(&mut self, book: &Book) -> Result<Book, RepositoryError> {
        write_book(&mut *self.tx, book).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(db_err)
    }
}

#[derive(sqlx::FromRow)]
struct SessionRecord {
    id: i64,
    user_id: i64,
    book_id: i64,
    session_date: NaiveDate,
    pages_read: i32,
    duration_minutes: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl SessionRecord {
    fn into_session(self) -> ReadingSession {
        ReadingSession {
            id: SessionId::new(self.id),
            user_id: UserId::new(self.user_id),
            book_id: BookId::new(self.book_id),
            session_date: self.session_date,
            pages_read: self.pages_read,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}
