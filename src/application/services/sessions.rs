use std::sync::Arc;

use tracing::{debug, info};

use crate::application::errors::AppError;
use crate::domain::ids::{BookId, SessionId, UserId};
use crate::domain::repositories::SessionRepository;
use crate::domain::sessions::{NewSession, ReadingSession, SessionResult, plan_session};
use crate::domain::today;

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Logs a session and advances its book in one transaction.
    ///
    /// The book row is locked before its progress is read, so concurrent
    /// sessions on one book apply in sequence. Any failure rolls back both the
    /// session row and the book update.
    pub async fn record(
        &self,
        user_id: UserId,
        input: NewSession,
    ) -> Result<SessionResult, AppError> {
        let mut tx = self.sessions.begin().await?;
        let book = tx.lock_book(user_id, input.book_id).await?;
        let plan = plan_session(&book, &input, today())?;
        debug!(
            %user_id,
            book_id = %book.id,
            pages_read = plan.session.pages_read,
            duration_minutes = ?plan.session.duration_minutes,
            "session planned"
        );

        let session = tx.insert_session(&plan.session).await?;
        let book = tx.save_book(&plan.book).await?;
        tx.commit().await?;

        info!(
            %user_id,
            book_id = %book.id,
            session_id = %session.id,
            just_completed = plan.just_completed,
            "session recorded"
        );
        Ok(SessionResult {
            session,
            book: book.into(),
            just_completed: plan.just_completed,
        })
    }

    pub async fn list(
        &self,
        user_id: UserId,
        book_id: Option<BookId>,
    ) -> Result<Vec<ReadingSession>, AppError> {
        Ok(self.sessions.list(user_id, book_id).await?)
    }

    pub async fn get(&self, user_id: UserId, id: SessionId) -> Result<ReadingSession, AppError> {
        Ok(self.sessions.get(user_id, id).await?)
    }

    /// Removes the session row only; book progress stays where it is.
    pub async fn delete(&self, user_id: UserId, id: SessionId) -> Result<(), AppError> {
        self.sessions.delete(user_id, id).await?;
        info!(%user_id, session_id = %id, "session deleted");
        Ok(())
    }
}
