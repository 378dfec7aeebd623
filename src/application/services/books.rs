use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::book_items::{BookFilter, BookWithProgress, NewBook, UpdateBook};
use crate::domain::errors::RepositoryError;
use crate::domain::ids::{BookId, SeriesId, UserId};
use crate::domain::repositories::{BookRepository, SeriesRepository, SessionRepository};
use crate::domain::tags::BookTags;
use crate::domain::today;

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
    series: Arc<dyn SeriesRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BookRepository>,
        series: Arc<dyn SeriesRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            books,
            series,
            sessions,
        }
    }

    pub async fn create(
        &self,
        user_id: UserId,
        new: NewBook,
    ) -> Result<BookWithProgress, AppError> {
        if let Some(series_id) = new.series_id {
            self.ensure_series(user_id, series_id).await?;
        }
        let draft = new.into_draft(today())?;
        let book = self.books.insert(user_id, draft).await?;
        info!(%user_id, book_id = %book.id, format = book.format().as_str(), "book created");
        Ok(book.into())
    }

    pub async fn list(
        &self,
        user_id: UserId,
        filter: BookFilter,
    ) -> Result<Vec<BookWithProgress>, AppError> {
        let books = self.books.list(user_id, &filter.normalized()).await?;
        Ok(books.into_iter().map(BookWithProgress::from).collect())
    }

    /// Genres, topics and authors in use across the user's library.
    pub async fn tags(&self, user_id: UserId) -> Result<BookTags, AppError> {
        let books = self.books.list(user_id, &BookFilter::default()).await?;
        Ok(BookTags::collect(&books))
    }

    pub async fn get(&self, user_id: UserId, id: BookId) -> Result<BookWithProgress, AppError> {
        Ok(self.books.get(user_id, id).await?.into())
    }

    /// Applies a partial edit under the same row lock a session write takes.
    pub async fn update(
        &self,
        user_id: UserId,
        id: BookId,
        changes: UpdateBook,
    ) -> Result<BookWithProgress, AppError> {
        if let Some(Some(series_id)) = changes.series_id {
            self.ensure_series(user_id, series_id).await?;
        }

        let mut tx = self.sessions.begin().await?;
        let mut book = tx.lock_book(user_id, id).await?;
        let previous_status = book.status;
        book.apply_update(changes, today())?;
        let book = tx.save_book(&book).await?;
        tx.commit().await?;

        if book.status != previous_status {
            info!(%user_id, book_id = %id, from = previous_status.as_str(), to = book.status.as_str(), "book status changed");
        }
        Ok(book.into())
    }

    pub async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), AppError> {
        self.books.delete(user_id, id).await?;
        info!(%user_id, book_id = %id, "book deleted");
        Ok(())
    }

    async fn ensure_series(&self, user_id: UserId, series_id: SeriesId) -> Result<(), AppError> {
        match self.series.get(user_id, series_id).await {
            Ok(_) => Ok(()),
            Err(RepositoryError::NotFound) => Err(AppError::validation(format!(
                "series {series_id} does not exist"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}
