use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::RepositoryError;
use crate::domain::activity::CalendarDay;
use crate::domain::book_items::{Book, BookDraft, BookFilter};
use crate::domain::genres::GenreBreakdown;
use crate::domain::goals::{FinishedBook, GoalTargets, ReadingGoal};
use crate::domain::ids::{BookId, SeriesId, SessionId, TokenId, UserId};
use crate::domain::period::{DailyActivity, DateRange, FinishedTotals, SessionMinutes, StatusCounts};
use crate::domain::series::{NewSeries, Series, SeriesSummary};
use crate::domain::sessions::{ReadingSession, SessionDraft};
use crate::domain::tokens::{NewToken, Token};
use crate::domain::users::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, token: NewToken) -> Result<Token, RepositoryError>;
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Token, RepositoryError>;
    async fn update_last_used(&self, id: TokenId) -> Result<(), RepositoryError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Token>, RepositoryError>;
    /// Marks the token revoked. Revoking twice keeps the first timestamp.
    async fn revoke(&self, id: TokenId) -> Result<Token, RepositoryError>;
}

/// Books are always addressed through their owner; another user's book is `NotFound`.
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, user_id: UserId, book: BookDraft) -> Result<Book, RepositoryError>;
    async fn get(&self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError>;
    async fn list(&self, user_id: UserId, filter: &BookFilter)
        -> Result<Vec<Book>, RepositoryError>;
    /// Deletes the book and, by cascade, its sessions.
    async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), RepositoryError>;
}

/// One atomic session write. Dropping it without `commit` rolls everything back.
#[async_trait]
pub trait ProgressTransaction: Send {
    /// Takes the write lock on the book row and returns its latest state.
    async fn lock_book(&mut self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError>;
    async fn insert_session(
        &mut self,
        session: &SessionDraft,
    ) -> Result<ReadingSession, RepositoryError>;
    /// Writes every mutable column of `book` and bumps its version.
    async fn save_book(&mut self, book: &Book) -> Result<Book, RepositoryError>;
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ProgressTransaction>, RepositoryError>;
    async fn get(&self, user_id: UserId, id: SessionId) -> Result<ReadingSession, RepositoryError>;
    /// Newest first.
    async fn list(
        &self,
        user_id: UserId,
        book_id: Option<BookId>,
    ) -> Result<Vec<ReadingSession>, RepositoryError>;
    async fn delete(&self, user_id: UserId, id: SessionId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn status_counts(&self, user_id: UserId) -> Result<StatusCounts, RepositoryError>;
    async fn finished_totals(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<FinishedTotals, RepositoryError>;
    async fn session_minutes(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<SessionMinutes, RepositoryError>;
    /// Distinct session dates on or after `since`.
    async fn session_dates(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, RepositoryError>;
    /// Activity for days in `range` that have sessions.
    async fn daily_activity(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<DailyActivity>, RepositoryError>;
    /// `(month, count)` of books finished in `year`.
    async fn finished_per_month(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Vec<(u32, u64)>, RepositoryError>;
    async fn calendar_days(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<CalendarDay>, RepositoryError>;
    async fn finished_books(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Vec<FinishedBook>, RepositoryError>;
    /// Genre and topic counts over finished books, filtered by finish date.
    async fn tag_counts(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<GenreBreakdown, RepositoryError>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn upsert(
        &self,
        user_id: UserId,
        year: i32,
        targets: GoalTargets,
    ) -> Result<ReadingGoal, RepositoryError>;
    async fn get(&self, user_id: UserId, year: i32) -> Result<ReadingGoal, RepositoryError>;
    async fn delete(&self, user_id: UserId, year: i32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SeriesRepository: Send + Sync {
    async fn insert(&self, user_id: UserId, series: NewSeries) -> Result<Series, RepositoryError>;
    async fn get(&self, user_id: UserId, id: SeriesId) -> Result<Series, RepositoryError>;
    async fn list(&self, user_id: UserId) -> Result<Vec<SeriesSummary>, RepositoryError>;
    /// Member books keep existing with their series cleared.
    async fn delete(&self, user_id: UserId, id: SeriesId) -> Result<(), RepositoryError>;
}
