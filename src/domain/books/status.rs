use chrono::NaiveDate;

use crate::domain::books::books::{Book, BookStatus};
use crate::domain::books::progress::BookProgress;

/// Resulting status, progress and finish date of a status change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusPatch {
    pub status: BookStatus,
    pub progress: BookProgress,
    pub finish_date: Option<NaiveDate>,
}

impl StatusPatch {
    /// Marks a book read: progress is fast-forwarded, and the finish date is the
    /// explicit one if given, the existing one if set, otherwise `today`.
    pub fn mark_read(
        progress: BookProgress,
        current_finish: Option<NaiveDate>,
        explicit_finish: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            status: BookStatus::Read,
            progress: progress.fast_forwarded(),
            finish_date: explicit_finish.or(current_finish).or(Some(today)),
        }
    }
}

/// Explicit status change requested by the user. Every transition is allowed.
///
/// Moving away from `read` never clears the finish date.
pub fn apply_status_change(
    book: &Book,
    requested: BookStatus,
    explicit_finish: Option<NaiveDate>,
    today: NaiveDate,
) -> StatusPatch {
    match requested {
        BookStatus::Read => {
            StatusPatch::mark_read(book.progress, book.finish_date, explicit_finish, today)
        }
        other => StatusPatch {
            status: other,
            progress: book.progress,
            finish_date: book.finish_date,
        },
    }
}

/// Completion inferred from progress. Returns `None` when the book is not at
/// 100% or is already `read`.
pub fn implicit_completion(book: &Book, today: NaiveDate) -> Option<StatusPatch> {
    if book.status == BookStatus::Read || !book.progress.has_reached_completion() {
        return None;
    }
    Some(StatusPatch::mark_read(
        book.progress,
        book.finish_date,
        None,
        today,
    ))
}
