//! Reading sessions and the rules that turn a logged session into a progress update.
//!
//! Persisted amounts are always deltas: paper pages turned, estimated ebook pages,
//! and audiobook minutes listened, so summing them gives true totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::books::books::{Book, BookFormat, BookWithProgress};
use crate::domain::books::progress::{clamp_percentage, BookProgress};
use crate::domain::books::status::implicit_completion;
use crate::domain::errors::ValidationError;
use crate::domain::ids::{BookId, SessionId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub session_date: NaiveDate,
    pub pages_read: i32,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A session as submitted by the reader.
///
/// `pages_read` is the page reached (paper), `percentage` the position reached
/// (ebook), and `duration_minutes` either the playback position reached or the
/// minutes listened (audiobook) or the minutes spent (paper, ebook).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub book_id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_read: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Column values of a session row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraft {
    pub user_id: UserId,
    pub book_id: BookId,
    pub session_date: NaiveDate,
    pub pages_read: i32,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Outcome of applying a session to its book, before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub session: SessionDraft,
    pub book: Book,
    pub just_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub session: ReadingSession,
    pub book: BookWithProgress,
    pub just_completed: bool,
}

/// Applies a session to the latest stored state of its book.
pub fn plan_session(
    book: &Book,
    input: &NewSession,
    today: NaiveDate,
) -> Result<SessionPlan, ValidationError> {
    validate(book.format(), input)?;

    let session_date = input.session_date.unwrap_or(today);
    let (progress, pages_read, duration_minutes) = match book.progress {
        BookProgress::Paper {
            total_pages,
            current_page,
        } => {
            let reached = input.pages_read.unwrap_or(current_page).max(current_page);
            let new_page = match total_pages.filter(|&t| t > 0) {
                Some(total) => reached.min(total),
                None => reached,
            };
            let progress = BookProgress::Paper {
                total_pages,
                current_page: new_page,
            }
            .clamped();
            (progress, (new_page - current_page).max(0), input.duration_minutes)
        }
        BookProgress::Ebook {
            current_percentage,
            total_pages,
        } => {
            let reached = input
                .percentage
                .map_or(current_percentage, clamp_percentage);
            let progress = BookProgress::Ebook {
                current_percentage: reached,
                total_pages,
            }
            .clamped();
            let pages = estimated_ebook_pages(current_percentage, reached, total_pages);
            (progress, pages, input.duration_minutes)
        }
        BookProgress::Audiobook {
            total_duration_minutes,
            current_duration_minutes,
        } => {
            let (position, delta) = audiobook_position(
                current_duration_minutes,
                total_duration_minutes,
                input.duration_minutes,
            );
            let progress = BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes: position,
            };
            (progress, 0, input.duration_minutes.map(|_| delta))
        }
    };

    let mut updated = book.clone();
    updated.progress = progress;
    let completion = implicit_completion(&updated, today);
    let just_completed = completion.is_some();
    if let Some(patch) = completion {
        updated.apply_status_patch(patch);
    }

    Ok(SessionPlan {
        session: SessionDraft {
            user_id: book.user_id,
            book_id: book.id,
            session_date,
            pages_read,
            duration_minutes,
            notes: input
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(ToString::to_string),
        },
        book: updated,
        just_completed,
    })
}

/// New playback position and the minutes actually applied.
///
/// A value past the stored position is the position reached; anything else is
/// taken as minutes listened on top of it.
pub fn audiobook_position(current: i32, total: Option<i32>, raw: Option<i32>) -> (i32, i32) {
    let Some(raw) = raw else {
        return (current, 0);
    };
    let reached = if raw > current {
        raw
    } else {
        current.saturating_add(raw)
    };
    let position = match total.filter(|&t| t > 0) {
        Some(total) => reached.min(total),
        None => reached,
    };
    (position, (position - current).max(0))
}

fn estimated_ebook_pages(previous: f64, reached: f64, total_pages: Option<i32>) -> i32 {
    match total_pages.filter(|&t| t > 0) {
        Some(total) => ((reached - previous).max(0.0) / 100.0 * f64::from(total)).round() as i32,
        None => 0,
    }
}

fn validate(format: BookFormat, input: &NewSession) -> Result<(), ValidationError> {
    if input.pages_read.is_some_and(|p| p < 0) {
        return Err(ValidationError::new("pages_read must not be negative"));
    }
    if input.duration_minutes.is_some_and(|d| d < 0) {
        return Err(ValidationError::new(
            "duration_minutes must not be negative",
        ));
    }
    if input.percentage.is_some_and(|p| !p.is_finite()) {
        return Err(ValidationError::new("percentage must be a number"));
    }
    match format {
        BookFormat::Paper if input.percentage.is_some() => Err(ValidationError::new(
            "percentage only applies to ebook sessions",
        )),
        BookFormat::Ebook if input.pages_read.is_some() => Err(ValidationError::new(
            "ebook sessions record a percentage, not pages_read",
        )),
        BookFormat::Audiobook if input.pages_read.is_some() || input.percentage.is_some() => {
            Err(ValidationError::new(
                "audiobook sessions record duration_minutes only",
            ))
        }
        _ => Ok(()),
    }
}
