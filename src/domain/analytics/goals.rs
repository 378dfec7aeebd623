use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::books::books::BookFormat;
use crate::domain::errors::ValidationError;
use crate::domain::ids::{BookId, GoalId, UserId};

/// Pages assumed for a finished book with no page count.
pub const DEFAULT_BOOK_PAGES: i64 = 300;
/// Listening minutes counted as one page.
pub const MINUTES_PER_PAGE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingGoal {
    pub id: GoalId,
    pub user_id: UserId,
    pub year: i32,
    pub target_books: Option<i32>,
    pub target_pages: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_books: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pages: Option<i32>,
}

impl GoalTargets {
    /// Drops non-positive targets and requires at least one to remain.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let targets = Self {
            target_books: self.target_books.filter(|&n| n > 0),
            target_pages: self.target_pages.filter(|&n| n > 0),
        };
        if targets.target_books.is_none() && targets.target_pages.is_none() {
            return Err(ValidationError::new(
                "at least one target (books or pages) is required",
            ));
        }
        Ok(targets)
    }
}

/// A book finished during the goal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedBook {
    pub id: BookId,
    pub title: String,
    pub format: BookFormat,
    pub finish_date: NaiveDate,
    #[serde(skip)]
    pub total_pages: Option<i32>,
    #[serde(skip)]
    pub total_duration_minutes: Option<i32>,
}

impl FinishedBook {
    /// Page count used for goal progress: the known page count, else listening
    /// time converted to pages for audiobooks, else a flat default.
    pub fn estimated_pages(&self) -> i64 {
        if let Some(pages) = self.total_pages.filter(|&p| p > 0) {
            return i64::from(pages);
        }
        match self.format {
            BookFormat::Audiobook => self
                .total_duration_minutes
                .map_or(0, |minutes| (f64::from(minutes) / MINUTES_PER_PAGE).round() as i64),
            BookFormat::Paper | BookFormat::Ebook => DEFAULT_BOOK_PAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub year: i32,
    pub goal: Option<ReadingGoal>,
    pub books_read: u64,
    pub pages_read: i64,
    /// Most recently finished first.
    pub books: Vec<FinishedBook>,
}

impl GoalProgress {
    pub fn build(year: i32, goal: Option<ReadingGoal>, mut books: Vec<FinishedBook>) -> Self {
        books.sort_by(|a, b| b.finish_date.cmp(&a.finish_date));
        Self {
            year,
            goal,
            books_read: books.len() as u64,
            pages_read: books.iter().map(FinishedBook::estimated_pages).sum(),
            books,
        }
    }
}
