use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::ids::{SeriesId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub user_id: UserId,
    pub name: String,
    pub total_books: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Series with counts of its member books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    #[serde(flatten)]
    pub series: Series,
    pub book_count: u64,
    pub books_read: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeries {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_books: Option<i32>,
}

impl NewSeries {
    pub fn normalize(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::new("series name is required"));
        }
        self.total_books = self.total_books.filter(|&n| n > 0);
        Ok(self)
    }
}
