use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::books::progress::{BookProgress, ProgressEdits};
use crate::domain::books::status::{apply_status_change, implicit_completion, StatusPatch};
use crate::domain::books::tags::{normalize_genres, normalize_topics};
use crate::domain::errors::ValidationError;
use crate::domain::ids::{BookId, SeriesId, UserId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BookStatus {
    #[default]
    WantToRead,
    UpNext,
    Reading,
    Read,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::WantToRead,
        BookStatus::UpNext,
        BookStatus::Reading,
        BookStatus::Read,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::WantToRead => "want-to-read",
            BookStatus::UpNext => "up-next",
            BookStatus::Reading => "reading",
            BookStatus::Read => "read",
        }
    }
}

impl FromStr for BookStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "want-to-read" => Ok(BookStatus::WantToRead),
            "up-next" => Ok(BookStatus::UpNext),
            "reading" => Ok(BookStatus::Reading),
            "read" => Ok(BookStatus::Read),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Paper,
    Ebook,
    Audiobook,
}

impl BookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFormat::Paper => "paper",
            BookFormat::Ebook => "ebook",
            BookFormat::Audiobook => "audiobook",
        }
    }
}

impl FromStr for BookFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "paper" | "physical" => Ok(BookFormat::Paper),
            "ebook" | "e-book" => Ok(BookFormat::Ebook),
            "audiobook" | "audio" => Ok(BookFormat::Audiobook),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub user_id: UserId,
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    /// Lowercased.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Free-form notes on the book as a whole.
    pub thoughts: Option<String>,
    pub status: BookStatus,
    #[serde(flatten)]
    pub progress: BookProgress,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub series_id: Option<SeriesId>,
    pub series_order: Option<i32>,
    /// Incremented on every write to the row.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn format(&self) -> BookFormat {
        self.progress.format()
    }

    pub fn apply_status_patch(&mut self, patch: StatusPatch) {
        self.status = patch.status;
        self.progress = patch.progress;
        self.finish_date = patch.finish_date;
    }

    /// Applies a partial edit. Status or progress edits route through the
    /// status transition rule.
    pub fn apply_update(
        &mut self,
        changes: UpdateBook,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        let edits = changes.progress_edits();
        let progress_touched = changes.format.is_some() || !edits.is_empty();

        if let Some(title) = changes.title {
            self.title = normalize_title(&title)?;
        }
        if let Some(authors) = changes.authors {
            self.authors = normalize_authors(authors);
        }
        if let Some(isbn) = changes.isbn {
            self.isbn = normalize_optional_field(Some(isbn));
        }
        if let Some(genres) = changes.genres {
            self.genres = normalize_genres(genres);
        }
        if let Some(topics) = changes.topics {
            self.topics = normalize_topics(topics);
        }
        if let Some(thoughts) = changes.thoughts {
            self.thoughts = normalize_optional_field(Some(thoughts));
        }
        if let Some(series_id) = changes.series_id {
            self.series_id = series_id;
        }
        if let Some(series_order) = changes.series_order {
            self.series_order = series_order;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(finish_date) = changes.finish_date {
            self.finish_date = finish_date;
        }

        if let Some(format) = changes.format {
            self.progress = self.progress.converted_to(format);
        }
        self.progress = self.progress.with_edits(&edits)?;

        match changes.status {
            Some(requested) => {
                let explicit_finish = changes.finish_date.flatten();
                let patch = apply_status_change(self, requested, explicit_finish, today);
                self.apply_status_patch(patch);
            }
            None if progress_touched => {
                if let Some(patch) = implicit_completion(self, today) {
                    self.apply_status_patch(patch);
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// Book as returned by the API, with its derived completion percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWithProgress {
    #[serde(flatten)]
    pub book: Book,
    pub progress_percent: u8,
}

impl From<Book> for BookWithProgress {
    fn from(book: Book) -> Self {
        let progress_percent = book.progress.percent();
        Self {
            book,
            progress_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub thoughts: Option<String>,
    #[serde(default)]
    pub status: BookStatus,
    pub format: BookFormat,
    pub total_pages: Option<i32>,
    pub current_page: Option<i32>,
    pub current_percentage: Option<f64>,
    pub total_duration_minutes: Option<i32>,
    pub current_duration_minutes: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub series_id: Option<SeriesId>,
    pub series_order: Option<i32>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, format: BookFormat) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            isbn: None,
            genres: Vec::new(),
            topics: Vec::new(),
            thoughts: None,
            status: BookStatus::default(),
            format,
            total_pages: None,
            current_page: None,
            current_percentage: None,
            total_duration_minutes: None,
            current_duration_minutes: None,
            start_date: None,
            finish_date: None,
            series_id: None,
            series_order: None,
        }
    }

    fn progress_edits(&self) -> ProgressEdits {
        ProgressEdits {
            total_pages: self.total_pages,
            current_page: self.current_page,
            current_percentage: self.current_percentage,
            total_duration_minutes: self.total_duration_minutes,
            current_duration_minutes: self.current_duration_minutes,
        }
    }

    /// Validates the request and resolves status and progress the same way an
    /// update would.
    pub fn into_draft(self, today: NaiveDate) -> Result<BookDraft, ValidationError> {
        let title = normalize_title(&self.title)?;
        let progress = BookProgress::empty(self.format).with_edits(&self.progress_edits())?;

        let mut draft = BookDraft {
            title,
            authors: normalize_authors(self.authors),
            isbn: normalize_optional_field(self.isbn),
            genres: normalize_genres(self.genres),
            topics: normalize_topics(self.topics),
            thoughts: normalize_optional_field(self.thoughts),
            status: self.status,
            progress,
            start_date: self.start_date,
            finish_date: self.finish_date,
            series_id: self.series_id,
            series_order: self.series_order,
        };

        let patch = if draft.status == BookStatus::Read {
            Some(StatusPatch::mark_read(
                draft.progress,
                draft.finish_date,
                self.finish_date,
                today,
            ))
        } else if draft.progress.has_reached_completion() {
            Some(StatusPatch::mark_read(
                draft.progress,
                draft.finish_date,
                None,
                today,
            ))
        } else {
            None
        };
        if let Some(patch) = patch {
            draft.status = patch.status;
            draft.progress = patch.progress;
            draft.finish_date = patch.finish_date;
        }
        Ok(draft)
    }
}

/// Validated column values for a book about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub genres: Vec<String>,
    pub topics: Vec<String>,
    pub thoughts: Option<String>,
    pub status: BookStatus,
    pub progress: BookProgress,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub series_id: Option<SeriesId>,
    pub series_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// Replaces the whole list; an empty list clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    /// A blank value clears the thoughts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<BookFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_duration_minutes: Option<i32>,
    /// `None` = don't change, `Some(None)` = clear, `Some(Some(date))` = set.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<Option<NaiveDate>>,
    /// `None` = don't change, `Some(None)` = clear, `Some(Some(date))` = set.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_date: Option<Option<NaiveDate>>,
    /// `None` = don't change, `Some(None)` = clear, `Some(Some(id))` = set.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub series_id: Option<Option<SeriesId>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub series_order: Option<Option<i32>>,
}

impl UpdateBook {
    pub fn progress_edits(&self) -> ProgressEdits {
        ProgressEdits {
            total_pages: self.total_pages,
            current_page: self.current_page,
            current_percentage: self.current_percentage,
            total_duration_minutes: self.total_duration_minutes,
            current_duration_minutes: self.current_duration_minutes,
        }
    }
}

/// Narrows a book listing. Every field that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub status: Option<BookStatus>,
    /// Case-insensitive substring of the title or of any author.
    pub search: Option<String>,
    pub genre: Option<String>,
    /// Matched case-insensitively.
    pub topic: Option<String>,
}

impl BookFilter {
    pub fn with_status(status: BookStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Trims the text fields, drops blank ones and lowercases the genre.
    pub fn normalized(self) -> Self {
        Self {
            status: self.status,
            search: normalize_optional_field(self.search),
            genre: normalize_optional_field(self.genre).map(|genre| genre.to_lowercase()),
            topic: normalize_optional_field(self.topic),
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("title is required"));
    }
    Ok(trimmed.to_string())
}

fn normalize_authors(authors: Vec<String>) -> Vec<String> {
    authors
        .into_iter()
        .filter_map(|name| normalize_optional_field(Some(name)))
        .collect()
}

fn normalize_optional_field(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
