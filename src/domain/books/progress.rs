use serde::{Deserialize, Serialize};

use crate::domain::books::books::{Book, BookFormat};
use crate::domain::errors::ValidationError;

pub const FULL_PERCENTAGE: f64 = 100.0;

/// Reading position of a book, carrying only the fields its format uses.
///
/// Serialized flat with a `format` tag, e.g.
/// `{"format":"paper","total_pages":320,"current_page":12}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum BookProgress {
    Paper {
        total_pages: Option<i32>,
        current_page: i32,
    },
    Ebook {
        current_percentage: f64,
        /// Optional page estimate used by page-based statistics.
        total_pages: Option<i32>,
    },
    Audiobook {
        total_duration_minutes: Option<i32>,
        current_duration_minutes: i32,
    },
}

impl BookProgress {
    pub fn empty(format: BookFormat) -> Self {
        match format {
            BookFormat::Paper => BookProgress::Paper {
                total_pages: None,
                current_page: 0,
            },
            BookFormat::Ebook => BookProgress::Ebook {
                current_percentage: 0.0,
                total_pages: None,
            },
            BookFormat::Audiobook => BookProgress::Audiobook {
                total_duration_minutes: None,
                current_duration_minutes: 0,
            },
        }
    }

    pub fn format(&self) -> BookFormat {
        match self {
            BookProgress::Paper { .. } => BookFormat::Paper,
            BookProgress::Ebook { .. } => BookFormat::Ebook,
            BookProgress::Audiobook { .. } => BookFormat::Audiobook,
        }
    }

    /// Page count known for the book: the real total for paper, the estimate for ebooks.
    pub fn total_pages(&self) -> Option<i32> {
        match self {
            BookProgress::Paper { total_pages, .. } | BookProgress::Ebook { total_pages, .. } => {
                known_total(*total_pages)
            }
            BookProgress::Audiobook { .. } => None,
        }
    }

    pub fn total_duration_minutes(&self) -> Option<i32> {
        match self {
            BookProgress::Audiobook {
                total_duration_minutes,
                ..
            } => known_total(*total_duration_minutes),
            _ => None,
        }
    }

    /// Completion percentage, always within `0..=100`.
    pub fn percent(&self) -> u8 {
        match *self {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => ratio_percent(current_page, total_pages),
            BookProgress::Ebook {
                current_percentage, ..
            } => clamp_percentage(current_percentage).round() as u8,
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => ratio_percent(current_duration_minutes, total_duration_minutes),
        }
    }

    /// Whether the current metric has reached a known total.
    ///
    /// Paper and audiobooks without a total never complete implicitly.
    pub fn has_reached_completion(&self) -> bool {
        match *self {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => known_total(total_pages).is_some_and(|total| current_page >= total),
            BookProgress::Ebook {
                current_percentage, ..
            } => current_percentage >= FULL_PERCENTAGE,
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => known_total(total_duration_minutes)
                .is_some_and(|total| current_duration_minutes >= total),
        }
    }

    /// Enforces the per-format invariants: non-negative positions, positions never
    /// past a known total, percentages within `0..=100`, and unknown totals as `None`.
    pub fn clamped(self) -> Self {
        match self {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => {
                let total_pages = known_total(total_pages);
                BookProgress::Paper {
                    total_pages,
                    current_page: clamp_position(current_page, total_pages),
                }
            }
            BookProgress::Ebook {
                current_percentage,
                total_pages,
            } => BookProgress::Ebook {
                current_percentage: clamp_percentage(current_percentage),
                total_pages: known_total(total_pages),
            },
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => {
                let total = known_total(total_duration_minutes);
                BookProgress::Audiobook {
                    total_duration_minutes: total,
                    current_duration_minutes: clamp_position(current_duration_minutes, total),
                }
            }
        }
    }

    /// Moves the current metric to the end of the book where a total is known.
    pub fn fast_forwarded(self) -> Self {
        match self {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => BookProgress::Paper {
                total_pages,
                current_page: known_total(total_pages).unwrap_or(current_page),
            },
            BookProgress::Ebook { total_pages, .. } => BookProgress::Ebook {
                current_percentage: FULL_PERCENTAGE,
                total_pages,
            },
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes: known_total(total_duration_minutes)
                    .unwrap_or(current_duration_minutes),
            },
        }
    }

    /// Switches to another format. Page totals carry over between paper and ebook;
    /// the current position starts over.
    pub fn converted_to(self, format: BookFormat) -> Self {
        if self.format() == format {
            return self;
        }
        match format {
            BookFormat::Paper => BookProgress::Paper {
                total_pages: self.total_pages(),
                current_page: 0,
            },
            BookFormat::Ebook => BookProgress::Ebook {
                current_percentage: 0.0,
                total_pages: self.total_pages(),
            },
            BookFormat::Audiobook => BookProgress::empty(BookFormat::Audiobook),
        }
    }

    /// Applies direct field edits. Fields the format does not use are rejected.
    pub fn with_edits(self, edits: &ProgressEdits) -> Result<Self, ValidationError> {
        if let Some(field) = edits.inapplicable_field(self.format()) {
            return Err(ValidationError::new(format!(
                "{field} does not apply to {} books",
                self.format().as_str()
            )));
        }
        if edits.current_percentage.is_some_and(|p| !p.is_finite()) {
            return Err(ValidationError::new("current_percentage must be a number"));
        }

        let edited = match self {
            BookProgress::Paper {
                total_pages,
                current_page,
            } => BookProgress::Paper {
                total_pages: edits.total_pages.map_or(total_pages, Some),
                current_page: edits.current_page.unwrap_or(current_page),
            },
            BookProgress::Ebook {
                current_percentage,
                total_pages,
            } => BookProgress::Ebook {
                current_percentage: edits.current_percentage.unwrap_or(current_percentage),
                total_pages: edits.total_pages.map_or(total_pages, Some),
            },
            BookProgress::Audiobook {
                total_duration_minutes,
                current_duration_minutes,
            } => BookProgress::Audiobook {
                total_duration_minutes: edits
                    .total_duration_minutes
                    .map_or(total_duration_minutes, Some),
                current_duration_minutes: edits
                    .current_duration_minutes
                    .unwrap_or(current_duration_minutes),
            },
        };
        Ok(edited.clamped())
    }
}

/// Progress fields supplied by a create or update request.
///
/// A total of zero or less clears that total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressEdits {
    pub total_pages: Option<i32>,
    pub current_page: Option<i32>,
    pub current_percentage: Option<f64>,
    pub total_duration_minutes: Option<i32>,
    pub current_duration_minutes: Option<i32>,
}

impl ProgressEdits {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn inapplicable_field(&self, format: BookFormat) -> Option<&'static str> {
        let supplied = [
            ("total_pages", self.total_pages.is_some()),
            ("current_page", self.current_page.is_some()),
            ("current_percentage", self.current_percentage.is_some()),
            ("total_duration_minutes", self.total_duration_minutes.is_some()),
            ("current_duration_minutes", self.current_duration_minutes.is_some()),
        ];
        let allowed: &[&str] = match format {
            BookFormat::Paper => &["total_pages", "current_page"],
            BookFormat::Ebook => &["current_percentage", "total_pages"],
            BookFormat::Audiobook => &["total_duration_minutes", "current_duration_minutes"],
        };
        supplied
            .into_iter()
            .find(|(name, present)| *present && !allowed.contains(name))
            .map(|(name, _)| name)
    }
}

/// Completion percentage of a book, always within `0..=100`.
pub fn progress_percent(book: &Book) -> u8 {
    book.progress.percent()
}

pub fn has_reached_completion(book: &Book) -> bool {
    book.progress.has_reached_completion()
}

pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, FULL_PERCENTAGE)
    }
}

fn known_total(total: Option<i32>) -> Option<i32> {
    total.filter(|&t| t > 0)
}

fn clamp_position(current: i32, total: Option<i32>) -> i32 {
    let current = current.max(0);
    total.map_or(current, |t| current.min(t))
}

fn ratio_percent(current: i32, total: Option<i32>) -> u8 {
    match known_total(total) {
        Some(total) => {
            let percent = (f64::from(current) * 100.0 / f64::from(total)).round();
            percent.clamp(0.0, FULL_PERCENTAGE) as u8
        }
        None => 0,
    }
}
