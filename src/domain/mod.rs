pub mod analytics;
pub mod auth;
pub mod books;
pub mod errors;
pub mod ids;
pub mod repositories;

// Re-exports
pub use analytics::{activity, genres, goals, period, streak};
pub use auth::{tokens, users};
pub use books::books as book_items;
pub use books::{progress, series, sessions, status, tags};
pub use errors::{InvalidRange, RepositoryError, ValidationError};

use chrono::{NaiveDate, Utc};

/// Current calendar date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
