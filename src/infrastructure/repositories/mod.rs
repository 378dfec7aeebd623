pub mod analytics;
pub mod auth;
pub mod books;

pub use analytics::{goals, stats};
pub use auth::{tokens, users};
pub use books::{books as book_repos, series, sessions};
