mod books;
mod goals;
mod series;
mod sessions;
pub mod stats;

pub use books::BookService;
pub use goals::GoalService;
pub use series::SeriesService;
pub use sessions::SessionService;
pub use stats::StatsService;
