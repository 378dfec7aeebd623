pub mod activity;
pub mod genres;
pub mod goals;
pub mod period;
pub mod streak;
