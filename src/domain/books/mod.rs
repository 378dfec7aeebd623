#[allow(clippy::module_inception)]
pub mod books;
pub mod progress;
pub mod series;
pub mod sessions;
pub mod status;
pub mod tags;
