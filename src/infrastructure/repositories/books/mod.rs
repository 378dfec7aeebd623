#[allow(clippy::module_inception)]
pub mod books;
pub mod series;
pub mod sessions;
