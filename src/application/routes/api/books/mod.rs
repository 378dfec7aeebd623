#[allow(clippy::module_inception)]
pub(crate) mod books;
pub(crate) mod series;
pub(crate) mod sessions;
