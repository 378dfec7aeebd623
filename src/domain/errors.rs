use thiserror::Error;

/// Failure reported by a repository implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unexpected repository error: {0}")]
    Unexpected(String),
}

impl RepositoryError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

/// Malformed input rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A statistics date range that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date range: {0}")]
pub struct InvalidRange(pub String);

impl InvalidRange {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
