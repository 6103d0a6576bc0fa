// Errors surfaced by the fetch path
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("min and max must be valid timestamps (min <= max), got min={min} max={max}")]
    InvalidRange {
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    },
    #[error("count must be a positive integer, got {0}")]
    NonPositiveCount(i64),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage query failed: {0:#}")]
    Storage(anyhow::Error),
}
