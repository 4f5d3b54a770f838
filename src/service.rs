use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

use crate::models::{Movie, MovieInput};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("movie {id} not found")]
    NotFound { id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Engine-level failure. The wrapped detail is for logs only.
    #[error("storage failure: {0}")]
    Storage(anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Persistence-agnostic movie operations used by the HTTP handlers.
#[async_trait]
pub trait MovieService: Send + Sync {
    /// All movies in ascending id order. Empty when the table is empty.
    async fn list_all(&self) -> ServiceResult<Vec<Movie>>;

    async fn get(&self, id: i64) -> ServiceResult<Movie>;

    /// Inserts a movie and returns its assigned id.
    async fn create(&self, input: &MovieInput) -> ServiceResult<i64>;

    /// Replaces title and external reference and refreshes `updated_at`.
    async fn update(&self, id: i64, input: &MovieInput) -> ServiceResult<()>;

    async fn delete(&self, id: i64) -> ServiceResult<()>;
}

/// Rejects blank values before they reach storage. Values are stored as sent.
pub fn validate(input: &MovieInput) -> ServiceResult<()> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::Validation("title is required".to_string()));
    }
    if input.external_reference.trim().is_empty() {
        return Err(ServiceError::Validation("external reference is required".to_string()));
    }
    Ok(())
}

/// `updated_at` for a row last stamped at `previous`: the current time, or one
/// nanosecond past `previous` when the clock has not moved forward.
pub fn next_update_stamp(previous: Timestamp) -> ServiceResult<Timestamp> {
    let now = Timestamp::now();
    if now > previous {
        return Ok(now);
    }
    previous
        .checked_add(SignedDuration::from_nanos(1))
        .map_err(|e| ServiceError::Storage(anyhow::Error::new(e)))
}
