//! Durable storage abstraction for matches, innings, overs and balls.

use crate::domain::{Ball, BallId, Innings, Match, MatchId, InningsId, Over, OverId};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub mod memory;

pub use memory::MemoryStore;

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write (duplicate innings, over or ball number).
    #[error("conflict: {0}")]
    Conflict(String),
    /// The backend failed (connection, I/O, corrupt row).
    #[error("storage backend error: {0}")]
    Backend(String),
    /// The call did not finish within its deadline.
    #[error("storage call timed out: {0}")]
    Timeout(String),
}

impl StoreError {
    /// Whether the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Backend(_) | StoreError::Timeout(_))
    }
}

/// Repository contract for the four scoring entities.
///
/// Reads of a single row return `StoreError::NotFound` when absent; list
/// reads return rows ordered by their sequence number.
#[async_trait]
pub trait ScoreStore: Send + Sync + fmt::Debug {
    async fn create_match(&self, fixture: &Match) -> Result<(), StoreError>;

    async fn get_match(&self, id: MatchId) -> Result<Match, StoreError>;

    /// Matches of a series ordered by match number.
    async fn list_matches_by_series(&self, series_id: &str) -> Result<Vec<Match>, StoreError>;

    async fn count_matches_by_series(&self, series_id: &str) -> Result<u64, StoreError>;

    async fn update_match(&self, fixture: &Match) -> Result<(), StoreError>;

    async fn create_innings(&self, innings: &Innings) -> Result<(), StoreError>;

    /// Innings `innings_number` of a match, if it has been opened.
    async fn get_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<Innings>, StoreError>;

    async fn list_innings(&self, match_id: MatchId) -> Result<Vec<Innings>, StoreError>;

    async fn update_innings(&self, innings: &Innings) -> Result<(), StoreError>;

    async fn get_over(&self, id: OverId) -> Result<Over, StoreError>;

    async fn list_overs(&self, innings_id: InningsId) -> Result<Vec<Over>, StoreError>;

    async fn update_over(&self, over: &Over) -> Result<(), StoreError>;

    /// Delete an over together with any balls still in it.
    async fn delete_over(&self, id: OverId) -> Result<(), StoreError>;

    /// Append a ball, opening `new_over` first in the same unit of work.
    ///
    /// Either both rows land or neither does. A duplicate over number or ball
    /// number yields `StoreError::Conflict`.
    async fn append_ball(&self, new_over: Option<&Over>, ball: &Ball) -> Result<(), StoreError>;

    async fn list_balls(&self, over_id: OverId) -> Result<Vec<Ball>, StoreError>;

    async fn delete_ball(&self, id: BallId) -> Result<(), StoreError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Run a storage call under a deadline, surfacing a retryable timeout.
pub async fn bounded<T, F>(limit: Duration, op: &'static str, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(op, timeout_ms = limit.as_millis() as u64, "Storage call timed out");
            Err(StoreError::Timeout(op.to_string()))
        }
    }
}
