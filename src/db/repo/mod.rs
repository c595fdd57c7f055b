//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct, the SQLite implementation of
//! [`ScoreStore`]. Methods are organized across submodules by entity:
//! - `matches.rs` - Match fixtures and series listings
//! - `innings.rs` - Innings rows
//! - `overs.rs` - Over rows
//! - `balls.rs` - Ball rows and the over-opening append

mod balls;
mod innings;
mod matches;
mod overs;

use crate::domain::{Ball, BallId, Innings, InningsId, Match, MatchId, Over, OverId};
use crate::store::{ScoreStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::fmt::Display;
use std::str::FromStr;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

/// Parse a text column into a domain value.
fn decode<T>(row: &SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| StoreError::Backend(format!("corrupt {} column: {}", column, e)))
}

/// Read an integer column into a narrower unsigned type.
fn int<T>(row: &SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: TryFrom<i64>,
{
    let raw: i64 = row.try_get(column)?;
    T::try_from(raw)
        .map_err(|_| StoreError::Backend(format!("{} out of range: {}", column, raw)))
}

/// Fail with `NotFound` when an update or delete matched no row.
fn expect_row(rows_affected: u64, what: impl Display) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound(what.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ScoreStore for Repository {
    async fn create_match(&self, fixture: &Match) -> Result<(), StoreError> {
        self.insert_match(fixture).await
    }

    async fn get_match(&self, id: MatchId) -> Result<Match, StoreError> {
        self.fetch_match(id).await
    }

    async fn list_matches_by_series(&self, series_id: &str) -> Result<Vec<Match>, StoreError> {
        self.query_matches_by_series(series_id).await
    }

    async fn count_matches_by_series(&self, series_id: &str) -> Result<u64, StoreError> {
        self.query_match_count(series_id).await
    }

    async fn update_match(&self, fixture: &Match) -> Result<(), StoreError> {
        self.store_match(fixture).await
    }

    async fn create_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        self.insert_innings(innings).await
    }

    async fn get_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<Innings>, StoreError> {
        self.fetch_innings(match_id, innings_number).await
    }

    async fn list_innings(&self, match_id: MatchId) -> Result<Vec<Innings>, StoreError> {
        self.query_innings(match_id).await
    }

    async fn update_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        self.store_innings(innings).await
    }

    async fn get_over(&self, id: OverId) -> Result<Over, StoreError> {
        self.fetch_over(id).await
    }

    async fn list_overs(&self, innings_id: InningsId) -> Result<Vec<Over>, StoreError> {
        self.query_overs(innings_id).await
    }

    async fn update_over(&self, over: &Over) -> Result<(), StoreError> {
        self.store_over(over).await
    }

    async fn delete_over(&self, id: OverId) -> Result<(), StoreError> {
        self.remove_over(id).await
    }

    async fn append_ball(&self, new_over: Option<&Over>, ball: &Ball) -> Result<(), StoreError> {
        self.insert_ball(new_over, ball).await
    }

    async fn list_balls(&self, over_id: OverId) -> Result<Vec<Ball>, StoreError> {
        self.query_balls(over_id).await
    }

    async fn delete_ball(&self, id: BallId) -> Result<(), StoreError> {
        self.remove_ball(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
