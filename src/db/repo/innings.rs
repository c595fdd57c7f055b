//! Innings operations for the repository.

use crate::domain::{Innings, MatchId, TimeMs};
use crate::store::StoreError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode, expect_row, int, Repository};

fn innings_from_row(row: &SqliteRow) -> Result<Innings, StoreError> {
    Ok(Innings {
        id: decode(row, "id")?,
        match_id: decode(row, "match_id")?,
        innings_number: int(row, "innings_number")?,
        batting_team: decode(row, "batting_team")?,
        total_runs: int(row, "total_runs")?,
        total_wickets: int(row, "total_wickets")?,
        total_balls: int(row, "total_balls")?,
        status: decode(row, "status")?,
        created_at: TimeMs::new(row.try_get("created_at")?),
        updated_at: TimeMs::new(row.try_get("updated_at")?),
    })
}

impl Repository {
    /// Insert a new innings.
    ///
    /// # Errors
    /// Returns `Conflict` if the match already has an innings with this number.
    pub(super) async fn insert_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO innings (
                id, match_id, innings_number, batting_team, total_runs,
                total_wickets, total_balls, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(innings.id.to_string())
        .bind(innings.match_id.to_string())
        .bind(i64::from(innings.innings_number))
        .bind(innings.batting_team.as_str())
        .bind(i64::from(innings.total_runs))
        .bind(i64::from(innings.total_wickets))
        .bind(i64::from(innings.total_balls))
        .bind(innings.status.as_str())
        .bind(innings.created_at.as_i64())
        .bind(innings.updated_at.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub(super) async fn fetch_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<Innings>, StoreError> {
        let row = sqlx::query("SELECT * FROM innings WHERE match_id = ? AND innings_number = ?")
            .bind(match_id.to_string())
            .bind(i64::from(innings_number))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(innings_from_row).transpose()
    }

    pub(super) async fn query_innings(&self, match_id: MatchId) -> Result<Vec<Innings>, StoreError> {
        let rows = sqlx::query("SELECT * FROM innings WHERE match_id = ? ORDER BY innings_number ASC")
            .bind(match_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(innings_from_row).collect()
    }

    pub(super) async fn store_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE innings
            SET total_runs = ?, total_wickets = ?, total_balls = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(i64::from(innings.total_runs))
        .bind(i64::from(innings.total_wickets))
        .bind(i64::from(innings.total_balls))
        .bind(innings.status.as_str())
        .bind(innings.updated_at.as_i64())
        .bind(innings.id.to_string())
        .execute(&self.pool)
        .await?;

        expect_row(result.rows_affected(), format!("innings {}", innings.id))
    }
}
