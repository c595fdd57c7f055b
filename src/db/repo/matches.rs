//! Match fixture operations for the repository.

use crate::domain::{Match, MatchId, MatchResult, TimeMs};
use crate::store::StoreError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode, expect_row, int, Repository};

const MATCH_COLUMNS: &str = "id, series_id, match_number, team_a, team_b, total_overs, \
    toss_winner, toss_decision, initial_batting, status, result, created_at, updated_at";

fn match_from_row(row: &SqliteRow) -> Result<Match, StoreError> {
    let result: Option<String> = row.try_get("result")?;
    let result = result
        .map(|raw| serde_json::from_str::<MatchResult>(&raw))
        .transpose()
        .map_err(|e| StoreError::Backend(format!("corrupt result column: {}", e)))?;

    Ok(Match {
        id: decode(row, "id")?,
        series_id: row.try_get("series_id")?,
        match_number: int(row, "match_number")?,
        team_a: row.try_get("team_a")?,
        team_b: row.try_get("team_b")?,
        total_overs: int(row, "total_overs")?,
        toss_winner: decode(row, "toss_winner")?,
        toss_decision: decode(row, "toss_decision")?,
        initial_batting: decode(row, "initial_batting")?,
        status: decode(row, "status")?,
        result,
        created_at: TimeMs::new(row.try_get("created_at")?),
        updated_at: TimeMs::new(row.try_get("updated_at")?),
    })
}

fn encode_result(fixture: &Match) -> Result<Option<String>, StoreError> {
    fixture
        .result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::Backend(e.to_string()))
}

impl Repository {
    /// Insert a new match fixture.
    ///
    /// # Errors
    /// Returns `Conflict` if the series already has this match number.
    pub(super) async fn insert_match(&self, fixture: &Match) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO matches (
                id, series_id, match_number, team_a, team_b, total_overs,
                toss_winner, toss_decision, initial_batting, status, result,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fixture.id.to_string())
        .bind(fixture.series_id.as_str())
        .bind(i64::from(fixture.match_number))
        .bind(fixture.team_a.as_str())
        .bind(fixture.team_b.as_str())
        .bind(i64::from(fixture.total_overs))
        .bind(fixture.toss_winner.as_str())
        .bind(fixture.toss_decision.as_str())
        .bind(fixture.initial_batting.as_str())
        .bind(fixture.status.as_str())
        .bind(encode_result(fixture)?)
        .bind(fixture.created_at.as_i64())
        .bind(fixture.updated_at.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub(super) async fn fetch_match(&self, id: MatchId) -> Result<Match, StoreError> {
        let sql = format!("SELECT {} FROM matches WHERE id = ?", MATCH_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => match_from_row(&row),
            None => Err(StoreError::NotFound(format!("match {}", id))),
        }
    }

    pub(super) async fn query_matches_by_series(
        &self,
        series_id: &str,
    ) -> Result<Vec<Match>, StoreError> {
        let sql = format!(
            "SELECT {} FROM matches WHERE series_id = ? ORDER BY match_number ASC",
            MATCH_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(series_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    pub(super) async fn query_match_count(&self, series_id: &str) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM matches WHERE series_id = ?")
            .bind(series_id)
            .fetch_one(&self.pool)
            .await?;

        int(&row, "n")
    }

    /// Persist status, result and timestamps. Setup fields never change.
    pub(super) async fn store_match(&self, fixture: &Match) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET status = ?, result = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fixture.status.as_str())
        .bind(encode_result(fixture)?)
        .bind(fixture.updated_at.as_i64())
        .bind(fixture.id.to_string())
        .execute(&self.pool)
        .await?;

        expect_row(result.rows_affected(), format!("match {}", fixture.id))
    }
}
