//! Ball operations for the repository.

use crate::domain::{Ball, BallId, Over, OverId, TimeMs, WicketKind};
use crate::store::StoreError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::overs::insert_over_tx;
use super::{decode, expect_row, int, Repository};

fn ball_from_row(row: &SqliteRow) -> Result<Ball, StoreError> {
    let wicket_kind: Option<String> = row.try_get("wicket_kind")?;
    let wicket_kind = wicket_kind
        .map(|raw| raw.parse::<WicketKind>())
        .transpose()
        .map_err(|e| StoreError::Backend(format!("corrupt wicket_kind column: {}", e)))?;

    Ok(Ball {
        id: decode(row, "id")?,
        over_id: decode(row, "over_id")?,
        ball_number: int(row, "ball_number")?,
        ball_type: decode(row, "ball_type")?,
        run_type: decode(row, "run_type")?,
        runs: int(row, "runs")?,
        byes: int(row, "byes")?,
        is_wicket: row.try_get::<i64, _>("is_wicket")? != 0,
        wicket_kind,
        created_at: TimeMs::new(row.try_get("created_at")?),
    })
}

impl Repository {
    /// Insert a ball, opening `new_over` first, in a single transaction.
    ///
    /// # Errors
    /// Returns `Conflict` on a duplicate over number or ball number; nothing is
    /// written in that case.
    pub(super) async fn insert_ball(
        &self,
        new_over: Option<&Over>,
        ball: &Ball,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(over) = new_over {
            insert_over_tx(&mut tx, over).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO balls (
                id, over_id, ball_number, ball_type, run_type, runs, byes,
                is_wicket, wicket_kind, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ball.id.to_string())
        .bind(ball.over_id.to_string())
        .bind(i64::from(ball.ball_number))
        .bind(ball.ball_type.as_str())
        .bind(ball.run_type.as_str())
        .bind(i64::from(ball.runs))
        .bind(i64::from(ball.byes))
        .bind(i64::from(ball.is_wicket))
        .bind(ball.wicket_kind.map(|k| k.as_str()))
        .bind(ball.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub(super) async fn query_balls(&self, over_id: OverId) -> Result<Vec<Ball>, StoreError> {
        let rows = sqlx::query("SELECT * FROM balls WHERE over_id = ? ORDER BY ball_number ASC")
            .bind(over_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(ball_from_row).collect()
    }

    pub(super) async fn remove_ball(&self, id: BallId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM balls WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        expect_row(result.rows_affected(), format!("ball {}", id))
    }
}
