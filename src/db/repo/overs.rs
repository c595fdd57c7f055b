//! Over operations for the repository.

use crate::domain::{InningsId, Over, OverId, TimeMs};
use crate::store::StoreError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{decode, expect_row, int, Repository};

fn over_from_row(row: &SqliteRow) -> Result<Over, StoreError> {
    Ok(Over {
        id: decode(row, "id")?,
        innings_id: decode(row, "innings_id")?,
        over_number: int(row, "over_number")?,
        total_runs: int(row, "total_runs")?,
        legal_balls: int(row, "legal_balls")?,
        wickets: int(row, "wickets")?,
        status: decode(row, "status")?,
        created_at: TimeMs::new(row.try_get("created_at")?),
    })
}

/// Insert an over inside an open transaction.
pub(super) async fn insert_over_tx(
    tx: &mut Transaction<'_, Sqlite>,
    over: &Over,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO overs (
            id, innings_id, over_number, total_runs, legal_balls, wickets, status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(over.id.to_string())
    .bind(over.innings_id.to_string())
    .bind(i64::from(over.over_number))
    .bind(i64::from(over.total_runs))
    .bind(i64::from(over.legal_balls))
    .bind(i64::from(over.wickets))
    .bind(over.status.as_str())
    .bind(over.created_at.as_i64())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl Repository {
    pub(super) async fn fetch_over(&self, id: OverId) -> Result<Over, StoreError> {
        let row = sqlx::query("SELECT * FROM overs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => over_from_row(&row),
            None => Err(StoreError::NotFound(format!("over {}", id))),
        }
    }

    pub(super) async fn query_overs(&self, innings_id: InningsId) -> Result<Vec<Over>, StoreError> {
        let rows = sqlx::query("SELECT * FROM overs WHERE innings_id = ? ORDER BY over_number ASC")
            .bind(innings_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(over_from_row).collect()
    }

    pub(super) async fn store_over(&self, over: &Over) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE overs
            SET total_runs = ?, legal_balls = ?, wickets = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(i64::from(over.total_runs))
        .bind(i64::from(over.legal_balls))
        .bind(i64::from(over.wickets))
        .bind(over.status.as_str())
        .bind(over.id.to_string())
        .execute(&self.pool)
        .await?;

        expect_row(result.rows_affected(), format!("over {}", over.id))
    }

    /// Delete an over; its balls go with it through the cascade.
    pub(super) async fn remove_over(&self, id: OverId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM overs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        expect_row(result.rows_affected(), format!("over {}", id))
    }
}
