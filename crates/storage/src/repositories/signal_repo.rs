use chrono::{DateTime, Utc};
use common::errors::StoreError;
use common::models::{Signal, SignalStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_column;

pub struct SignalsRepository;

impl SignalsRepository {
    pub async fn insert(pool: &SqlitePool, signal: &Signal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
                INSERT INTO signals (
                    id, symbol, action, price, score, status, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(signal.id.to_string())
        .bind(&signal.symbol)
        .bind(signal.action.as_str())
        .bind(signal.price)
        .bind(signal.score)
        .bind(signal.status.as_str())
        .bind(signal.created_at)
        .execute(pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: SignalStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE signals SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "signal",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<Option<Signal>, StoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, symbol, action, price, score, status, created_at
                FROM signals WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(|r| from_row(&r)).transpose()
    }

    pub async fn latest(pool: &SqlitePool, limit: u32) -> Result<Vec<Signal>, StoreError> {
        let rows = sqlx::query(
            r#"
                SELECT id, symbol, action, price, score, status, created_at
                FROM signals
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(from_row).collect()
    }
}

fn from_row(row: &SqliteRow) -> Result<Signal, StoreError> {
    let id: String = row.try_get("id").map_err(StoreError::backend)?;
    let action: String = row.try_get("action").map_err(StoreError::backend)?;
    let status: String = row.try_get("status").map_err(StoreError::backend)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(StoreError::backend)?;

    Ok(Signal {
        id: parse_column("signals.id", id)?,
        symbol: row.try_get("symbol").map_err(StoreError::backend)?,
        action: parse_column("signals.action", action)?,
        price: row.try_get("price").map_err(StoreError::backend)?,
        score: row.try_get("score").map_err(StoreError::backend)?,
        status: parse_column("signals.status", status)?,
        created_at,
    })
}
