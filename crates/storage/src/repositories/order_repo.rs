use chrono::{DateTime, Utc};
use common::errors::StoreError;
use common::models::{Order, OrderStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_column;

const ORDER_COLUMNS: &str = "id, signal_id, symbol, side, order_type, amount, price, \
                             exchange_order_id, status, created_at";

pub struct OrdersRepository;

impl OrdersRepository {
    pub async fn insert(pool: &SqlitePool, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
                INSERT INTO orders (
                    id, signal_id, symbol, side, order_type, amount, price,
                    exchange_order_id, status, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(order.signal_id.to_string())
        .bind(&order.symbol)
        .bind(order.side.as_str())
        .bind(order.order_type.as_str())
        .bind(order.amount)
        .bind(order.price)
        .bind(order.exchange_order_id.as_deref())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(pool)
            .await
            .map_err(StoreError::backend)?;

        ensure_found(result.rows_affected(), id)
    }

    pub async fn set_exchange_order_id(
        pool: &SqlitePool,
        id: Uuid,
        exchange_order_id: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE orders SET exchange_order_id = ? WHERE id = ?")
            .bind(exchange_order_id)
            .bind(id.to_string())
            .execute(pool)
            .await
            .map_err(StoreError::backend)?;

        ensure_found(result.rows_affected(), id)
    }

    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(|r| from_row(&r)).transpose()
    }

    pub async fn for_signal(pool: &SqlitePool, signal_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE signal_id = ? ORDER BY created_at"
        ))
        .bind(signal_id.to_string())
        .fetch_all(pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(from_row).collect()
    }
}

fn ensure_found(rows_affected: u64, id: Uuid) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound {
            entity: "order",
            id: id.to_string(),
        });
    }
    Ok(())
}

fn from_row(row: &SqliteRow) -> Result<Order, StoreError> {
    let id: String = row.try_get("id").map_err(StoreError::backend)?;
    let signal_id: String = row.try_get("signal_id").map_err(StoreError::backend)?;
    let side: String = row.try_get("side").map_err(StoreError::backend)?;
    let order_type: String = row.try_get("order_type").map_err(StoreError::backend)?;
    let status: String = row.try_get("status").map_err(StoreError::backend)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(StoreError::backend)?;

    Ok(Order {
        id: parse_column("orders.id", id)?,
        signal_id: parse_column("orders.signal_id", signal_id)?,
        symbol: row.try_get("symbol").map_err(StoreError::backend)?,
        side: parse_column("orders.side", side)?,
        order_type: parse_column("orders.order_type", order_type)?,
        amount: row.try_get("amount").map_err(StoreError::backend)?,
        price: row.try_get("price").map_err(StoreError::backend)?,
        exchange_order_id: row
            .try_get("exchange_order_id")
            .map_err(StoreError::backend)?,
        status: parse_column("orders.status", status)?,
        created_at,
    })
}
