use async_trait::async_trait;
use common::errors::StoreError;
use common::models::{Order, OrderStatus, Signal, SignalStatus};
use common::ports::SignalRepository;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::repositories::{OrdersRepository, SignalsRepository};

/// SQLite-backed persistence port.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SignalRepository for SqliteStore {
    async fn save_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        SignalsRepository::insert(&self.pool, signal).await?;
        debug!("Stored signal {} ({})", signal.id, signal.status);
        Ok(())
    }

    async fn update_signal_status(
        &self,
        id: Uuid,
        status: SignalStatus,
    ) -> Result<(), StoreError> {
        SignalsRepository::update_status(&self.pool, id, status).await?;
        debug!("Signal {} -> {}", id, status);
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), StoreError> {
        OrdersRepository::insert(&self.pool, order).await?;
        debug!("Stored order {} for signal {}", order.id, order.signal_id);
        Ok(())
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), StoreError> {
        OrdersRepository::update_status(&self.pool, id, status).await?;
        debug!("Order {} -> {}", id, status);
        Ok(())
    }

    async fn set_exchange_order_id(
        &self,
        id: Uuid,
        exchange_order_id: &str,
    ) -> Result<(), StoreError> {
        OrdersRepository::set_exchange_order_id(&self.pool, id, exchange_order_id).await
    }

    async fn get_all_signals(&self, limit: u32) -> Result<Vec<Signal>, StoreError> {
        SignalsRepository::latest(&self.pool, limit).await
    }
}
