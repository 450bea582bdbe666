use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{ExchangeError, StoreError};
use crate::models::{ExecutionReport, Order, OrderStatus, Signal, SignalStatus};

/// Durable record of signals, orders and their status transitions.
/// Implementations make no trading decisions.
#[async_trait]
pub trait SignalRepository: Send + Sync {
    async fn save_signal(&self, signal: &Signal) -> Result<(), StoreError>;

    async fn update_signal_status(&self, id: Uuid, status: SignalStatus)
    -> Result<(), StoreError>;

    async fn save_order(&self, order: &Order) -> Result<(), StoreError>;

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), StoreError>;

    async fn set_exchange_order_id(
        &self,
        id: Uuid,
        exchange_order_id: &str,
    ) -> Result<(), StoreError>;

    /// Newest first, at most `limit` rows.
    async fn get_all_signals(&self, limit: u32) -> Result<Vec<Signal>, StoreError>;
}

/// Trading venue access. Knows nothing about signals.
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Free balance of `asset`; an asset the account does not hold reports 0.
    async fn check_balance(&self, asset: &str) -> Result<f64, ExchangeError>;

    async fn execute_order(&self, order: &Order) -> Result<ExecutionReport, ExchangeError>;
}
