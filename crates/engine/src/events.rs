use std::fmt;

use common::models::OrderSide;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Signal,
    Order,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal => f.write_str("signal"),
            Self::Order => f.write_str("order"),
        }
    }
}

/// Published by the signal service for out-of-band observers (notifications, audits).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    OrderExecuted {
        signal_id: Uuid,
        order_id: Uuid,
        symbol: String,
        side: OrderSide,
        amount: f64,
        exchange_order_id: String,
        venue_status: String,
    },
    /// A bookkeeping write on an early-exit path failed; the signal's own result was still returned.
    StatusWriteFailed {
        entity: Entity,
        id: Uuid,
        status: &'static str,
        error: String,
    },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderExecuted {
                symbol,
                side,
                amount,
                exchange_order_id,
                venue_status,
                ..
            } => write!(
                f,
                "Order executed: {} {} {} (exchange id {}, {})",
                side, amount, symbol, exchange_order_id, venue_status
            ),
            Self::StatusWriteFailed {
                entity,
                id,
                status,
                error,
            } => write!(
                f,
                "Could not mark {} {} as {}: {}",
                entity, id, status, error
            ),
        }
    }
}
