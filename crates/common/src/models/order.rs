use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(Self::Market),
            other => Err(format!("unsupported order type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub signal_id: Uuid,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: f64,
    pub price: f64, // reference only, a market order ignores it
    pub exchange_order_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn market(signal: &Signal, side: OrderSide, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            signal_id: signal.id,
            symbol: signal.symbol.clone(),
            side,
            order_type: OrderType::Market,
            amount,
            price: signal.price,
            exchange_order_id: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Venue acknowledgement for a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub exchange_order_id: String,
    pub venue_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncomingSignal, SignalAction};

    #[test]
    fn test_market_order_links_signal() {
        let signal = Signal::receive(IncomingSignal {
            symbol: "BTC/USDT".into(),
            action: SignalAction::Sell,
            price: 50_000.0,
            score: -0.5,
        });
        let order = Order::market(&signal, OrderSide::Sell, 0.05);

        assert_eq!(order.signal_id, signal.id);
        assert_ne!(order.id, signal.id);
        assert_eq!(order.symbol, "BTC/USDT");
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.price, 50_000.0);
        assert!(order.exchange_order_id.is_none());
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    }
}
