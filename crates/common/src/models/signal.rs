use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl FromStr for SignalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            "HOLD" => Ok(Self::Hold),
            other => Err(format!("unknown signal action: {other}")),
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    Pending,
    Ignored,
    Failed,
    RejectedNoFunds,
    Completed,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ignored => "IGNORED",
            Self::Failed => "FAILED",
            Self::RejectedNoFunds => "REJECTED_NO_FUNDS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for SignalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IGNORED" => Ok(Self::Ignored),
            "FAILED" => Ok(Self::Failed),
            "REJECTED_NO_FUNDS" => Ok(Self::RejectedNoFunds),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("unknown signal status: {other}")),
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal as handed over by the ingestion layer, before the engine owns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingSignal {
    pub symbol: String,
    pub action: SignalAction,
    pub price: f64,
    pub score: f64, // model confidence, -1.0 ..= 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub symbol: String,
    pub action: SignalAction,
    pub price: f64,
    pub score: f64,
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Takes ownership of an incoming signal: fresh id, PENDING, stamped now.
    pub fn receive(incoming: IncomingSignal) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: incoming.symbol,
            action: incoming.action,
            price: incoming.price,
            score: incoming.score,
            status: SignalStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
