use common::errors::{ExchangeError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid signal: {0}")]
    Validation(String),
    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),
    #[error("balance query for {asset} failed: {source}")]
    ExchangeQuery {
        asset: String,
        #[source]
        source: ExchangeError,
    },
    #[error("insufficient {asset} balance: {available} available, {required} required")]
    InsufficientFunds {
        asset: String,
        available: f64,
        required: f64,
    },
    #[error("order submission failed: {0}")]
    ExchangeSubmission(#[source] ExchangeError),
}

impl EngineError {
    /// Rejections caused by the signal or the account rather than by a system fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InsufficientFunds { .. })
    }
}
