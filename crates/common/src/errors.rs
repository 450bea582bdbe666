use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("corrupt value {value:?} in column {column}")]
    Corrupt { column: &'static str, value: String },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("exchange transport error: {0}")]
    Transport(#[source] BoxError),
    #[error("exchange rejected request (http {status}, code {code:?}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("unexpected exchange response: {0}")]
    Decode(String),
    #[error("order not sent: {0}")]
    InvalidOrder(String),
}

impl ExchangeError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(String),
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: String, value: String },
}
