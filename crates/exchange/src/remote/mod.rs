pub mod account_response;
pub mod binance_client;
pub mod config;
pub mod order_response;

pub use account_response::{AccountInformation, Balance};
pub use binance_client::BinanceClient;
pub use config::BinanceConfig;
pub use order_response::{ApiErrorResponse, OrderResponse};
