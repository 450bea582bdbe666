pub mod remote;

pub use remote::{BinanceClient, BinanceConfig};
