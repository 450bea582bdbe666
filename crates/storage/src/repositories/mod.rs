pub mod order_repo;
pub mod signal_repo;

pub use order_repo::OrdersRepository;
pub use signal_repo::SignalsRepository;

use common::errors::StoreError;
use std::str::FromStr;

pub(crate) fn parse_column<T: FromStr>(column: &'static str, value: String) -> Result<T, StoreError> {
    value
        .parse::<T>()
        .map_err(|_| StoreError::Corrupt { column, value })
}
