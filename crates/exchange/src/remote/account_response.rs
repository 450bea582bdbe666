use common::errors::ExchangeError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountInformation {
    pub balances: Vec<Balance>,
    #[serde(rename = "canTrade")]
    pub can_trade: bool,
}

impl AccountInformation {
    /// Free amount of `asset`. Binance omits assets the account never held, those count as 0.
    pub fn free_balance(&self, asset: &str) -> Result<f64, ExchangeError> {
        let Some(balance) = self
            .balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
        else {
            return Ok(0.0);
        };

        balance.free.parse::<f64>().map_err(|_| {
            ExchangeError::Decode(format!(
                "free balance {:?} for {} is not a number",
                balance.free, balance.asset
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_JSON: &str = r#"{
        "makerCommission": 15,
        "canTrade": true,
        "canWithdraw": true,
        "balances": [
            {"asset": "BTC", "free": "0.05000000", "locked": "0.00000000"},
            {"asset": "USDT", "free": "500.00000000", "locked": "12.50000000"},
            {"asset": "BAD", "free": "n/a", "locked": "0"}
        ]
    }"#;

    #[test]
    fn test_free_balance_lookup() {
        let info: AccountInformation = serde_json::from_str(ACCOUNT_JSON).unwrap();

        assert!(info.can_trade);
        assert_eq!(info.free_balance("USDT").unwrap(), 500.0);
        assert_eq!(info.free_balance("btc").unwrap(), 0.05);
        assert_eq!(info.free_balance("ETH").unwrap(), 0.0);
        assert!(matches!(
            info.free_balance("BAD"),
            Err(ExchangeError::Decode(_))
        ));
    }
}
