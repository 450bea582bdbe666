use async_trait::async_trait;
use common::errors::ExchangeError;
use common::models::{ExecutionReport, Order, OrderSide};
use common::ports::ExchangePort;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

use super::account_response::AccountInformation;
use super::config::BinanceConfig;
use super::order_response::{OrderResponse, rejection};

type HmacSha256 = Hmac<Sha256>;

const QUANTITY_DECIMALS: usize = 8;

/// Binance spot REST client, signed endpoints only.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    config: BinanceConfig,
}

impl BinanceClient {
    pub fn new(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent("signal_trader_bot/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ExchangeError::transport)?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn sign(&self, query: &str) -> String {
        sign_query(&self.config.secret_key, query)
    }

    fn signed_query(&self, params: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        let mut query = String::from(params);
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!(
            "recvWindow={}&timestamp={}",
            self.config.recv_window, timestamp
        ));

        let signature = self.sign(&query);
        format!("{}&signature={}", query, signature)
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &str,
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}?{}", self.config.base_url, path, self.signed_query(params));

        let resp = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(ExchangeError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.map_err(ExchangeError::transport)?;
            error!("Binance {} failed ({}): {}", path, status, error_text);
            return Err(rejection(status.as_u16(), &error_text));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ExchangeError::Decode(format!("{}: {}", path, e)))
    }

    pub async fn get_account(&self) -> Result<AccountInformation, ExchangeError> {
        self.send_signed(Method::GET, "/api/v3/account", "omitZeroBalances=true")
            .await
    }

    pub async fn post_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
        client_order_id: &str,
    ) -> Result<OrderResponse, ExchangeError> {
        let params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}&newClientOrderId={}&newOrderRespType=RESULT",
            exchange_symbol(symbol),
            side.as_str().to_uppercase(),
            format_quantity(quantity)?,
            client_order_id
        );

        info!("Placing Order: {} {} {}", side, quantity, symbol);

        self.send_signed(Method::POST, "/api/v3/order", &params)
            .await
    }
}

#[async_trait]
impl ExchangePort for BinanceClient {
    async fn check_balance(&self, asset: &str) -> Result<f64, ExchangeError> {
        let account = self.get_account().await?;
        let free = account.free_balance(asset)?;
        debug!("Balance {}: free={}", asset, free);
        Ok(free)
    }

    async fn execute_order(&self, order: &Order) -> Result<ExecutionReport, ExchangeError> {
        let client_order_id = order.id.simple().to_string();
        let resp = self
            .post_order(&order.symbol, order.side, order.amount, &client_order_id)
            .await?;

        info!(
            "ORDER ACCEPTED: ID={}, Status={:?}, Executed={:?}",
            resp.order_id, resp.status, resp.executed_qty
        );

        Ok(ExecutionReport {
            exchange_order_id: resp.order_id.to_string(),
            venue_status: resp.status,
        })
    }
}

pub fn sign_query(secret_key: &str, query: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// `BTC/USDT`, `btc-usdt` and `BTCUSDT` all become `BTCUSDT`.
pub fn exchange_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Truncates (never rounds up) to 8 decimals so a full-balance sell cannot exceed the balance.
/// Quantities that would reach the venue as zero are refused here.
pub fn format_quantity(quantity: f64) -> Result<String, ExchangeError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ExchangeError::InvalidOrder(format!("quantity {}", quantity)));
    }

    // Display prints the shortest round-trip decimal, never an exponent
    let full = quantity.to_string();
    let truncated = match full.split_once('.') {
        Some((int, frac)) if frac.len() > QUANTITY_DECIMALS => {
            format!("{}.{}", int, &frac[..QUANTITY_DECIMALS])
        }
        _ => full,
    };
    let trimmed = if truncated.contains('.') {
        truncated.trim_end_matches('0').trim_end_matches('.')
    } else {
        truncated.as_str()
    };

    if trimmed == "0" {
        return Err(ExchangeError::InvalidOrder(format!(
            "quantity {} is below the {}-decimal step",
            quantity, QUANTITY_DECIMALS
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_matches_binance_docs() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            sign_query(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_layout() {
        let client = BinanceClient::new(BinanceConfig {
            api_key: "key".into(),
            secret_key: "secret".into(),
            base_url: "http://localhost".into(),
            recv_window: 5000,
        })
        .unwrap();

        let query = client.signed_query("symbol=BTCUSDT");
        let (payload, signature) = query.rsplit_once("&signature=").unwrap();

        assert!(payload.starts_with("symbol=BTCUSDT&recvWindow=5000&timestamp="));
        assert_eq!(signature, sign_query("secret", payload));
        assert!(client.signed_query("").starts_with("recvWindow=5000&"));
    }

    #[test]
    fn test_exchange_symbol() {
        assert_eq!(exchange_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(exchange_symbol("eth-usdt"), "ETHUSDT");
        assert_eq!(exchange_symbol("SOLUSDT"), "SOLUSDT");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(0.005).unwrap(), "0.005");
        assert_eq!(format_quantity(0.01).unwrap(), "0.01");
        assert_eq!(format_quantity(0.29).unwrap(), "0.29");
        assert_eq!(format_quantity(2.0).unwrap(), "2");
        assert_eq!(format_quantity(20.0).unwrap(), "20");
        assert_eq!(format_quantity(0.00000001).unwrap(), "0.00000001");
        assert_eq!(format_quantity(0.123456789).unwrap(), "0.12345678");
    }

    #[test]
    fn test_format_quantity_never_rounds_up() {
        assert_eq!(format_quantity(0.1234567899).unwrap(), "0.12345678");
        assert_eq!(format_quantity(0.999999999).unwrap(), "0.99999999");
    }

    #[test]
    fn test_format_quantity_refuses_unorderable_amounts() {
        for quantity in [0.0, -1.0, 0.000000005, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(format_quantity(quantity), Err(ExchangeError::InvalidOrder(_))),
                "{quantity} was accepted"
            );
        }
    }
}
