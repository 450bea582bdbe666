use common::errors::ExchangeError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    pub symbol: String,
    #[serde(rename = "clientOrderId", default)]
    pub client_order_id: Option<String>,
    // absent on ACK responses
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "executedQty", default)]
    pub executed_qty: Option<String>,
    #[serde(rename = "cummulativeQuoteQty", default)]
    pub cummulative_quote_qty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Maps a non-2xx Binance reply to an error, keeping the api code when the body has one.
pub fn rejection(status: u16, body: &str) -> ExchangeError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_error) => ExchangeError::Rejected {
            status,
            code: Some(api_error.code),
            message: api_error.msg,
        },
        Err(_) => ExchangeError::Rejected {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}
