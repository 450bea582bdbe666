use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::models::{IncomingSignal, Signal, SignalAction};
use engine::{EngineError, SignalOutcome};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::AppState;

/// Body of `POST /api/v1/signals` as sent by the signal producer.
#[derive(Debug, Deserialize)]
pub struct SignalPayload {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub action: String,
    pub price: f64,
    #[serde(default)]
    pub score: f64,
}

impl SignalPayload {
    fn validate(self) -> Result<IncomingSignal, String> {
        if self.symbol.trim().is_empty() || self.action.trim().is_empty() {
            return Err("symbol and action are required".to_string());
        }
        let action = self.action.parse::<SignalAction>()?;

        Ok(IncomingSignal {
            symbol: self.symbol.trim().to_string(),
            action,
            price: self.price,
            score: self.score,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub error: bool,
    pub message: String,
}

type ApiResponse = (StatusCode, Json<ApiMessage>);

fn reply(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (
        status,
        Json(ApiMessage {
            error: !status.is_success(),
            message: message.into(),
        }),
    )
}

pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::ExchangeQuery { .. } | EngineError::ExchangeSubmission(_) => {
            StatusCode::BAD_GATEWAY
        }
        EngineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn post_signal(
    State(state): State<AppState>,
    payload: Result<Json<SignalPayload>, JsonRejection>,
) -> ApiResponse {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected malformed signal payload: {}", rejection.body_text());
            return reply(StatusCode::BAD_REQUEST, "invalid JSON payload");
        }
    };

    let incoming = match payload.validate() {
        Ok(incoming) => incoming,
        Err(reason) => return reply(StatusCode::BAD_REQUEST, reason),
    };

    match state.service.process_signal(incoming).await {
        Ok(SignalOutcome::Ignored { signal_id }) => reply(
            StatusCode::OK,
            format!("signal {} received, below confidence threshold", signal_id),
        ),
        Ok(SignalOutcome::Executed { order, .. }) => reply(
            StatusCode::OK,
            format!(
                "signal {} received and order {} sent to the exchange",
                order.signal_id, order.id
            ),
        ),
        Err(e) => {
            if e.is_client_fault() {
                warn!("Signal rejected: {}", e);
            } else {
                error!("Signal processing failed: {}", e);
            }
            reply(status_for(&e), e.to_string())
        }
    }
}

pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<Signal>>, ApiResponse> {
    state.service.get_all_signals().await.map(Json).map_err(|e| {
        error!("History query failed: {}", e);
        reply(StatusCode::INTERNAL_SERVER_ERROR, "could not load signal history")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use common::errors::ExchangeError;
    use common::models::{ExecutionReport, Order, SignalStatus};
    use common::ports::ExchangePort;
    use engine::{EnginePolicy, SignalService};
    use mockall::mock;
    use std::sync::Arc;
    use storage::SqliteStore;
    use storage::db::connect_in_memory;
    use tower::ServiceExt;

    mock! {
        pub Exchange {}

        #[async_trait]
        impl ExchangePort for Exchange {
            async fn check_balance(&self, asset: &str) -> Result<f64, ExchangeError>;
            async fn execute_order(&self, order: &Order) -> Result<ExecutionReport, ExchangeError>;
        }
    }

    async fn app(exchange: MockExchange) -> Router {
        let store = SqliteStore::new(connect_in_memory().await.unwrap());
        let service = SignalService::new(
            Arc::new(store),
            Arc::new(exchange),
            EnginePolicy::default(),
        );
        router(AppState::new(service))
    }

    async fn post(app: &Router, body: &str) -> (StatusCode, ApiMessage) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/signals")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn history(app: &Router) -> (StatusCode, Vec<Signal>) {
        let request = Request::builder()
            .uri("/api/v1/history")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app(MockExchange::new()).await;

        let (status, body) = post(&app, "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error);
    }

    #[tokio::test]
    async fn test_missing_fields_are_bad_request() {
        let app = app(MockExchange::new()).await;

        let (status, body) =
            post(&app, r#"{"symbol": "", "action": "BUY", "price": 1.0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "symbol and action are required");

        let (status, _) = post(&app, r#"{"symbol": "BTC/USDT"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &app,
            r#"{"symbol": "BTC/USDT", "action": "SHORT", "price": 1.0}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("SHORT"));

        // nothing reached the engine
        let (_, signals) = history(&app).await;
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_missing_price_is_bad_request() {
        let app = app(MockExchange::new()).await;

        let (status, body) = post(
            &app,
            r#"{"symbol": "BTC/USDT", "action": "BUY", "score": 0.5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error);
        let (_, signals) = history(&app).await;
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_hold_is_accepted_and_recorded() {
        let app = app(MockExchange::new()).await;

        let (status, body) = post(
            &app,
            r#"{"symbol": "BTC/USDT", "action": "hold", "price": 50000, "score": 0.9}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.error);

        let (status, signals) = history(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].status, SignalStatus::Ignored);
        assert_eq!(signals[0].action, SignalAction::Hold);
    }

    #[tokio::test]
    async fn test_buy_executes_through_exchange() {
        let mut exchange = MockExchange::new();
        exchange.expect_check_balance().returning(|_| Ok(500.0));
        exchange.expect_execute_order().times(1).returning(|_| {
            Ok(ExecutionReport {
                exchange_order_id: "7".to_string(),
                venue_status: Some("FILLED".to_string()),
            })
        });
        let app = app(exchange).await;

        let (status, body) = post(
            &app,
            r#"{"symbol": "BTCUSDT", "action": "BUY", "price": 50000, "score": 0.5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", body.message);
        let (_, signals) = history(&app).await;
        assert_eq!(signals[0].status, SignalStatus::Completed);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_unprocessable() {
        let mut exchange = MockExchange::new();
        exchange.expect_check_balance().returning(|_| Ok(5.0));
        let app = app(exchange).await;

        let (status, body) = post(
            &app,
            r#"{"symbol": "BTC/USDT", "action": "BUY", "price": 50000, "score": 0.5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error);
        let (_, signals) = history(&app).await;
        assert_eq!(signals[0].status, SignalStatus::RejectedNoFunds);
    }

    #[tokio::test]
    async fn test_exchange_failure_is_bad_gateway() {
        let mut exchange = MockExchange::new();
        exchange
            .expect_check_balance()
            .returning(|_| Err(ExchangeError::Decode("boom".into())));
        let app = app(exchange).await;

        let (status, _) = post(
            &app,
            r#"{"symbol": "BTC/USDT", "action": "SELL", "price": 50000, "score": -0.5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
