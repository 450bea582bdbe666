use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use engine::SignalService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SignalService>,
}

impl AppState {
    pub fn new(service: SignalService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]);

    let api = Router::new()
        .route("/signals", post(handlers::post_signal))
        .route("/history", get(handlers::get_history))
        .layer(cors);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
