use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use common::logger;
use engine::{EngineEvent, EnginePolicy, SignalService};
use exchange::{BinanceClient, BinanceConfig};
use storage::SqliteStore;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::services::TelegramService;

mod api;
mod config;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let app_config = AppConfig::from_env().context("loading service configuration")?;
    let policy = EnginePolicy::from_env().context("loading engine policy")?;
    let binance_config = BinanceConfig::from_env().context("loading Binance configuration")?;

    let pool = storage::db::connect(&app_config.workdir)
        .await
        .context("opening signal database")?;
    let store = SqliteStore::new(pool);

    if binance_config.is_testnet() {
        info!("Using Binance TESTNET at {}", binance_config.base_url);
    } else {
        warn!("Using Binance MAINNET at {}", binance_config.base_url);
    }
    let client = BinanceClient::new(binance_config).context("building Binance client")?;

    match client.get_account().await {
        Ok(account) => {
            info!("Connected to Binance. Can trade: {}", account.can_trade);
            for balance in account.balances.iter().filter(|b| {
                b.free.parse::<f64>().unwrap_or(0.0) > 0.0
                    || b.locked.parse::<f64>().unwrap_or(0.0) > 0.0
            }) {
                info!(
                    "Balance {}: free {} locked {}",
                    balance.asset, balance.free, balance.locked
                );
            }
        }
        Err(e) => warn!("Could not fetch initial account information: {}", e),
    }

    let (event_tx, _) = broadcast::channel::<EngineEvent>(1_000);

    if let Some(telegram) = app_config.telegram.clone() {
        let rx = event_tx.subscribe();
        tokio::spawn(TelegramService::new(telegram).start(rx));
    } else {
        info!("Telegram notifications disabled");
    }

    let service = SignalService::new(Arc::new(store), Arc::new(client), policy)
        .with_notifier(event_tx);
    let app = api::router(AppState::new(service));

    let addr = format!("0.0.0.0:{}", app_config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Signal API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP API")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
