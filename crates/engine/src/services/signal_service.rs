use std::sync::Arc;

use common::errors::ExchangeError;
use common::models::{IncomingSignal, Order, OrderStatus, Signal, SignalStatus};
use common::ports::{ExchangePort, SignalRepository};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EnginePolicy;
use crate::error::EngineError;
use crate::events::{EngineEvent, Entity};
use crate::pair::TradingPair;
use crate::sizing::{SizingError, validate_price};

/// How many signals `get_all_signals` returns.
pub const HISTORY_LIMIT: u32 = 100;

/// Venue status assumed when the exchange acknowledges an order without one.
const DEFAULT_VENUE_STATUS: &str = "OPEN";

#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Ignored {
        signal_id: Uuid,
    },
    Executed {
        signal_id: Uuid,
        order: Order,
        venue_status: String,
    },
}

impl SignalOutcome {
    pub fn signal_id(&self) -> Uuid {
        match self {
            Self::Ignored { signal_id } | Self::Executed { signal_id, .. } => *signal_id,
        }
    }
}

/// Turns signals into sized market orders and keeps signal/order status in step.
///
/// Every signal runs through one sequential chain of store and exchange calls.
/// Nothing here serialises concurrent signals on the same asset: two of them can
/// size off the same balance read.
pub struct SignalService {
    store: Arc<dyn SignalRepository>,
    exchange: Arc<dyn ExchangePort>,
    policy: EnginePolicy,
    event_tx: Option<broadcast::Sender<EngineEvent>>,
}

impl SignalService {
    pub fn new(
        store: Arc<dyn SignalRepository>,
        exchange: Arc<dyn ExchangePort>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            store,
            exchange,
            policy,
            event_tx: None,
        }
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<EngineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    pub async fn process_signal(
        &self,
        incoming: IncomingSignal,
    ) -> Result<SignalOutcome, EngineError> {
        let signal = Signal::receive(incoming);

        info!(
            "New signal {}: {} {} price={:.2} score={:.4}",
            signal.id, signal.action, signal.symbol, signal.price, signal.score
        );

        self.store
            .save_signal(&signal)
            .await
            .map_err(EngineError::Persistence)?;

        let Some(side) = self.policy.actionable_side(signal.action, signal.score) else {
            info!(
                "Signal {} ignored (action={}, score={:.4})",
                signal.id, signal.action, signal.score
            );
            self.mark_signal(signal.id, SignalStatus::Ignored).await;
            return Ok(SignalOutcome::Ignored {
                signal_id: signal.id,
            });
        };

        if let Err(reason) = validate_price(signal.price) {
            return Err(self
                .reject(signal.id, SignalStatus::Failed, EngineError::Validation(reason))
                .await);
        }

        let Some(pair) = TradingPair::parse(&signal.symbol, &self.policy.quote_assets) else {
            let reason = format!("cannot resolve base/quote assets of {}", signal.symbol);
            return Err(self
                .reject(signal.id, SignalStatus::Failed, EngineError::Validation(reason))
                .await);
        };
        let asset = pair.balance_asset(side).to_string();

        let balance = match self.exchange.check_balance(&asset).await {
            Ok(balance) if balance.is_finite() => balance,
            Ok(balance) => {
                let source = ExchangeError::Decode(format!("non-finite balance {balance}"));
                return Err(self
                    .reject(
                        signal.id,
                        SignalStatus::Failed,
                        EngineError::ExchangeQuery { asset, source },
                    )
                    .await);
            }
            Err(source) => {
                return Err(self
                    .reject(
                        signal.id,
                        SignalStatus::Failed,
                        EngineError::ExchangeQuery { asset, source },
                    )
                    .await);
            }
        };

        let amount = match self.policy.size_order(side, balance, signal.price) {
            Ok(amount) => amount,
            Err(SizingError::Shortfall { required }) => {
                warn!(
                    "Signal {} rejected: {} balance {} below policy minimum {}",
                    signal.id, asset, balance, required
                );
                let err = EngineError::InsufficientFunds {
                    asset,
                    available: balance,
                    required,
                };
                return Err(self
                    .reject(signal.id, SignalStatus::RejectedNoFunds, err)
                    .await);
            }
            Err(SizingError::InvalidAmount(amount)) => {
                let reason = format!(
                    "sized amount {} for {} at price {} is not an orderable quantity",
                    amount, signal.symbol, signal.price
                );
                return Err(self
                    .reject(signal.id, SignalStatus::Failed, EngineError::Validation(reason))
                    .await);
            }
        };

        let order = Order::market(&signal, side, amount);
        if let Err(e) = self.store.save_order(&order).await {
            return Err(self
                .reject(signal.id, SignalStatus::Failed, EngineError::Persistence(e))
                .await);
        }

        self.submit(&signal, order).await
    }

    pub async fn get_all_signals(&self) -> Result<Vec<Signal>, EngineError> {
        self.store
            .get_all_signals(HISTORY_LIMIT)
            .await
            .map_err(EngineError::Persistence)
    }

    async fn submit(&self, signal: &Signal, mut order: Order) -> Result<SignalOutcome, EngineError> {
        info!(
            "Submitting order {}: {} {} {}",
            order.id, order.side, order.amount, order.symbol
        );

        let report = match self.exchange.execute_order(&order).await {
            Ok(report) => report,
            Err(e) => {
                error!("ORDER FAILED: {} ({})", order.id, e);
                self.mark_order(order.id, OrderStatus::Failed).await;
                return Err(self
                    .reject(signal.id, SignalStatus::Failed, EngineError::ExchangeSubmission(e))
                    .await);
            }
        };

        let venue_status = report
            .venue_status
            .unwrap_or_else(|| DEFAULT_VENUE_STATUS.to_string());

        self.store
            .set_exchange_order_id(order.id, &report.exchange_order_id)
            .await
            .map_err(EngineError::Persistence)?;
        self.store
            .update_order_status(order.id, OrderStatus::Completed)
            .await
            .map_err(EngineError::Persistence)?;
        self.store
            .update_signal_status(signal.id, SignalStatus::Completed)
            .await
            .map_err(EngineError::Persistence)?;

        order.exchange_order_id = Some(report.exchange_order_id.clone());
        order.status = OrderStatus::Completed;

        info!(
            "ORDER EXECUTED: order={} exchange_id={} venue_status={}",
            order.id, report.exchange_order_id, venue_status
        );
        self.publish(EngineEvent::OrderExecuted {
            signal_id: signal.id,
            order_id: order.id,
            symbol: order.symbol.clone(),
            side: order.side,
            amount: order.amount,
            exchange_order_id: report.exchange_order_id,
            venue_status: venue_status.clone(),
        });

        Ok(SignalOutcome::Executed {
            signal_id: signal.id,
            order,
            venue_status,
        })
    }

    /// Records `status` for the signal and hands back `err` untouched.
    async fn reject(&self, signal_id: Uuid, status: SignalStatus, err: EngineError) -> EngineError {
        self.mark_signal(signal_id, status).await;
        err
    }

    async fn mark_signal(&self, id: Uuid, status: SignalStatus) {
        if let Err(e) = self.store.update_signal_status(id, status).await {
            error!("Failed to mark signal {} as {}: {}", id, status, e);
            self.publish(EngineEvent::StatusWriteFailed {
                entity: Entity::Signal,
                id,
                status: status.as_str(),
                error: e.to_string(),
            });
        }
    }

    async fn mark_order(&self, id: Uuid, status: OrderStatus) {
        if let Err(e) = self.store.update_order_status(id, status).await {
            error!("Failed to mark order {} as {}: {}", id, status, e);
            self.publish(EngineEvent::StatusWriteFailed {
                entity: Entity::Order,
                id,
                status: status.as_str(),
                error: e.to_string(),
            });
        }
    }

    fn publish(&self, event: EngineEvent) {
        if let Some(tx) = &self.event_tx {
            // no subscribers is fine
            let _ = tx.send(event);
        }
    }
}

impl std::fmt::Debug for SignalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalService")
            .field("policy", &self.policy)
            .field("notifier", &self.event_tx.is_some())
            .finish()
    }
}
