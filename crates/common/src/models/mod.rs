pub mod order;
pub mod signal;

pub use order::{ExecutionReport, Order, OrderSide, OrderStatus, OrderType};
pub use signal::{IncomingSignal, Signal, SignalAction, SignalStatus};
