pub mod config;
pub mod error;
pub mod events;
pub mod pair;
pub mod services;
pub mod sizing;

pub use config::EnginePolicy;
pub use error::EngineError;
pub use events::EngineEvent;
pub use services::signal_service::{HISTORY_LIMIT, SignalOutcome, SignalService};
