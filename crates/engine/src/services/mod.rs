pub mod signal_service;

pub use signal_service::SignalService;
