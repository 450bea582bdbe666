pub mod telegram_service;

pub use telegram_service::TelegramService;
