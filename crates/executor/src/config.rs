use common::config::{optional, parse_or, parse_value, required};
use common::errors::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub workdir: String,
    pub port: u16,
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            workdir: required("WORKDIR")?,
            port: parse_or("PORT", 3000)?,
            telegram: telegram_from(
                optional("TELEGRAM_BOT_TOKEN"),
                optional("TELEGRAM_CHAT_ID"),
            )?,
        })
    }
}

/// Notifications are opt-in, but half a configuration is a mistake.
fn telegram_from(
    token: Option<String>,
    chat_id: Option<String>,
) -> Result<Option<TelegramConfig>, ConfigError> {
    match (token, chat_id) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::Missing("TELEGRAM_CHAT_ID".to_string())),
        (None, Some(_)) => Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN".to_string())),
        (Some(token), Some(raw_chat_id)) => Ok(Some(TelegramConfig {
            token,
            chat_id: parse_value("TELEGRAM_CHAT_ID", &raw_chat_id)?,
        })),
    }
}
