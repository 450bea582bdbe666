use engine::EngineEvent;
use teloxide::prelude::*;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::TelegramConfig;

pub struct TelegramService {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            bot: Bot::new(config.token),
            chat_id: ChatId(config.chat_id),
        }
    }

    pub async fn start(self, mut rx: broadcast::Receiver<EngineEvent>) {
        info!("Starting Telegram Notification Service");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    // a failed notification must not take the service down
                    if let Err(e) = self.bot.send_message(self.chat_id, event.to_string()).await {
                        error!("Failed to send Telegram message: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    error!("Telegram service lagged behind. Missed {} events.", n);
                }
                Err(_) => {
                    info!("Engine event channel closed. Stopping service.");
                    break;
                }
            }
        }
    }
}
