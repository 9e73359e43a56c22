pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::bot::{Bot, IncomingKind};
use crate::messenger::Messenger;

pub use client::TelegramClient;
pub use types::Update;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Runs one update through the bot and sends the answers back to its chat
pub async fn handle_update(bot: &Bot, messenger: &dyn Messenger, update: Update) {
    let update_id = update.update_id;
    let Some(incoming) = update.into_incoming() else {
        log::debug!("Ignoring update {}", update_id);
        return;
    };

    if let IncomingKind::Callback {
        query_id: Some(query_id),
        ..
    } = &incoming.kind
    {
        if let Err(err) = messenger.acknowledge(query_id).await {
            log::warn!("Failed to answer callback {}: {}", query_id, err);
        }
    }

    for reply in bot.handle(&incoming).await {
        if let Err(err) = messenger.deliver(incoming.chat_id, &reply).await {
            log::error!("Failed to reply to chat {}: {}", incoming.chat_id, err);
        }
    }
}

/// Long-polling loop used when no webhook is registered
pub async fn run_polling(client: Arc<TelegramClient>, bot: Bot) {
    log::info!("Telegram long polling started");
    let mut offset = 0;

    loop {
        match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    handle_update(&bot, client.as_ref(), update).await;
                }
            }
            Err(err) => {
                log::error!("getUpdates failed: {}", err);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
