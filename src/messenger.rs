use futures::future::BoxFuture;

use crate::bot::Reply;
use crate::error::AppError;

/// Outbound side of the chat transport.
pub trait Messenger: Send + Sync {
    fn deliver<'a>(&'a self, chat_id: i64, reply: &'a Reply) -> BoxFuture<'a, Result<(), AppError>>;

    /// Confirms a button press so the client stops showing a spinner
    fn acknowledge<'a>(&'a self, _callback_id: &'a str) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Used when no bot token is configured: messages only reach the log.
#[derive(Debug, Default, Clone)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn deliver<'a>(
        &'a self,
        chat_id: i64,
        reply: &'a Reply,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            match reply {
                Reply::Text { text, .. } => log::info!("[to {}] {}", chat_id, text),
                Reply::Document { file_name, .. } => {
                    log::info!("[to {}] document {}", chat_id, file_name)
                }
            }
            Ok(())
        })
    }
}
