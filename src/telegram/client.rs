use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use super::types::{ApiResponse, Update};
use crate::bot::{Keyboard, Reply};
use crate::error::AppError;
use crate::messenger::Messenger;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
// Must outlast the long-poll timeout of getUpdates
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Thin Bot API client over reqwest.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::MessengerError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, AppError> {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        Self::unwrap_result(method, response).await
    }

    async fn unwrap_result<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope.result {
            Some(result) if envelope.ok => Ok(result),
            _ => Err(AppError::MessengerError(format!(
                "{} failed with {}: {}",
                method,
                status,
                envelope.description.unwrap_or_default()
            ))),
        }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), AppError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = reply_markup(keyboard);
        }

        self.call::<Value>("sendMessage", &body).await?;
        Ok(())
    }

    pub async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), AppError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(XLSX_MIME)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .http
            .post(format!("{}/sendDocument", self.base_url))
            .multipart(form)
            .send()
            .await?;

        Self::unwrap_result::<Value>("sendDocument", response).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<(), AppError> {
        self.call::<Value>(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, AppError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), AppError> {
        match reply {
            Reply::Text { text, keyboard } => {
                self.send_message(chat_id, text, keyboard.as_ref()).await
            }
            Reply::Document {
                file_name,
                bytes,
                caption,
            } => {
                self.send_document(chat_id, file_name, bytes.clone(), caption)
                    .await
            }
        }
    }
}

impl Messenger for TelegramClient {
    fn deliver<'a>(
        &'a self,
        chat_id: i64,
        reply: &'a Reply,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(self.send_reply(chat_id, reply))
    }

    fn acknowledge<'a>(&'a self, callback_id: &'a str) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(self.answer_callback_query(callback_id))
    }
}

fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Menu(rows) => json!({
            "keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.text, "request_location": b.request_location }))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Inline(rows) => json!({
            "inline_keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.text, "callback_data": b.data }))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
        }),
        Keyboard::Remove => json!({ "remove_keyboard": true }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inline_keyboard_uses_callback_data() {
        let markup = reply_markup(&Keyboard::advance_decision(5));
        assert_eq!(
            markup["inline_keyboard"][0][0],
            json!({ "text": "Approve", "callback_data": "advance:approve:5" })
        );
    }

    #[test]
    fn worker_menu_requests_location() {
        let markup = reply_markup(&Keyboard::worker_menu());
        assert_eq!(markup["keyboard"][1][0]["request_location"], json!(true));
        assert_eq!(markup["resize_keyboard"], json!(true));
    }

    #[test]
    fn token_is_part_of_the_base_url() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:abc").unwrap();
        assert_eq!(client.base_url, "https://api.telegram.org/bot123:abc");
    }
}
