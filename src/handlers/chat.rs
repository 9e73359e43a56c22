use actix_web::{HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::bot::{Incoming, IncomingKind, Keyboard, Reply};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
}

/// One chat message sent straight to the bot, bypassing Telegram
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub chat_id: Option<i64>,
    pub account_id: i64,
    pub sender_name: Option<String>,
    pub text: Option<String>,
    pub callback_data: Option<String>,
    pub location: Option<LocationInput>,
}

impl ChatRequest {
    fn into_incoming(self) -> Result<Incoming, AppError> {
        let kind = match (self.text, self.callback_data, self.location) {
            (Some(text), None, None) => IncomingKind::Text(text),
            (None, Some(data), None) => IncomingKind::Callback {
                query_id: None,
                data,
            },
            (None, None, Some(location)) => IncomingKind::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            },
            _ => {
                return Err(AppError::validation(
                    "Exactly one of text, callback_data or location is required",
                ));
            }
        };

        Ok(Incoming {
            chat_id: self.chat_id.unwrap_or(self.account_id),
            account_id: self.account_id,
            sender_name: self.sender_name,
            kind,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyView {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Document {
        file_name: String,
        caption: String,
        content_base64: String,
    },
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Text { text, keyboard } => ReplyView::Text { text, keyboard },
            Reply::Document {
                file_name,
                bytes,
                caption,
            } => ReplyView::Document {
                file_name,
                caption,
                content_base64: STANDARD.encode(bytes),
            },
        }
    }
}

pub async fn send_message(
    state: web::Data<AppState>,
    input: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    if !state.config.chat_endpoint_enabled() {
        return Err(AppError::NotFound(
            "The chat endpoint is disabled in production".to_string(),
        ));
    }

    let incoming = input.into_inner().into_incoming()?;
    let replies: Vec<ReplyView> = state
        .bot
        .handle(&incoming)
        .await
        .into_iter()
        .map(ReplyView::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(replies)))
}
