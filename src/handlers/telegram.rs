use actix_web::{HttpRequest, HttpResponse, web};

use crate::AppState;
use crate::error::AppError;
use crate::telegram::{self, Update};

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

pub async fn webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    update: web::Json<Update>,
) -> Result<HttpResponse, AppError> {
    if let Some(expected) = &state.config.webhook_secret {
        let provided = req
            .headers()
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if provided != Some(expected.as_str()) {
            log::warn!("Rejected webhook call with a missing or wrong secret");
            return Err(AppError::Unauthorized);
        }
    }

    telegram::handle_update(&state.bot, state.messenger.as_ref(), update.into_inner()).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
