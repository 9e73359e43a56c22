use actix_web::web;

use crate::handlers::{chat, health, telegram};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/telegram/webhook", web::post().to(telegram::webhook))
        .service(web::scope("/api/v1").route("/chat", web::post().to(chat::send_message)));
}
