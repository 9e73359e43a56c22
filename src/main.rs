use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;
use std::sync::Arc;

use crewpay::calendar::Calendar;
use crewpay::config::BotMode;
use crewpay::database::init_database;
use crewpay::messenger::{LogMessenger, Messenger};
use crewpay::services::Services;
use crewpay::telegram::{self, TelegramClient};
use crewpay::{AppState, Bot, Config, routes};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    env_logger::init();

    log::info!("Starting crewpay...");

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {}, admins: {})",
        config.environment,
        config.admin_ids.len()
    );
    if config.admin_ids.is_empty() {
        log::warn!("ADMIN_IDS is empty, nobody can use the admin menu");
    }

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let calendar = Calendar::new(config.utc_offset_hours);
    let services = Services::new(pool, calendar, config.advance_limit_ratio);

    let telegram_client = match &config.bot_token {
        Some(token) => Some(Arc::new(TelegramClient::new(
            &config.telegram_api_url,
            token,
        )?)),
        None => {
            log::warn!("BOT_TOKEN is not set, outgoing messages will only be logged");
            None
        }
    };
    let messenger: Arc<dyn Messenger> = match &telegram_client {
        Some(client) => client.clone(),
        None => Arc::new(LogMessenger),
    };

    let bot = Bot::new(services, &config, messenger.clone());

    if let (Some(client), BotMode::Polling) = (&telegram_client, config.bot_mode) {
        tokio::spawn(telegram::run_polling(client.clone(), bot.clone()));
    }

    let server_address = config.server_address();
    log::info!(
        "Server starting on http://{} ({:?} mode)",
        server_address,
        config.bot_mode
    );

    let app_state = web::Data::new(AppState {
        bot,
        messenger,
        config,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
