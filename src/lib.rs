pub mod bot;
pub mod calendar;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod messenger;
pub mod routes;
pub mod services;
pub mod telegram;

#[cfg(test)]
pub(crate) mod test_utils;

use std::sync::Arc;

pub use bot::Bot;
pub use config::Config;
pub use messenger::Messenger;

pub struct AppState {
    pub bot: Bot,
    pub messenger: Arc<dyn Messenger>,
    pub config: Config,
}
