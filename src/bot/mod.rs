//! Chat front-end.
//!
//! Transport independent: a message comes in as [`Incoming`], the answers for
//! the same chat go back as a list of [`Reply`] values, and anything addressed
//! to other chats (admins, workers) is pushed through the [`Messenger`].

mod admin;
pub mod format;
pub mod keyboards;
pub mod session;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::database::models::Worker;
use crate::error::AppError;
use crate::messenger::Messenger;
use crate::services::Services;

pub use format::Money;
pub use keyboards::{InlineButton, Keyboard, ReplyButton};
pub use session::{Dialog, SessionStore};

#[derive(Debug, Clone, PartialEq)]
pub enum IncomingKind {
    Text(String),
    Callback {
        query_id: Option<String>,
        data: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub chat_id: i64,
    pub account_id: i64,
    pub sender_name: Option<String>,
    pub kind: IncomingKind,
}

impl Incoming {
    pub fn text(chat_id: i64, account_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            account_id,
            sender_name: None,
            kind: IncomingKind::Text(text.into()),
        }
    }

    pub fn callback(chat_id: i64, account_id: i64, data: impl Into<String>) -> Self {
        Self {
            chat_id,
            account_id,
            sender_name: None,
            kind: IncomingKind::Callback {
                query_id: None,
                data: data.into(),
            },
        }
    }

    pub fn location(chat_id: i64, account_id: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            chat_id,
            account_id,
            sender_name: None,
            kind: IncomingKind::Location {
                latitude,
                longitude,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Document {
        file_name: String,
        bytes: Vec<u8>,
        caption: String,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text { text, .. } => Some(text),
            Reply::Document { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Admin,
    Worker(Worker),
    Guest,
}

#[derive(Clone)]
pub struct Bot {
    services: Services,
    sessions: SessionStore,
    messenger: Arc<dyn Messenger>,
    admin_ids: Vec<i64>,
    money: Money,
}

impl Bot {
    pub fn new(services: Services, config: &Config, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            services,
            sessions: SessionStore::new(Duration::from_secs(config.session_ttl_minutes * 60)),
            messenger,
            admin_ids: config.admin_ids.clone(),
            money: Money::new(config.currency.clone()),
        }
    }

    pub fn is_admin(&self, account_id: i64) -> bool {
        self.admin_ids.contains(&account_id)
    }

    pub async fn role(&self, account_id: i64) -> Result<Role, AppError> {
        if self.is_admin(account_id) {
            return Ok(Role::Admin);
        }
        Ok(match self.services.workforce.worker_for_account(account_id).await? {
            Some(worker) => Role::Worker(worker),
            None => Role::Guest,
        })
    }

    /// Never fails: errors become a message for the sender
    pub async fn handle(&self, incoming: &Incoming) -> Vec<Reply> {
        match self.dispatch(incoming).await {
            Ok(replies) => replies,
            Err(err) if err.is_user_facing() => {
                vec![Reply::text(format::escape_html(&err.user_message()))]
            }
            Err(err) => {
                log::error!(
                    "Failed to handle message from account {}: {}",
                    incoming.account_id,
                    err
                );
                vec![Reply::text(err.user_message())]
            }
        }
    }

    async fn dispatch(&self, incoming: &Incoming) -> Result<Vec<Reply>, AppError> {
        let role = self.role(incoming.account_id).await?;

        match &incoming.kind {
            IncomingKind::Text(text) => {
                let text = text.trim();

                if text == "/cancel" || text == keyboards::CANCEL {
                    self.sessions.clear(incoming.account_id).await;
                    return Ok(vec![Reply::with_keyboard(
                        "Cancelled.",
                        menu_for(&role),
                    )]);
                }
                if text == "/start" || text.starts_with("/start ") {
                    self.sessions.clear(incoming.account_id).await;
                    return self.start(incoming, &role).await;
                }

                match role {
                    Role::Admin => self.admin_text(incoming, text).await,
                    Role::Worker(worker) => self.worker_text(incoming, &worker, text).await,
                    Role::Guest => self.guest_text(incoming, text).await,
                }
            }
            IncomingKind::Callback { data, .. } => match role {
                Role::Admin => self.admin_callback(incoming, data).await,
                _ => Ok(vec![Reply::text("This action is only available to admins.")]),
            },
            IncomingKind::Location {
                latitude,
                longitude,
            } => match role {
                Role::Admin => self.admin_location(incoming, *latitude, *longitude).await,
                Role::Worker(_) => self.worker_check_in(incoming, *latitude, *longitude).await,
                Role::Guest => self.login_prompt(incoming).await,
            },
        }
    }

    async fn start(&self, incoming: &Incoming, role: &Role) -> Result<Vec<Reply>, AppError> {
        match role {
            Role::Admin => Ok(vec![Reply::with_keyboard(
                "Admin panel. Choose an action:",
                Keyboard::admin_menu(),
            )]),
            Role::Worker(worker) => Ok(vec![Reply::with_keyboard(
                format!("Hello, {}!", format::escape_html(&worker.name)),
                Keyboard::worker_menu(),
            )]),
            Role::Guest => self.login_prompt(incoming).await,
        }
    }

    async fn login_prompt(&self, incoming: &Incoming) -> Result<Vec<Reply>, AppError> {
        self.sessions.set(incoming.account_id, Dialog::Login).await;
        let greeting = match &incoming.sender_name {
            Some(name) => format!("Hello, {}! ", format::escape_html(name)),
            None => String::new(),
        };
        Ok(vec![Reply::with_keyboard(
            format!("{}Please send the 4-digit code you got from the admin.", greeting),
            Keyboard::Remove,
        )])
    }

    /// Delivery failures are logged, the sender's own flow still succeeds
    async fn notify(&self, chat_id: i64, reply: Reply) {
        if let Err(err) = self.messenger.deliver(chat_id, &reply).await {
            log::warn!("Could not notify chat {}: {}", chat_id, err);
        }
    }

    async fn notify_admins(&self, reply: Reply) {
        for admin_id in &self.admin_ids {
            self.notify(*admin_id, reply.clone()).await;
        }
    }
}

fn menu_for(role: &Role) -> Keyboard {
    match role {
        Role::Admin => Keyboard::admin_menu(),
        Role::Worker(_) => Keyboard::worker_menu(),
        Role::Guest => Keyboard::Remove,
    }
}
