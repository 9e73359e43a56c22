#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use fake::Fake;
use fake::faker::name::en::Name;
use futures::future::BoxFuture;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crewpay::bot::{Bot, Incoming, Reply};
use crewpay::calendar::Calendar;
use crewpay::config::Config;
use crewpay::database::init_database;
use crewpay::database::models::Worker;
use crewpay::error::AppError;
use crewpay::messenger::Messenger;
use crewpay::services::Services;

pub const ADMIN: i64 = 1001;
pub const SECOND_ADMIN: i64 = 1002;
pub const UTC_OFFSET: i32 = 5;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// The day every test context is frozen at unless told otherwise
pub fn today() -> NaiveDate {
    date(2025, 11, 15)
}

pub fn fake_worker_name() -> String {
    Name().fake()
}

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

/// Captures everything the bot pushes to other chats
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, Reply)>>,
}

impl RecordingMessenger {
    pub fn sent_to(&self, chat_id: i64) -> Vec<Reply> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, reply)| reply.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Messenger for RecordingMessenger {
    fn deliver<'a>(
        &'a self,
        chat_id: i64,
        reply: &'a Reply,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        self.sent.lock().unwrap().push((chat_id, reply.clone()));
        Box::pin(async { Ok(()) })
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub pool: SqlitePool,
    pub config: Config,
    pub services: Services,
    pub messenger: Arc<RecordingMessenger>,
    pub bot: Bot,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::on(today()).await
    }

    /// Context whose calendar is frozen at `day`
    pub async fn on(day: NaiveDate) -> Result<Self> {
        let db = TestDb::new().await?;
        let pool = db.pool.clone();
        let config = Config::test_config();

        let services = Services::new(
            pool.clone(),
            Calendar::frozen(UTC_OFFSET, day),
            config.advance_limit_ratio,
        );
        let messenger = Arc::new(RecordingMessenger::default());
        let bot = Bot::new(services.clone(), &config, messenger.clone());

        Ok(TestContext {
            db,
            pool,
            config,
            services,
            messenger,
            bot,
        })
    }

    /// Services over the same database with a different "today"
    pub fn services_on(&self, day: NaiveDate) -> Services {
        Services::new(
            self.pool.clone(),
            Calendar::frozen(UTC_OFFSET, day),
            self.config.advance_limit_ratio,
        )
    }

    pub async fn register(&self, name: &str, rate: f64, site: Option<&str>) -> Worker {
        self.services
            .workforce
            .register_worker(name, rate, site)
            .await
            .expect("Failed to register worker")
    }

    /// Registers a worker and links it to `account_id`
    pub async fn linked_worker(&self, name: &str, rate: f64, account_id: i64) -> Worker {
        let worker = self.register(name, rate, None).await;
        self.services
            .workforce
            .login(&worker.code.to_string(), account_id)
            .await
            .expect("Failed to link worker")
    }

    pub async fn send(&self, account_id: i64, text: &str) -> Vec<Reply> {
        self.bot
            .handle(&Incoming::text(account_id, account_id, text))
            .await
    }

    pub async fn press(&self, account_id: i64, data: &str) -> Vec<Reply> {
        self.bot
            .handle(&Incoming::callback(account_id, account_id, data))
            .await
    }

    pub async fn share_location(
        &self,
        account_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Vec<Reply> {
        self.bot
            .handle(&Incoming::location(account_id, account_id, latitude, longitude))
            .await
    }
}

/// Text of the last reply, panicking if it is a document
pub fn last_text(replies: &[Reply]) -> String {
    replies
        .last()
        .and_then(|r| r.as_text())
        .expect("expected a text reply")
        .to_string()
}

pub fn all_text(replies: &[Reply]) -> String {
    replies
        .iter()
        .filter_map(|r| r.as_text())
        .collect::<Vec<_>>()
        .join("\n")
}
