use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    Polling,
    Webhook,
}

impl FromStr for BotMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "polling" => Ok(BotMode::Polling),
            "webhook" => Ok(BotMode::Webhook),
            other => bail!("Invalid BOT_MODE: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub bot_token: Option<String>,
    pub bot_mode: BotMode,
    pub webhook_secret: Option<String>,
    pub telegram_api_url: String,
    pub admin_ids: Vec<i64>,
    pub utc_offset_hours: i32,
    pub currency: String,
    pub advance_limit_ratio: f64,
    pub session_ttl_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:crewpay.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            bot_token: non_empty_var("BOT_TOKEN"),
            bot_mode: env::var("BOT_MODE")
                .unwrap_or_else(|_| "polling".to_string())
                .parse()?,
            webhook_secret: non_empty_var("WEBHOOK_SECRET"),
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            admin_ids: parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default())?,
            utc_offset_hours: env::var("UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("UTC_OFFSET_HOURS must be a whole number of hours")?,
            currency: env::var("CURRENCY").unwrap_or_else(|_| "so'm".to_string()),
            advance_limit_ratio: env::var("ADVANCE_LIMIT_RATIO")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .context("ADVANCE_LIMIT_RATIO must be a number")?,
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        config.validate()?;
        Ok(config)
    }

    /// Deterministic configuration for tests
    pub fn test_config() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            bot_token: None,
            bot_mode: BotMode::Webhook,
            webhook_secret: Some("test-webhook-secret".to_string()),
            telegram_api_url: "http://127.0.0.1:9".to_string(),
            admin_ids: vec![1001, 1002],
            utc_offset_hours: 5,
            currency: "so'm".to_string(),
            advance_limit_ratio: 0.7,
            session_ttl_minutes: 30,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            bail!("UTC_OFFSET_HOURS out of range: {}", self.utc_offset_hours);
        }
        if !(0.0..=1.0).contains(&self.advance_limit_ratio) {
            bail!(
                "ADVANCE_LIMIT_RATIO must be between 0 and 1, got {}",
                self.advance_limit_ratio
            );
        }
        if self.bot_mode == BotMode::Webhook
            && self.is_production()
            && self.webhook_secret.is_none()
        {
            bail!("WEBHOOK_SECRET is required for webhook mode in production");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn chat_endpoint_enabled(&self) -> bool {
        !self.is_production()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a comma separated list of admin account ids
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ADMIN_IDS contains an invalid id: {}", s))
        })
        .collect()
}
