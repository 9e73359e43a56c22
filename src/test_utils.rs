use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;

use crate::database::models::{Worker, WorkerInput};
use crate::database::repositories::WorkerRepository;

/// Test database wrapper that provides isolated testing environment
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with fresh schema
    pub async fn new() -> Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let database_url = format!("sqlite:{}", temp_file.path().display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(TestDb {
            pool,
            _temp_file: temp_file,
        })
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Insert an active worker created at the start of 2025
pub async fn seed_worker(pool: &SqlitePool, name: &str, code: i64) -> Worker {
    WorkerRepository::new(pool.clone())
        .create_worker(&WorkerInput {
            name: name.to_string(),
            hourly_rate: 25_000.0,
            code,
            site: None,
            created_on: date(2025, 1, 1),
        })
        .await
        .expect("Failed to seed worker")
}
