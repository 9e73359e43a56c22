use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::Setting;

#[derive(Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<Setting, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDb;

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let db = TestDb::new().await.unwrap();
        let repo = SettingRepository::new(db.pool.clone());

        repo.set("checkin_hours", "8").await.unwrap();
        repo.set("checkin_hours", "9.5").await.unwrap();

        assert_eq!(repo.get("checkin_hours").await.unwrap().unwrap().value, "9.5");
        assert!(repo.delete("checkin_hours").await.unwrap());
        assert!(repo.get("checkin_hours").await.unwrap().is_none());
    }
}
