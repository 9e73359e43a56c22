use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::database::models::{Worker, WorkerInput};

const WORKER_COLUMNS: &str =
    "id, name, hourly_rate, code, account_id, site, active, created_on, archived_on";

#[derive(Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
}

impl WorkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_worker(&self, input: &WorkerInput) -> Result<Worker, sqlx::Error> {
        let worker = sqlx::query_as::<_, Worker>(&format!(
            r#"
            INSERT INTO workers (name, hourly_rate, code, site, active, created_on)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            RETURNING {WORKER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.hourly_rate)
        .bind(input.code)
        .bind(&input.site)
        .bind(input.created_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(worker)
    }

    pub async fn get_worker_by_id(&self, id: i64) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_worker_by_code(&self, code: i64) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_worker_by_account(
        &self,
        account_id: i64,
    ) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE account_id = ?1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn code_exists(&self, code: i64) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workers WHERE code = ?1")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Active workers ordered by site then name, site-less workers first
    pub async fn list_active(&self) -> Result<Vec<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            r#"
            SELECT {WORKER_COLUMNS}
            FROM workers
            WHERE active = 1
            ORDER BY COALESCE(site, ''), name
            "#
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_active(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM workers WHERE active = 1")
            .fetch_one(&self.pool)
            .await
    }

    /// Case-insensitive substring match over active workers.
    ///
    /// Folding happens here rather than in SQL: SQLite's `LOWER` and `LIKE`
    /// only fold ASCII, and `%`/`_` in the term must match literally.
    pub async fn search_active_by_name(&self, term: &str) -> Result<Vec<Worker>, sqlx::Error> {
        let needle = term.trim().to_lowercase();

        let mut matches: Vec<Worker> = self
            .list_active()
            .await?
            .into_iter()
            .filter(|worker| worker.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(matches)
    }

    /// Workers employed at any point of the range, or with rows recorded in it
    pub async fn list_for_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            r#"
            SELECT {WORKER_COLUMNS}
            FROM workers
            WHERE (created_on <= ?2 AND (archived_on IS NULL OR archived_on >= ?1))
               OR id IN (SELECT worker_id FROM attendance WHERE work_date BETWEEN ?1 AND ?2)
               OR id IN (SELECT worker_id FROM advances WHERE issued_on BETWEEN ?1 AND ?2)
            ORDER BY COALESCE(site, ''), name
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_name(&self, id: i64, name: &str) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "UPDATE workers SET name = ?1 WHERE id = ?2 RETURNING {WORKER_COLUMNS}"
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_rate(
        &self,
        id: i64,
        hourly_rate: f64,
    ) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "UPDATE workers SET hourly_rate = ?1 WHERE id = ?2 RETURNING {WORKER_COLUMNS}"
        ))
        .bind(hourly_rate)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_site(
        &self,
        id: i64,
        site: Option<&str>,
    ) -> Result<Option<Worker>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(&format!(
            "UPDATE workers SET site = ?1 WHERE id = ?2 RETURNING {WORKER_COLUMNS}"
        ))
        .bind(site)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Soft delete; returns false when the worker is missing or already archived
    pub async fn archive_worker(&self, id: i64, on: NaiveDate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workers SET active = 0, archived_on = ?1 WHERE id = ?2 AND active = 1",
        )
        .bind(on)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Binds an account to a worker that has no account yet
    pub async fn bind_account(&self, id: i64, account_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workers SET account_id = ?1 WHERE id = ?2 AND account_id IS NULL",
        )
        .bind(account_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn unbind_account(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE workers SET account_id = NULL WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDb, date};
    use pretty_assertions::assert_eq;

    fn input(name: &str, code: i64, site: Option<&str>) -> WorkerInput {
        WorkerInput {
            name: name.to_string(),
            hourly_rate: 20_000.0,
            code,
            site: site.map(str::to_string),
            created_on: date(2025, 1, 10),
        }
    }

    #[tokio::test]
    async fn lists_active_workers_by_site_then_name() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());

        repo.create_worker(&input("Valijon", 1001, Some("H Block"))).await.unwrap();
        repo.create_worker(&input("Akmal", 1002, Some("H Block"))).await.unwrap();
        repo.create_worker(&input("Bobur", 1003, None)).await.unwrap();
        let gone = repo.create_worker(&input("Zafar", 1004, None)).await.unwrap();
        assert!(repo.archive_worker(gone.id, date(2025, 2, 1)).await.unwrap());

        let names: Vec<String> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();

        assert_eq!(names, vec!["Bobur", "Akmal", "Valijon"]);
        assert_eq!(repo.count_active().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected_by_the_schema() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());

        repo.create_worker(&input("Ali", 4242, None)).await.unwrap();
        assert!(repo.create_worker(&input("Vali", 4242, None)).await.is_err());
        assert!(repo.code_exists(4242).await.unwrap());
        assert!(!repo.code_exists(4243).await.unwrap());
    }

    #[tokio::test]
    async fn account_binds_only_once() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());
        let worker = repo.create_worker(&input("Ali", 5000, None)).await.unwrap();

        assert!(repo.bind_account(worker.id, 77).await.unwrap());
        assert!(!repo.bind_account(worker.id, 88).await.unwrap());

        let found = repo.get_worker_by_account(77).await.unwrap().unwrap();
        assert_eq!(found.id, worker.id);

        assert!(repo.unbind_account(worker.id).await.unwrap());
        assert!(repo.bind_account(worker.id, 88).await.unwrap());
    }

    #[tokio::test]
    async fn period_listing_keeps_archived_workers_for_earlier_months() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());
        let worker = repo.create_worker(&input("Ali", 6000, None)).await.unwrap();
        repo.archive_worker(worker.id, date(2025, 3, 15)).await.unwrap();

        let march = repo
            .list_for_period(date(2025, 3, 1), date(2025, 3, 31))
            .await
            .unwrap();
        let april = repo
            .list_for_period(date(2025, 4, 1), date(2025, 4, 30))
            .await
            .unwrap();

        assert_eq!(march.len(), 1);
        assert!(april.is_empty());
    }

    #[tokio::test]
    async fn name_search_folds_non_ascii_case() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());
        repo.create_worker(&input("Алишер Каримов", 7001, None)).await.unwrap();
        repo.create_worker(&input("Bobur", 7002, None)).await.unwrap();

        let found = repo.search_active_by_name("алишер").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Алишер Каримов");

        let found = repo.search_active_by_name("КАРИМ").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn name_search_treats_wildcards_literally() {
        let db = TestDb::new().await.unwrap();
        let repo = WorkerRepository::new(db.pool.clone());
        repo.create_worker(&input("Ali", 7101, None)).await.unwrap();
        repo.create_worker(&input("Vali_2", 7102, None)).await.unwrap();

        assert!(repo.search_active_by_name("%").await.unwrap().is_empty());
        let underscore = repo.search_active_by_name("_").await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "Vali_2");
    }
}
