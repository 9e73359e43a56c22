use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::database::models::{Advance, AdvanceInput, AdvanceStatus};

#[derive(Clone)]
pub struct AdvanceRepository {
    pool: SqlitePool,
}

impl AdvanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_advance(&self, input: &AdvanceInput) -> Result<Advance, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Advance>(
            r#"
            INSERT INTO advances (worker_id, issued_on, amount, status, decided_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, worker_id, issued_on, amount, status, decided_by, created_at
            "#,
        )
        .bind(input.worker_id)
        .bind(input.issued_on)
        .bind(input.amount)
        .bind(input.status)
        .bind(input.decided_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_advance_by_id(&self, id: i64) -> Result<Option<Advance>, sqlx::Error> {
        sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, worker_id, issued_on, amount, status, decided_by, created_at
            FROM advances
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Moves a pending advance to `status`. Returns None if it was already decided.
    pub async fn decide(
        &self,
        id: i64,
        status: AdvanceStatus,
        decided_by: i64,
    ) -> Result<Option<Advance>, sqlx::Error> {
        sqlx::query_as::<_, Advance>(
            r#"
            UPDATE advances
            SET status = ?1, decided_by = ?2
            WHERE id = ?3 AND status = ?4
            RETURNING id, worker_id, issued_on, amount, status, decided_by, created_at
            "#,
        )
        .bind(status)
        .bind(decided_by)
        .bind(id)
        .bind(AdvanceStatus::Pending)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_for_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Advance>, sqlx::Error> {
        sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, worker_id, issued_on, amount, status, decided_by, created_at
            FROM advances
            WHERE issued_on BETWEEN ?1 AND ?2
            ORDER BY issued_on, id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_for_worker(
        &self,
        worker_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Advance>, sqlx::Error> {
        sqlx::query_as::<_, Advance>(
            r#"
            SELECT id, worker_id, issued_on, amount, status, decided_by, created_at
            FROM advances
            WHERE worker_id = ?1 AND issued_on BETWEEN ?2 AND ?3
            ORDER BY issued_on, id
            "#,
        )
        .bind(worker_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
