use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::database::models::{AttendanceRecord, AttendanceStatus};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite the record for (worker, date)
    pub async fn upsert(
        &self,
        worker_id: i64,
        work_date: NaiveDate,
        hours: f64,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance (worker_id, work_date, hours, status, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (worker_id, work_date) DO UPDATE SET
                hours = excluded.hours,
                status = excluded.status,
                recorded_at = excluded.recorded_at
            RETURNING id, worker_id, work_date, hours, status, recorded_at
            "#,
        )
        .bind(worker_id)
        .bind(work_date)
        .bind(hours)
        .bind(status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_for_day(
        &self,
        worker_id: i64,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, worker_id, work_date, hours, status, recorded_at
            FROM attendance
            WHERE worker_id = ?1 AND work_date = ?2
            "#,
        )
        .bind(worker_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_for_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, worker_id, work_date, hours, status, recorded_at
            FROM attendance
            WHERE work_date BETWEEN ?1 AND ?2
            ORDER BY work_date, worker_id
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
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, worker_id, work_date, hours, status, recorded_at
            FROM attendance
            WHERE worker_id = ?1 AND work_date BETWEEN ?2 AND ?3
            ORDER BY work_date
            "#,
        )
        .bind(worker_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
