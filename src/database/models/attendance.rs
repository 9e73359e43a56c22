use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: i64,
    pub worker_id: i64,
    pub work_date: NaiveDate,
    pub hours: f64,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        CheckedIn => "checked_in",
    }
}

impl AttendanceStatus {
    /// Status an admin entry gets from the number of hours worked
    pub fn from_hours(hours: f64) -> Self {
        if hours > 0.0 {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }
}
