use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Advance {
    pub id: i64,
    pub worker_id: i64,
    pub issued_on: NaiveDate,
    pub amount: f64,
    pub status: AdvanceStatus,
    pub decided_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Advance {
    pub fn is_approved(&self) -> bool {
        self.status == AdvanceStatus::Approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceInput {
    pub worker_id: i64,
    pub issued_on: NaiveDate,
    pub amount: f64,
    pub status: AdvanceStatus,
    pub decided_by: Option<i64>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AdvanceStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}
