use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

/// Label used for workers that have no site assigned.
pub const DEFAULT_SITE: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub hourly_rate: f64,
    pub code: i64,
    pub account_id: Option<i64>,
    pub site: Option<String>,
    pub active: bool,
    pub created_on: NaiveDate,
    pub archived_on: Option<NaiveDate>,
}

impl Worker {
    pub fn site_label(&self) -> &str {
        self.site
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SITE)
    }

    pub fn is_linked(&self) -> bool {
        self.account_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInput {
    pub name: String,
    pub hourly_rate: f64,
    pub code: i64,
    pub site: Option<String>,
    pub created_on: NaiveDate,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum WorkerField {
        Name => "name",
        Rate => "rate",
        Site => "site",
    }
}
