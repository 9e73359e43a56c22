use moka::future::Cache;
use std::time::Duration;

use crate::database::models::WorkerField;

const MAX_SESSIONS: u64 = 10_000;

/// Worker waiting in the daily-report queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedWorker {
    pub id: i64,
    pub name: String,
    pub site: String,
}

/// Where an account currently is inside a multi-step dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Login,

    AddWorkerName,
    AddWorkerRate {
        name: String,
    },
    AddWorkerSite {
        name: String,
        rate: f64,
    },

    DailyReport {
        queue: Vec<QueuedWorker>,
        position: usize,
        recorded: usize,
        skipped: usize,
    },

    IssueAdvanceWorker,
    IssueAdvanceAmount {
        worker_id: i64,
        worker_name: String,
    },

    EditWorkerId,
    EditWorkerField {
        worker_id: i64,
        worker_name: String,
    },
    EditWorkerValue {
        worker_id: i64,
        field: WorkerField,
    },

    ArchiveWorkerId,
    ResetLoginId,

    RequestAdvanceAmount {
        limit: f64,
    },

    LocationPoint,
    LocationRadius {
        latitude: f64,
        longitude: f64,
    },
    CheckinHours,
}

/// Dialog progress per account, dropped after a period of inactivity.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<i64, Dialog>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle_timeout)
            .build();
        Self { cache }
    }

    pub async fn get(&self, account_id: i64) -> Option<Dialog> {
        self.cache.get(&account_id).await
    }

    pub async fn set(&self, account_id: i64, dialog: Dialog) {
        self.cache.insert(account_id, dialog).await;
    }

    pub async fn clear(&self, account_id: i64) {
        self.cache.invalidate(&account_id).await;
    }
}
