use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar::Month;

/// One worker's row in the monthly payroll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollLine {
    pub worker_id: i64,
    pub name: String,
    pub hourly_rate: f64,
    /// Hours keyed by day of month; a 0 entry means the worker was marked absent
    pub daily_hours: BTreeMap<u32, f64>,
    pub total_hours: f64,
    pub advances: f64,
    pub gross: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteGroup {
    pub site: String,
    pub lines: Vec<PayrollLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPayroll {
    pub month: Month,
    pub sites: Vec<SiteGroup>,
}

impl MonthlyPayroll {
    pub fn lines(&self) -> impl Iterator<Item = &PayrollLine> {
        self.sites.iter().flat_map(|group| group.lines.iter())
    }

    pub fn worker_count(&self) -> usize {
        self.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn total_hours(&self) -> f64 {
        self.lines().map(|l| l.total_hours).sum()
    }

    pub fn total_advances(&self) -> f64 {
        self.lines().map(|l| l.advances).sum()
    }

    pub fn total_gross(&self) -> f64 {
        self.lines().map(|l| l.gross).sum()
    }

    pub fn total_net(&self) -> f64 {
        self.lines().map(|l| l.net).sum()
    }

    pub fn line_for(&self, worker_id: i64) -> Option<&PayrollLine> {
        self.lines().find(|l| l.worker_id == worker_id)
    }
}

/// A worker's own view of the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerBalance {
    pub worker_id: i64,
    pub name: String,
    pub hourly_rate: f64,
    pub month: Month,
    pub hours: f64,
    pub approved_advances: f64,
    pub pending_advances: f64,
    pub gross: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopWorker {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralStats {
    pub month: Month,
    pub active_workers: i64,
    pub total_hours: f64,
    pub total_advances: f64,
    pub top_worker: Option<TopWorker>,
}
