use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

use crate::calendar::{Calendar, Month};
use crate::database::models::{
    Advance, AdvanceStatus, AttendanceRecord, GeneralStats, MonthlyPayroll, PayrollLine,
    SiteGroup, TopWorker, Worker, WorkerBalance,
};
use crate::database::repositories::{AdvanceRepository, AttendanceRepository, WorkerRepository};
use crate::error::AppError;

#[derive(Clone)]
pub struct PayrollService {
    workers: WorkerRepository,
    attendance: AttendanceRepository,
    advances: AdvanceRepository,
    calendar: Calendar,
}

impl PayrollService {
    pub fn new(
        workers: WorkerRepository,
        attendance: AttendanceRepository,
        advances: AdvanceRepository,
        calendar: Calendar,
    ) -> Self {
        Self {
            workers,
            attendance,
            advances,
            calendar,
        }
    }

    pub fn current_month(&self) -> Month {
        self.calendar.current_month()
    }

    pub async fn monthly_payroll(&self, month: Month) -> Result<MonthlyPayroll, AppError> {
        let (from, to) = (month.first_day(), month.last_day());

        let workers = self.workers.list_for_period(from, to).await?;
        let attendance = self.attendance.list_for_range(from, to).await?;
        let advances = self.advances.list_for_range(from, to).await?;

        Ok(aggregate_month(month, &workers, &attendance, &advances))
    }

    pub async fn worker_balance(
        &self,
        worker: &Worker,
        month: Month,
    ) -> Result<WorkerBalance, AppError> {
        let (from, to) = (month.first_day(), month.last_day());

        let hours: f64 = self
            .attendance
            .list_for_worker(worker.id, from, to)
            .await?
            .iter()
            .map(|r| r.hours)
            .sum();

        let advances = self.advances.list_for_worker(worker.id, from, to).await?;
        let approved_advances = sum_with_status(&advances, AdvanceStatus::Approved);
        let pending_advances = sum_with_status(&advances, AdvanceStatus::Pending);

        let gross = hours * worker.hourly_rate;
        Ok(WorkerBalance {
            worker_id: worker.id,
            name: worker.name.clone(),
            hourly_rate: worker.hourly_rate,
            month,
            hours,
            approved_advances,
            pending_advances,
            gross,
            net: gross - approved_advances,
        })
    }

    /// Current month balance of the worker bound to `account_id`
    pub async fn balance_for_account(&self, account_id: i64) -> Result<WorkerBalance, AppError> {
        let worker = self
            .workers
            .get_worker_by_account(account_id)
            .await?
            .filter(|w| w.active)
            .ok_or_else(|| AppError::Forbidden("Please log in with your code first".into()))?;

        self.worker_balance(&worker, self.current_month()).await
    }

    pub async fn general_stats(&self, month: Month) -> Result<GeneralStats, AppError> {
        let payroll = self.monthly_payroll(month).await?;
        let active_workers = self.workers.count_active().await?;

        let top_worker = payroll
            .lines()
            .filter(|l| l.total_hours > 0.0)
            .max_by(|a, b| a.total_hours.total_cmp(&b.total_hours))
            .map(|l| TopWorker {
                name: l.name.clone(),
                hours: l.total_hours,
            });

        Ok(GeneralStats {
            month,
            active_workers,
            total_hours: payroll.total_hours(),
            total_advances: payroll.total_advances(),
            top_worker,
        })
    }
}

fn sum_with_status(advances: &[Advance], status: AdvanceStatus) -> f64 {
    advances
        .iter()
        .filter(|a| a.status == status)
        .map(|a| a.amount)
        .sum()
}

/// Single pass over a month's rows: group workers by site, then sum hours and
/// approved advances per worker.
pub fn aggregate_month(
    month: Month,
    workers: &[Worker],
    attendance: &[AttendanceRecord],
    advances: &[Advance],
) -> MonthlyPayroll {
    let mut hours_by_worker: HashMap<i64, BTreeMap<u32, f64>> = HashMap::new();
    for record in attendance.iter().filter(|r| month.contains(r.work_date)) {
        hours_by_worker
            .entry(record.worker_id)
            .or_default()
            .insert(record.work_date.day(), record.hours);
    }

    let mut advances_by_worker: HashMap<i64, f64> = HashMap::new();
    for advance in advances
        .iter()
        .filter(|a| a.is_approved() && month.contains(a.issued_on))
    {
        *advances_by_worker.entry(advance.worker_id).or_default() += advance.amount;
    }

    let mut sites: BTreeMap<String, Vec<PayrollLine>> = BTreeMap::new();
    for worker in workers {
        let daily_hours = hours_by_worker.remove(&worker.id).unwrap_or_default();
        let total_hours: f64 = daily_hours.values().sum();
        let advances = advances_by_worker.get(&worker.id).copied().unwrap_or(0.0);
        let gross = total_hours * worker.hourly_rate;

        sites
            .entry(worker.site_label().to_string())
            .or_default()
            .push(PayrollLine {
                worker_id: worker.id,
                name: worker.name.clone(),
                hourly_rate: worker.hourly_rate,
                daily_hours,
                total_hours,
                advances,
                gross,
                net: gross - advances,
            });
    }

    MonthlyPayroll {
        month,
        sites: sites
            .into_iter()
            .map(|(site, mut lines)| {
                lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.worker_id.cmp(&b.worker_id)));
                SiteGroup { site, lines }
            })
            .collect(),
    }
}
