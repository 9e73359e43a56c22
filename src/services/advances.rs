use crate::calendar::Calendar;
use crate::database::models::{Advance, AdvanceInput, AdvanceStatus, Worker, WorkerBalance};
use crate::database::repositories::{AdvanceRepository, WorkerRepository};
use crate::error::AppError;
use crate::services::payroll::PayrollService;

/// How much a worker may still ask for this month.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceLimit {
    pub balance: WorkerBalance,
    pub limit: f64,
}

impl AdvanceLimit {
    pub fn allows_requests(&self) -> bool {
        self.limit > 0.0
    }
}

#[derive(Clone)]
pub struct AdvanceService {
    workers: WorkerRepository,
    advances: AdvanceRepository,
    payroll: PayrollService,
    calendar: Calendar,
    limit_ratio: f64,
}

impl AdvanceService {
    pub fn new(
        workers: WorkerRepository,
        advances: AdvanceRepository,
        payroll: PayrollService,
        calendar: Calendar,
        limit_ratio: f64,
    ) -> Self {
        Self {
            workers,
            advances,
            payroll,
            calendar,
            limit_ratio,
        }
    }

    /// Admin-issued advances count towards payroll right away
    pub async fn issue(
        &self,
        worker_id: i64,
        amount: f64,
        admin_id: i64,
    ) -> Result<(Worker, Advance), AppError> {
        validate_amount(amount)?;
        let worker = self.active_worker(worker_id).await?;

        let advance = self
            .advances
            .create_advance(&AdvanceInput {
                worker_id: worker.id,
                issued_on: self.calendar.today(),
                amount,
                status: AdvanceStatus::Approved,
                decided_by: Some(admin_id),
            })
            .await?;

        log::info!(
            "Admin {} issued advance {} of {} to worker {}",
            admin_id,
            advance.id,
            amount,
            worker.id
        );
        Ok((worker, advance))
    }

    pub async fn request_limit(&self, worker: &Worker) -> Result<AdvanceLimit, AppError> {
        let balance = self
            .payroll
            .worker_balance(worker, self.calendar.current_month())
            .await?;

        let limit = balance.gross * self.limit_ratio
            - balance.approved_advances
            - balance.pending_advances;

        Ok(AdvanceLimit {
            balance,
            limit: limit.max(0.0),
        })
    }

    pub async fn limit_for_account(
        &self,
        account_id: i64,
    ) -> Result<(Worker, AdvanceLimit), AppError> {
        let worker = self.worker_for_account(account_id).await?;
        let limit = self.request_limit(&worker).await?;
        Ok((worker, limit))
    }

    /// Creates a pending request for an admin to decide on
    pub async fn request(
        &self,
        account_id: i64,
        amount: f64,
    ) -> Result<(Worker, Advance), AppError> {
        validate_amount(amount)?;
        let (worker, limit) = self.limit_for_account(account_id).await?;

        if !limit.allows_requests() {
            return Err(AppError::validation(
                "You cannot request an advance right now: nothing is left of this month's limit",
            ));
        }
        if amount > limit.limit {
            return Err(AppError::validation(format!(
                "The amount exceeds your limit of {:.0}",
                limit.limit
            )));
        }

        let advance = self
            .advances
            .create_advance(&AdvanceInput {
                worker_id: worker.id,
                issued_on: self.calendar.today(),
                amount,
                status: AdvanceStatus::Pending,
                decided_by: None,
            })
            .await?;

        log::info!(
            "Worker {} requested advance {} of {}",
            worker.id,
            advance.id,
            amount
        );
        Ok((worker, advance))
    }

    pub async fn approve(
        &self,
        advance_id: i64,
        admin_id: i64,
    ) -> Result<(Worker, Advance), AppError> {
        self.decide(advance_id, AdvanceStatus::Approved, admin_id)
            .await
    }

    pub async fn reject(
        &self,
        advance_id: i64,
        admin_id: i64,
    ) -> Result<(Worker, Advance), AppError> {
        self.decide(advance_id, AdvanceStatus::Rejected, admin_id)
            .await
    }

    async fn decide(
        &self,
        advance_id: i64,
        status: AdvanceStatus,
        admin_id: i64,
    ) -> Result<(Worker, Advance), AppError> {
        if self.advances.get_advance_by_id(advance_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Advance request {} not found",
                advance_id
            )));
        }

        let advance = self
            .advances
            .decide(advance_id, status, admin_id)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("This request has already been processed".to_string())
            })?;

        let worker = self
            .workers
            .get_worker_by_id(advance.worker_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Worker {} not found", advance.worker_id))
            })?;

        log::info!(
            "Admin {} marked advance {} as {}",
            admin_id,
            advance.id,
            advance.status
        );
        Ok((worker, advance))
    }

    async fn active_worker(&self, worker_id: i64) -> Result<Worker, AppError> {
        match self.workers.get_worker_by_id(worker_id).await? {
            Some(worker) if worker.active => Ok(worker),
            Some(worker) => Err(AppError::validation(format!(
                "{} is archived",
                worker.name
            ))),
            None => Err(AppError::NotFound(format!(
                "Worker {} not found",
                worker_id
            ))),
        }
    }

    async fn worker_for_account(&self, account_id: i64) -> Result<Worker, AppError> {
        self.workers
            .get_worker_by_account(account_id)
            .await?
            .filter(|w| w.active)
            .ok_or_else(|| AppError::Forbidden("Please log in with your code first".into()))
    }
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    Ok(())
}
