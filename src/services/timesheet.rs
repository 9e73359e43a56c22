use chrono::NaiveDate;

use crate::calendar::Calendar;
use crate::database::models::{AttendanceRecord, AttendanceStatus, Worker};
use crate::database::repositories::{AttendanceRepository, WorkerRepository};
use crate::error::AppError;
use crate::services::settings::SettingsService;

/// Outcome of a location check-in.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckIn {
    Recorded(AttendanceRecord),
    AlreadyRecorded(AttendanceRecord),
}

#[derive(Clone)]
pub struct TimesheetService {
    workers: WorkerRepository,
    attendance: AttendanceRepository,
    settings: SettingsService,
    calendar: Calendar,
}

impl TimesheetService {
    pub fn new(
        workers: WorkerRepository,
        attendance: AttendanceRepository,
        settings: SettingsService,
        calendar: Calendar,
    ) -> Self {
        Self {
            workers,
            attendance,
            settings,
            calendar,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    /// Overwrites whatever was stored for the same worker and day
    pub async fn record_hours(
        &self,
        worker_id: i64,
        work_date: NaiveDate,
        hours: f64,
    ) -> Result<AttendanceRecord, AppError> {
        validate_hours(hours)?;

        let worker = self
            .workers
            .get_worker_by_id(worker_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Worker {} not found", worker_id)))?;
        if !worker.active {
            return Err(AppError::validation(format!(
                "{} is archived, attendance can no longer be recorded",
                worker.name
            )));
        }

        let record = self
            .attendance
            .upsert(
                worker_id,
                work_date,
                hours,
                AttendanceStatus::from_hours(hours),
            )
            .await?;

        log::debug!(
            "Recorded {} hours for worker {} on {}",
            hours,
            worker_id,
            work_date
        );
        Ok(record)
    }

    pub async fn record_today(
        &self,
        worker_id: i64,
        hours: f64,
    ) -> Result<AttendanceRecord, AppError> {
        self.record_hours(worker_id, self.today(), hours).await
    }

    /// Workers to walk through in the daily report, site then name order
    pub async fn daily_queue(&self) -> Result<Vec<Worker>, AppError> {
        Ok(self.workers.list_active().await?)
    }

    pub async fn today_record(
        &self,
        worker_id: i64,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self.attendance.get_for_day(worker_id, self.today()).await?)
    }

    pub async fn check_in(
        &self,
        account_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<CheckIn, AppError> {
        let worker = self
            .workers
            .get_worker_by_account(account_id)
            .await?
            .filter(|w| w.active)
            .ok_or_else(|| AppError::Forbidden("Please log in with your code first".into()))?;

        let fence = self.settings.geofence().await?.ok_or_else(|| {
            AppError::validation("Check-in location is not configured yet, ask the admin")
        })?;

        let distance = fence.distance_to(latitude, longitude);
        if !fence.contains(latitude, longitude) {
            return Err(AppError::validation(format!(
                "You are {:.0} m away from the site, check-in is allowed within {:.0} m",
                distance, fence.radius_m
            )));
        }

        let today = self.today();
        if let Some(existing) = self.attendance.get_for_day(worker.id, today).await? {
            return Ok(CheckIn::AlreadyRecorded(existing));
        }

        let hours = self.settings.checkin_hours().await?;
        let record = self
            .attendance
            .upsert(worker.id, today, hours, AttendanceStatus::CheckedIn)
            .await?;

        log::info!(
            "Worker {} checked in {:.0} m from the site",
            worker.id,
            distance
        );
        Ok(CheckIn::Recorded(record))
    }
}

fn validate_hours(hours: f64) -> Result<(), AppError> {
    if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
        return Err(AppError::validation("Hours must be between 0 and 24"));
    }
    Ok(())
}
