pub mod advances;
pub mod geo;
pub mod payroll;
pub mod report;
pub mod settings;
pub mod timesheet;
pub mod workforce;

use sqlx::SqlitePool;

use crate::calendar::Calendar;
use crate::database::repositories::{
    AdvanceRepository, AttendanceRepository, SettingRepository, WorkerRepository,
};

pub use advances::{AdvanceLimit, AdvanceService};
pub use payroll::PayrollService;
pub use settings::SettingsService;
pub use timesheet::{CheckIn, TimesheetService};
pub use workforce::{WorkerEdit, WorkerLookup, WorkforceService};

/// Every service the chat front-end talks to, wired over one pool.
#[derive(Clone)]
pub struct Services {
    pub workforce: WorkforceService,
    pub timesheet: TimesheetService,
    pub advances: AdvanceService,
    pub payroll: PayrollService,
    pub settings: SettingsService,
    pub calendar: Calendar,
}

impl Services {
    pub fn new(pool: SqlitePool, calendar: Calendar, advance_limit_ratio: f64) -> Self {
        let worker_repository = WorkerRepository::new(pool.clone());
        let attendance_repository = AttendanceRepository::new(pool.clone());
        let advance_repository = AdvanceRepository::new(pool.clone());
        let setting_repository = SettingRepository::new(pool);

        let settings = SettingsService::new(setting_repository);
        let workforce = WorkforceService::new(worker_repository.clone(), calendar.clone());
        let timesheet = TimesheetService::new(
            worker_repository.clone(),
            attendance_repository.clone(),
            settings.clone(),
            calendar.clone(),
        );
        let payroll = PayrollService::new(
            worker_repository.clone(),
            attendance_repository,
            advance_repository.clone(),
            calendar.clone(),
        );
        let advances = AdvanceService::new(
            worker_repository,
            advance_repository,
            payroll.clone(),
            calendar.clone(),
            advance_limit_ratio,
        );

        Self {
            workforce,
            timesheet,
            advances,
            payroll,
            settings,
            calendar,
        }
    }
}
