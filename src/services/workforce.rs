use rand::Rng;

use crate::calendar::Calendar;
use crate::database::models::{Worker, WorkerInput};
use crate::database::repositories::WorkerRepository;
use crate::error::AppError;

const CODE_RANGE: std::ops::RangeInclusive<i64> = 1000..=9999;
const MAX_CODE_ATTEMPTS: usize = 25;
const MAX_NAME_LEN: usize = 100;

/// Change requested from the edit-worker dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEdit {
    Name(String),
    Rate(f64),
    Site(Option<String>),
}

/// Result of looking a worker up by id or by name.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerLookup {
    NotFound,
    Found(Worker),
    Ambiguous(Vec<Worker>),
}

#[derive(Clone)]
pub struct WorkforceService {
    workers: WorkerRepository,
    calendar: Calendar,
}

impl WorkforceService {
    pub fn new(workers: WorkerRepository, calendar: Calendar) -> Self {
        Self { workers, calendar }
    }

    /// Register a worker and hand out a fresh login code
    pub async fn register_worker(
        &self,
        name: &str,
        hourly_rate: f64,
        site: Option<&str>,
    ) -> Result<Worker, AppError> {
        let name = validate_name(name)?;
        validate_rate(hourly_rate)?;
        let site = normalize_site(site);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = rand::rng().random_range(CODE_RANGE);
            if self.workers.code_exists(code).await? {
                continue;
            }

            let input = WorkerInput {
                name: name.clone(),
                hourly_rate,
                code,
                site: site.clone(),
                created_on: self.calendar.today(),
            };

            match self.workers.create_worker(&input).await {
                Ok(worker) => {
                    log::info!("Registered worker {} ({})", worker.id, worker.name);
                    return Ok(worker);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    log::warn!("Login code {} was taken concurrently, retrying", code);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a free login code, please try again".to_string(),
        ))
    }

    pub async fn get_worker(&self, id: i64) -> Result<Worker, AppError> {
        self.workers
            .get_worker_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Worker {} not found", id)))
    }

    pub async fn list_active(&self) -> Result<Vec<Worker>, AppError> {
        Ok(self.workers.list_active().await?)
    }

    /// Numeric queries are treated as ids, anything else as part of a name
    pub async fn find_active(&self, query: &str) -> Result<WorkerLookup, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(WorkerLookup::NotFound);
        }

        if let Ok(id) = query.parse::<i64>() {
            return Ok(match self.workers.get_worker_by_id(id).await? {
                Some(worker) if worker.active => WorkerLookup::Found(worker),
                _ => WorkerLookup::NotFound,
            });
        }

        let mut matches = self.workers.search_active_by_name(query).await?;
        Ok(match matches.len() {
            0 => WorkerLookup::NotFound,
            1 => WorkerLookup::Found(matches.remove(0)),
            _ => WorkerLookup::Ambiguous(matches),
        })
    }

    pub async fn edit_worker(&self, id: i64, edit: WorkerEdit) -> Result<Worker, AppError> {
        let updated = match edit {
            WorkerEdit::Name(name) => {
                let name = validate_name(&name)?;
                self.workers.update_name(id, &name).await?
            }
            WorkerEdit::Rate(rate) => {
                validate_rate(rate)?;
                self.workers.update_rate(id, rate).await?
            }
            WorkerEdit::Site(site) => {
                let site = normalize_site(site.as_deref());
                self.workers.update_site(id, site.as_deref()).await?
            }
        };

        updated.ok_or_else(|| AppError::NotFound(format!("Worker {} not found", id)))
    }

    pub async fn archive_worker(&self, id: i64) -> Result<Worker, AppError> {
        let worker = self.get_worker(id).await?;
        if !worker.active {
            return Err(AppError::Conflict(format!(
                "{} is already archived",
                worker.name
            )));
        }

        self.workers.archive_worker(id, self.calendar.today()).await?;
        log::info!("Archived worker {} ({})", worker.id, worker.name);
        self.get_worker(id).await
    }

    /// Detach the chat account so the code can be used again
    pub async fn reset_login(&self, id: i64) -> Result<Worker, AppError> {
        let worker = self.get_worker(id).await?;
        if worker.account_id.is_none() {
            return Err(AppError::Conflict(format!(
                "{} has not logged in yet",
                worker.name
            )));
        }

        self.workers.unbind_account(id).await?;
        self.get_worker(id).await
    }

    /// Active worker bound to the account, if any
    pub async fn worker_for_account(&self, account_id: i64) -> Result<Option<Worker>, AppError> {
        Ok(self
            .workers
            .get_worker_by_account(account_id)
            .await?
            .filter(|w| w.active))
    }

    pub async fn login(&self, code: &str, account_id: i64) -> Result<Worker, AppError> {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::validation("The code must contain digits only"));
        }
        let code: i64 = code
            .parse()
            .map_err(|_| AppError::validation("The code is not valid"))?;

        let worker = match self.workers.get_worker_by_code(code).await? {
            Some(worker) if worker.active => worker,
            _ => return Err(AppError::validation("The code is not valid")),
        };

        match worker.account_id {
            Some(bound) if bound == account_id => return Ok(worker),
            Some(_) => {
                return Err(AppError::Conflict(
                    "This code is already in use by another account".to_string(),
                ));
            }
            None => {}
        }

        if let Some(other) = self.workers.get_worker_by_account(account_id).await? {
            if other.id != worker.id {
                return Err(AppError::Conflict(format!(
                    "Your account is already linked to {}",
                    other.name
                )));
            }
        }

        if !self.workers.bind_account(worker.id, account_id).await? {
            return Err(AppError::Conflict(
                "This code is already in use by another account".to_string(),
            ));
        }

        log::info!("Worker {} linked to account {}", worker.id, account_id);
        self.get_worker(worker.id).await
    }
}

pub fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

fn validate_rate(rate: f64) -> Result<(), AppError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AppError::validation("Hourly rate must be greater than 0"));
    }
    Ok(())
}

fn normalize_site(site: Option<&str>) -> Option<String> {
    site.map(str::trim)
        .filter(|s| !s.is_empty() && *s != "-")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_collapsed_and_checked() {
        assert_eq!(validate_name("  Aliyev   Valijon ").unwrap(), "Aliyev Valijon");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn site_dash_means_none() {
        assert_eq!(normalize_site(Some(" - ")), None);
        assert_eq!(normalize_site(Some(" H Block ")), Some("H Block".to_string()));
        assert_eq!(normalize_site(None), None);
    }
}
