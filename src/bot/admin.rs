use regex::Regex;
use chrono::Datelike;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use super::format::{
    self, MAX_MESSAGE_LEN, chunk_lines, escape_html, parse_coordinates, parse_number,
};
use super::keyboards::{self, Keyboard, callbacks};
use super::session::QueuedWorker;
use super::{Bot, Dialog, Incoming, Reply};
use crate::calendar::Month;
use crate::database::models::{GeoFence, Worker, WorkerField};
use crate::error::AppError;
use crate::services::workforce::validate_name;
use crate::services::{WorkerEdit, WorkerLookup, report};

static ADVANCE_DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^advance:(approve|reject):(\d+)$").expect("valid advance callback pattern")
});

impl Bot {
    pub(super) async fn admin_text(
        &self,
        incoming: &Incoming,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let account = incoming.account_id;

        // Menu selections abandon whatever dialog was open
        match text {
            keyboards::DAILY_REPORT => {
                self.sessions.clear(account).await;
                return self.start_daily_report(account).await;
            }
            keyboards::CURRENT_STATUS => {
                self.sessions.clear(account).await;
                return self.current_status().await;
            }
            keyboards::WORKERS => {
                self.sessions.clear(account).await;
                return self.list_workers().await;
            }
            keyboards::ISSUE_ADVANCE => {
                self.sessions.set(account, Dialog::IssueAdvanceWorker).await;
                return Ok(vec![Reply::with_keyboard(
                    "Enter the worker's ID or part of the name:",
                    Keyboard::cancel(),
                )]);
            }
            keyboards::EXCEL_REPORT => {
                self.sessions.clear(account).await;
                let month = self.services.calendar.current_month();
                return self.excel_report(month).await;
            }
            keyboards::SETTINGS => {
                self.sessions.clear(account).await;
                return Ok(vec![Reply::with_keyboard("Settings:", Keyboard::settings())]);
            }
            _ => {}
        }

        if let Some(arg) = text.strip_prefix("/report") {
            self.sessions.clear(account).await;
            let arg = arg.trim();
            let month = if arg.is_empty() {
                self.services.calendar.current_month()
            } else {
                arg.parse::<Month>().map_err(AppError::Validation)?
            };
            return self.excel_report(month).await;
        }

        let Some(dialog) = self.sessions.get(account).await else {
            return Ok(vec![Reply::with_keyboard(
                "Choose an action from the menu.",
                Keyboard::admin_menu(),
            )]);
        };

        match dialog {
            Dialog::AddWorkerName => self.add_worker_name(account, text).await,
            Dialog::AddWorkerRate { name } => self.add_worker_rate(account, name, text).await,
            Dialog::AddWorkerSite { name, rate } => {
                self.add_worker_site(account, name, rate, text).await
            }
            Dialog::DailyReport {
                queue,
                position,
                recorded,
                skipped,
            } => {
                self.daily_report_answer(account, queue, position, recorded, skipped, text)
                    .await
            }
            Dialog::IssueAdvanceWorker => self.issue_advance_worker(account, text).await,
            Dialog::IssueAdvanceAmount {
                worker_id,
                worker_name,
            } => {
                self.issue_advance_amount(account, worker_id, &worker_name, text)
                    .await
            }
            Dialog::EditWorkerId => self.edit_worker_id(account, text).await,
            Dialog::EditWorkerField { .. } => Ok(vec![Reply::with_keyboard(
                "Choose the field to change:",
                Keyboard::edit_fields(),
            )]),
            Dialog::EditWorkerValue { worker_id, field } => {
                self.edit_worker_value(account, worker_id, field, text).await
            }
            Dialog::ArchiveWorkerId => self.archive_worker(account, text).await,
            Dialog::ResetLoginId => self.reset_login(account, text).await,
            Dialog::LocationPoint => self.location_point_text(account, text).await,
            Dialog::LocationRadius {
                latitude,
                longitude,
            } => self.location_radius(account, latitude, longitude, text).await,
            Dialog::CheckinHours => self.checkin_hours(account, text).await,
            Dialog::Login | Dialog::RequestAdvanceAmount { .. } => {
                self.sessions.clear(account).await;
                Ok(vec![Reply::with_keyboard(
                    "Choose an action from the menu.",
                    Keyboard::admin_menu(),
                )])
            }
        }
    }

    pub(super) async fn admin_callback(
        &self,
        incoming: &Incoming,
        data: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let account = incoming.account_id;

        if let Some(caps) = ADVANCE_DECISION.captures(data) {
            let advance_id: i64 = caps[2]
                .parse()
                .map_err(|_| AppError::validation("Unknown advance request"))?;
            return self.decide_advance(account, &caps[1], advance_id).await;
        }

        let (dialog, prompt) = match data {
            callbacks::SETTINGS_ADD => (
                Dialog::AddWorkerName,
                "Enter the new worker's full name:",
            ),
            callbacks::SETTINGS_EDIT => (
                Dialog::EditWorkerId,
                "Enter the ID or name of the worker to edit:",
            ),
            callbacks::SETTINGS_ARCHIVE => (
                Dialog::ArchiveWorkerId,
                "Enter the ID of the worker to archive:",
            ),
            callbacks::SETTINGS_RESET => (
                Dialog::ResetLoginId,
                "Enter the ID of the worker whose login should be reset:",
            ),
            callbacks::SETTINGS_HOURS => (
                Dialog::CheckinHours,
                "How many hours should a location check-in count?",
            ),
            callbacks::SETTINGS_LOCATION => {
                self.sessions.set(account, Dialog::LocationPoint).await;
                return Ok(vec![Reply::with_keyboard(
                    "Send the site location, or type it as <code>lat,lon</code>. Send <code>-</code> to turn location check-in off.",
                    Keyboard::share_location(),
                )]);
            }
            callbacks::SETTINGS_STATS => {
                self.sessions.clear(account).await;
                let month = self.services.calendar.current_month();
                let stats = self.services.payroll.general_stats(month).await?;
                return Ok(vec![Reply::text(format::stats_message(&stats, &self.money))]);
            }
            callbacks::EDIT_NAME | callbacks::EDIT_RATE | callbacks::EDIT_SITE => {
                return self.edit_worker_field(account, data).await;
            }
            _ => {
                log::warn!("Unknown callback from admin {}: {}", account, data);
                return Ok(vec![Reply::text("Unknown action.")]);
            }
        };

        self.sessions.set(account, dialog).await;
        Ok(vec![Reply::with_keyboard(prompt, Keyboard::cancel())])
    }

    pub(super) async fn admin_location(
        &self,
        incoming: &Incoming,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Reply>, AppError> {
        match self.sessions.get(incoming.account_id).await {
            Some(Dialog::LocationPoint) => {
                self.location_point(incoming.account_id, latitude, longitude)
                    .await
            }
            _ => Ok(vec![Reply::text(
                "To change the check-in location open Settings first.",
            )]),
        }
    }

    //------------------------------------------------------------------------
    // Listings
    //------------------------------------------------------------------------

    async fn list_workers(&self) -> Result<Vec<Reply>, AppError> {
        let workers = self.services.workforce.list_active().await?;
        if workers.is_empty() {
            return Ok(vec![Reply::text("No active workers yet.")]);
        }

        let mut lines = vec![format!("<b>Active workers: {}</b>", workers.len())];
        for (site, group) in group_by_site(&workers) {
            lines.push(String::new());
            lines.push(format!("<b>{}</b>", escape_html(&site.to_uppercase())));
            lines.extend(group.iter().map(|w| format::worker_line(w)));
        }

        Ok(chunk_lines(lines, MAX_MESSAGE_LEN)
            .into_iter()
            .map(Reply::text)
            .collect())
    }

    /// Month-to-date pay per worker, with today's attendance mark
    async fn current_status(&self) -> Result<Vec<Reply>, AppError> {
        let month = self.services.calendar.current_month();
        let today = self.services.timesheet.today();
        let payroll = self.services.payroll.monthly_payroll(month).await?;
        if payroll.is_empty() {
            return Ok(vec![Reply::text(format!("No data for {}.", month))]);
        }

        let active: HashSet<i64> = self
            .services
            .workforce
            .list_active()
            .await?
            .into_iter()
            .map(|w| w.id)
            .collect();

        let mut blocks = vec![format!(
            "<b>Current status · {}</b>\nToday: {}",
            month,
            today.format("%d.%m.%Y")
        )];
        let mut missing = 0;
        for group in &payroll.sites {
            blocks.push(format!("\n<b>{}</b>", escape_html(&group.site.to_uppercase())));
            for line in &group.lines {
                let mark = match line.daily_hours.get(&today.day()) {
                    Some(hours) if *hours == 0.0 => "absent".to_string(),
                    Some(hours) => format!("{} h", format::hours(*hours)),
                    None if active.contains(&line.worker_id) => {
                        missing += 1;
                        "not recorded".to_string()
                    }
                    None => "archived".to_string(),
                };
                blocks.push(format!(
                    "{}\nToday: {} · Month: {} h\nAdvances: {} · Net: <b>{}</b>",
                    escape_html(&line.name),
                    mark,
                    format::hours(line.total_hours),
                    self.money.format(line.advances),
                    self.money.format(line.net)
                ));
            }
        }
        blocks.push(format!(
            "\nNot recorded today: {}\n<b>Total to pay: {}</b>",
            missing,
            self.money.format(payroll.total_net())
        ));

        Ok(chunk_lines(blocks, MAX_MESSAGE_LEN)
            .into_iter()
            .map(Reply::text)
            .collect())
    }

    async fn excel_report(&self, month: Month) -> Result<Vec<Reply>, AppError> {
        let payroll = self.services.payroll.monthly_payroll(month).await?;
        if payroll.is_empty() {
            return Ok(vec![Reply::text(format!("No data for {}.", month))]);
        }

        let bytes = report::render_workbook(&payroll)?;
        log::info!(
            "Rendered payroll report for {} ({} workers, {} bytes)",
            month,
            payroll.worker_count(),
            bytes.len()
        );

        Ok(vec![Reply::Document {
            file_name: report::report_file_name(month),
            bytes,
            caption: format!(
                "Payroll for {}\nTotal to pay: {}",
                month,
                self.money.format(payroll.total_net())
            ),
        }])
    }

    //------------------------------------------------------------------------
    // Add worker
    //------------------------------------------------------------------------

    async fn add_worker_name(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let name = match validate_name(text) {
            Ok(name) => name,
            Err(err) => {
                return Ok(vec![Reply::with_keyboard(
                    format!("{}. Enter the full name:", err.user_message()),
                    Keyboard::cancel(),
                )]);
            }
        };

        self.sessions
            .set(account, Dialog::AddWorkerRate { name })
            .await;
        Ok(vec![Reply::with_keyboard(
            "Enter the hourly rate:",
            Keyboard::cancel(),
        )])
    }

    async fn add_worker_rate(
        &self,
        account: i64,
        name: String,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let Some(rate) = parse_number(text).filter(|r| *r > 0.0) else {
            return Ok(vec![Reply::with_keyboard(
                "The rate must be a number greater than 0. Enter the hourly rate:",
                Keyboard::cancel(),
            )]);
        };

        self.sessions
            .set(account, Dialog::AddWorkerSite { name, rate })
            .await;
        Ok(vec![Reply::with_keyboard(
            "Enter the site name, or press Skip:",
            Keyboard::skip_or_cancel(),
        )])
    }

    async fn add_worker_site(
        &self,
        account: i64,
        name: String,
        rate: f64,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let site = (text != keyboards::SKIP).then_some(text);
        let worker = self
            .services
            .workforce
            .register_worker(&name, rate, site)
            .await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Worker added.\n\n{}\n\nGive the login code to the worker.",
                format::worker_card(&worker, &self.money)
            ),
            Keyboard::admin_menu(),
        )])
    }

    //------------------------------------------------------------------------
    // Daily report
    //------------------------------------------------------------------------

    async fn start_daily_report(&self, account: i64) -> Result<Vec<Reply>, AppError> {
        let queue: Vec<QueuedWorker> = self
            .services
            .timesheet
            .daily_queue()
            .await?
            .into_iter()
            .map(|w| QueuedWorker {
                id: w.id,
                site: w.site_label().to_string(),
                name: w.name,
            })
            .collect();

        let Some(first) = queue.first() else {
            return Ok(vec![Reply::text("No active workers yet.")]);
        };

        let prompt = hours_prompt(first, 0, queue.len());
        self.sessions
            .set(
                account,
                Dialog::DailyReport {
                    queue,
                    position: 0,
                    recorded: 0,
                    skipped: 0,
                },
            )
            .await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Daily report for {}. Enter hours for each worker (0 = absent).\n\n{}",
                self.services.timesheet.today().format("%d.%m.%Y"),
                prompt
            ),
            Keyboard::skip_or_cancel(),
        )])
    }

    async fn daily_report_answer(
        &self,
        account: i64,
        queue: Vec<QueuedWorker>,
        position: usize,
        mut recorded: usize,
        mut skipped: usize,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let Some(current) = queue.get(position) else {
            self.sessions.clear(account).await;
            return Ok(vec![Reply::with_keyboard(
                "The daily report is finished.",
                Keyboard::admin_menu(),
            )]);
        };

        if text == keyboards::SKIP {
            skipped += 1;
        } else {
            let Some(hours) = parse_number(text).filter(|h| (0.0..=24.0).contains(h)) else {
                return Ok(vec![Reply::with_keyboard(
                    format!(
                        "Hours must be a number from 0 to 24.\n\n{}",
                        hours_prompt(current, position, queue.len())
                    ),
                    Keyboard::skip_or_cancel(),
                )]);
            };
            self.services
                .timesheet
                .record_today(current.id, hours)
                .await?;
            recorded += 1;
        }

        let position = position + 1;
        let Some(next) = queue.get(position) else {
            self.sessions.clear(account).await;
            return Ok(vec![Reply::with_keyboard(
                format!(
                    "Daily report saved.\nRecorded: {}\nSkipped: {}",
                    recorded, skipped
                ),
                Keyboard::admin_menu(),
            )]);
        };

        let prompt = hours_prompt(next, position, queue.len());
        self.sessions
            .set(
                account,
                Dialog::DailyReport {
                    queue,
                    position,
                    recorded,
                    skipped,
                },
            )
            .await;
        Ok(vec![Reply::with_keyboard(prompt, Keyboard::skip_or_cancel())])
    }

    //------------------------------------------------------------------------
    // Advances
    //------------------------------------------------------------------------

    async fn issue_advance_worker(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let worker = match self.services.workforce.find_active(text).await? {
            WorkerLookup::Found(worker) => worker,
            WorkerLookup::NotFound => {
                return Ok(vec![Reply::with_keyboard(
                    "No active worker found. Enter the ID or part of the name:",
                    Keyboard::cancel(),
                )]);
            }
            WorkerLookup::Ambiguous(matches) => return Ok(ambiguous_reply(&matches)),
        };

        self.sessions
            .set(
                account,
                Dialog::IssueAdvanceAmount {
                    worker_id: worker.id,
                    worker_name: worker.name.clone(),
                },
            )
            .await;
        Ok(vec![Reply::with_keyboard(
            format!("Advance for {}. Enter the amount:", escape_html(&worker.name)),
            Keyboard::cancel(),
        )])
    }

    async fn issue_advance_amount(
        &self,
        account: i64,
        worker_id: i64,
        worker_name: &str,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let Some(amount) = parse_number(text).filter(|a| *a > 0.0) else {
            return Ok(vec![Reply::with_keyboard(
                format!(
                    "The amount must be a number greater than 0. Enter the advance for {}:",
                    escape_html(worker_name)
                ),
                Keyboard::cancel(),
            )]);
        };

        let (worker, advance) = self
            .services
            .advances
            .issue(worker_id, amount, account)
            .await?;
        self.sessions.clear(account).await;

        if let Some(chat_id) = worker.account_id {
            self.notify(
                chat_id,
                Reply::text(format!(
                    "You received an advance of {}.",
                    self.money.format(advance.amount)
                )),
            )
            .await;
        }

        Ok(vec![Reply::with_keyboard(
            format!(
                "Advance of {} issued to {}.",
                self.money.format(advance.amount),
                escape_html(&worker.name)
            ),
            Keyboard::admin_menu(),
        )])
    }

    async fn decide_advance(
        &self,
        account: i64,
        decision: &str,
        advance_id: i64,
    ) -> Result<Vec<Reply>, AppError> {
        let approve = decision == "approve";
        let (worker, advance) = if approve {
            self.services.advances.approve(advance_id, account).await?
        } else {
            self.services.advances.reject(advance_id, account).await?
        };

        let amount = self.money.format(advance.amount);
        if let Some(chat_id) = worker.account_id {
            let text = if approve {
                format!("Your advance request of {} was approved.", amount)
            } else {
                format!("Your advance request of {} was rejected.", amount)
            };
            self.notify(chat_id, Reply::text(text)).await;
        }

        let verdict = if approve { "Approved" } else { "Rejected" };
        Ok(vec![Reply::text(format!(
            "{}: {} for {}.",
            verdict,
            amount,
            escape_html(&worker.name)
        ))])
    }

    //------------------------------------------------------------------------
    // Edit, archive, reset login
    //------------------------------------------------------------------------

    async fn edit_worker_id(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let worker = match self.services.workforce.find_active(text).await? {
            WorkerLookup::Found(worker) => worker,
            WorkerLookup::NotFound => {
                return Ok(vec![Reply::with_keyboard(
                    "No active worker found. Enter the ID or part of the name:",
                    Keyboard::cancel(),
                )]);
            }
            WorkerLookup::Ambiguous(matches) => return Ok(ambiguous_reply(&matches)),
        };

        self.sessions
            .set(
                account,
                Dialog::EditWorkerField {
                    worker_id: worker.id,
                    worker_name: worker.name.clone(),
                },
            )
            .await;
        Ok(vec![Reply::with_keyboard(
            format!(
                "{}\n\nWhat should be changed?",
                format::worker_card(&worker, &self.money)
            ),
            Keyboard::edit_fields(),
        )])
    }

    async fn edit_worker_field(&self, account: i64, data: &str) -> Result<Vec<Reply>, AppError> {
        let Some(Dialog::EditWorkerField {
            worker_id,
            worker_name,
        }) = self.sessions.get(account).await
        else {
            return Ok(vec![Reply::text(
                "This edit has expired. Open Settings to start again.",
            )]);
        };

        let (field, prompt) = match data {
            callbacks::EDIT_NAME => (WorkerField::Name, "Enter the new name:"),
            callbacks::EDIT_RATE => (WorkerField::Rate, "Enter the new hourly rate:"),
            _ => (
                WorkerField::Site,
                "Enter the new site name, or Skip to clear it:",
            ),
        };

        self.sessions
            .set(account, Dialog::EditWorkerValue { worker_id, field })
            .await;

        let keyboard = if field == WorkerField::Site {
            Keyboard::skip_or_cancel()
        } else {
            Keyboard::cancel()
        };
        Ok(vec![Reply::with_keyboard(
            format!("{}: {}", escape_html(&worker_name), prompt),
            keyboard,
        )])
    }

    async fn edit_worker_value(
        &self,
        account: i64,
        worker_id: i64,
        field: WorkerField,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let edit = match field {
            WorkerField::Name => WorkerEdit::Name(text.to_string()),
            WorkerField::Rate => match parse_number(text).filter(|r| *r > 0.0) {
                Some(rate) => WorkerEdit::Rate(rate),
                None => {
                    return Ok(vec![Reply::with_keyboard(
                        "The rate must be a number greater than 0. Enter the new hourly rate:",
                        Keyboard::cancel(),
                    )]);
                }
            },
            WorkerField::Site => {
                WorkerEdit::Site((text != keyboards::SKIP).then(|| text.to_string()))
            }
        };

        let worker = self.services.workforce.edit_worker(worker_id, edit).await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "{} updated.\n\n{}",
                field_label(field),
                format::worker_card(&worker, &self.money)
            ),
            Keyboard::admin_menu(),
        )])
    }

    async fn archive_worker(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let Some(worker_id) = parse_id(text) else {
            return Ok(vec![Reply::with_keyboard(
                "Enter the numeric worker ID:",
                Keyboard::cancel(),
            )]);
        };

        let worker = self.services.workforce.archive_worker(worker_id).await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "{} was archived. Past months keep their records.",
                escape_html(&worker.name)
            ),
            Keyboard::admin_menu(),
        )])
    }

    async fn reset_login(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let Some(worker_id) = parse_id(text) else {
            return Ok(vec![Reply::with_keyboard(
                "Enter the numeric worker ID:",
                Keyboard::cancel(),
            )]);
        };

        let worker = self.services.workforce.reset_login(worker_id).await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Login reset for {}. The code <code>{}</code> can be used again.",
                escape_html(&worker.name),
                worker.code
            ),
            Keyboard::admin_menu(),
        )])
    }

    //------------------------------------------------------------------------
    // Check-in settings
    //------------------------------------------------------------------------

    async fn location_point_text(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        if text == "-" {
            self.services.settings.clear_geofence().await?;
            self.sessions.clear(account).await;
            return Ok(vec![Reply::with_keyboard(
                "Location check-in is turned off.",
                Keyboard::admin_menu(),
            )]);
        }

        match parse_coordinates(text) {
            Some((latitude, longitude)) => self.location_point(account, latitude, longitude).await,
            None => Ok(vec![Reply::with_keyboard(
                "Send a location, or type the coordinates as <code>lat,lon</code>:",
                Keyboard::share_location(),
            )]),
        }
    }

    async fn location_point(
        &self,
        account: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Reply>, AppError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Ok(vec![Reply::with_keyboard(
                "Those coordinates are out of range. Try again:",
                Keyboard::share_location(),
            )]);
        }

        self.sessions
            .set(
                account,
                Dialog::LocationRadius {
                    latitude,
                    longitude,
                },
            )
            .await;
        Ok(vec![Reply::with_keyboard(
            "Enter the allowed radius in metres:",
            Keyboard::cancel(),
        )])
    }

    async fn location_radius(
        &self,
        account: i64,
        latitude: f64,
        longitude: f64,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let fence = match parse_number(text).map(|r| GeoFence::new(latitude, longitude, r)) {
            Some(Ok(fence)) => fence,
            _ => {
                return Ok(vec![Reply::with_keyboard(
                    "The radius must be a positive number of metres. Try again:",
                    Keyboard::cancel(),
                )]);
            }
        };

        let fence = self.services.settings.set_geofence(fence).await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Check-in location saved: {:.5}, {:.5} within {:.0} m.",
                fence.latitude, fence.longitude, fence.radius_m
            ),
            Keyboard::admin_menu(),
        )])
    }

    async fn checkin_hours(&self, account: i64, text: &str) -> Result<Vec<Reply>, AppError> {
        let Some(hours) = parse_number(text).filter(|h| *h > 0.0 && *h <= 24.0) else {
            return Ok(vec![Reply::with_keyboard(
                "Hours must be a number above 0 and at most 24:",
                Keyboard::cancel(),
            )]);
        };

        let hours = self.services.settings.set_checkin_hours(hours).await?;
        self.sessions.clear(account).await;

        Ok(vec![Reply::with_keyboard(
            format!("A check-in now counts as {} h.", format::hours(hours)),
            Keyboard::admin_menu(),
        )])
    }
}

fn hours_prompt(worker: &QueuedWorker, position: usize, total: usize) -> String {
    format!(
        "({}/{}) <b>{}</b> · {}\nHours worked today?",
        position + 1,
        total,
        escape_html(&worker.name),
        escape_html(&worker.site)
    )
}

fn field_label(field: WorkerField) -> &'static str {
    match field {
        WorkerField::Name => "Name",
        WorkerField::Rate => "Rate",
        WorkerField::Site => "Site",
    }
}

fn parse_id(text: &str) -> Option<i64> {
    text.trim().trim_start_matches('#').parse().ok()
}

fn group_by_site(workers: &[Worker]) -> BTreeMap<String, Vec<&Worker>> {
    let mut groups: BTreeMap<String, Vec<&Worker>> = BTreeMap::new();
    for worker in workers {
        groups
            .entry(worker.site_label().to_string())
            .or_default()
            .push(worker);
    }
    groups
}

fn ambiguous_reply(matches: &[Worker]) -> Vec<Reply> {
    let mut lines = vec!["Several workers match, enter the ID:".to_string()];
    lines.extend(matches.iter().map(format::worker_line));

    let mut replies: Vec<Reply> = chunk_lines(lines, MAX_MESSAGE_LEN)
        .into_iter()
        .map(Reply::text)
        .collect();
    if let Some(Reply::Text { keyboard, .. }) = replies.last_mut() {
        *keyboard = Some(Keyboard::cancel());
    }
    replies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_callbacks_are_recognised() {
        let caps = ADVANCE_DECISION.captures("advance:reject:17").unwrap();
        assert_eq!(&caps[1], "reject");
        assert_eq!(&caps[2], "17");
        assert!(ADVANCE_DECISION.captures("advance:delete:17").is_none());
    }

    #[test]
    fn ids_may_carry_a_hash() {
        assert_eq!(parse_id("#12"), Some(12));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("seven"), None);
    }
}
