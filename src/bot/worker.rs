use super::format::{self, escape_html, parse_number};
use super::keyboards::{self, Keyboard};
use super::{Bot, Dialog, Incoming, Reply};
use crate::database::models::Worker;
use crate::error::AppError;
use crate::services::CheckIn;

impl Bot {
    pub(super) async fn guest_text(
        &self,
        incoming: &Incoming,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        let in_login = matches!(
            self.sessions.get(incoming.account_id).await,
            Some(Dialog::Login)
        );
        let looks_like_code = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());

        if !in_login && !looks_like_code {
            return self.login_prompt(incoming).await;
        }

        let worker = self
            .services
            .workforce
            .login(text, incoming.account_id)
            .await?;
        self.sessions.clear(incoming.account_id).await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Welcome, {}! You are logged in.",
                escape_html(&worker.name)
            ),
            Keyboard::worker_menu(),
        )])
    }

    pub(super) async fn worker_text(
        &self,
        incoming: &Incoming,
        worker: &Worker,
        text: &str,
    ) -> Result<Vec<Reply>, AppError> {
        match text {
            keyboards::MY_BALANCE => {
                self.sessions.clear(incoming.account_id).await;
                return self.my_balance(incoming).await;
            }
            keyboards::REQUEST_ADVANCE => {
                self.sessions.clear(incoming.account_id).await;
                return self.start_advance_request(incoming).await;
            }
            keyboards::CHECK_IN => {
                self.sessions.clear(incoming.account_id).await;
                return Ok(vec![Reply::with_keyboard(
                    "Share your current location to check in.",
                    Keyboard::worker_menu(),
                )]);
            }
            _ => {}
        }

        match self.sessions.get(incoming.account_id).await {
            Some(Dialog::RequestAdvanceAmount { limit }) => {
                self.submit_advance_request(incoming, worker, text, limit)
                    .await
            }
            _ => Ok(vec![Reply::with_keyboard(
                "Choose an action from the menu.",
                Keyboard::worker_menu(),
            )]),
        }
    }

    async fn my_balance(&self, incoming: &Incoming) -> Result<Vec<Reply>, AppError> {
        let balance = self
            .services
            .payroll
            .balance_for_account(incoming.account_id)
            .await?;
        Ok(vec![Reply::with_keyboard(
            format::balance_message(&balance, &self.money),
            Keyboard::worker_menu(),
        )])
    }

    async fn start_advance_request(&self, incoming: &Incoming) -> Result<Vec<Reply>, AppError> {
        let (_, limit) = self
            .services
            .advances
            .limit_for_account(incoming.account_id)
            .await?;

        if !limit.allows_requests() {
            return Ok(vec![Reply::with_keyboard(
                format!(
                    "You cannot request an advance right now.\nEarned this month: {}\nAlready taken or requested: {}",
                    self.money.format(limit.balance.gross),
                    self.money
                        .format(limit.balance.approved_advances + limit.balance.pending_advances)
                ),
                Keyboard::worker_menu(),
            )]);
        }

        self.sessions
            .set(
                incoming.account_id,
                Dialog::RequestAdvanceAmount { limit: limit.limit },
            )
            .await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "You can request up to <b>{}</b>.\nEnter the amount:",
                self.money.format(limit.limit)
            ),
            Keyboard::cancel(),
        )])
    }

    async fn submit_advance_request(
        &self,
        incoming: &Incoming,
        worker: &Worker,
        text: &str,
        limit: f64,
    ) -> Result<Vec<Reply>, AppError> {
        let Some(amount) = parse_number(text).filter(|a| *a > 0.0) else {
            return Ok(vec![Reply::with_keyboard(
                format!(
                    "Enter the amount as a number, up to {}.",
                    self.money.format(limit)
                ),
                Keyboard::cancel(),
            )]);
        };

        let (_, advance) = self
            .services
            .advances
            .request(incoming.account_id, amount)
            .await?;
        self.sessions.clear(incoming.account_id).await;

        self.notify_admins(Reply::with_keyboard(
            format!(
                "<b>Advance request</b>\nWorker: {} (ID {})\nAmount: {}",
                escape_html(&worker.name),
                worker.id,
                self.money.format(advance.amount)
            ),
            Keyboard::advance_decision(advance.id),
        ))
        .await;

        Ok(vec![Reply::with_keyboard(
            format!(
                "Your request for {} was sent to the admin.",
                self.money.format(advance.amount)
            ),
            Keyboard::worker_menu(),
        )])
    }

    pub(super) async fn worker_check_in(
        &self,
        incoming: &Incoming,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Reply>, AppError> {
        let text = match self
            .services
            .timesheet
            .check_in(incoming.account_id, latitude, longitude)
            .await?
        {
            CheckIn::Recorded(record) => format!(
                "Checked in for {}: {} h recorded.",
                record.work_date.format("%d.%m.%Y"),
                format::hours(record.hours)
            ),
            CheckIn::AlreadyRecorded(record) => format!(
                "Attendance for {} is already recorded ({} h).",
                record.work_date.format("%d.%m.%Y"),
                format::hours(record.hours)
            ),
        };

        Ok(vec![Reply::with_keyboard(text, Keyboard::worker_menu())])
    }
}
