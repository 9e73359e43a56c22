use crate::database::models::{GeneralStats, Worker, WorkerBalance};

/// Telegram rejects messages over 4096 characters
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Formats money with space thousands separators: `1 250 000 so'm`
#[derive(Debug, Clone)]
pub struct Money {
    currency: String,
}

impl Money {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn format(&self, amount: f64) -> String {
        let rounded = amount.round() as i64;
        let digits = rounded.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }

        let sign = if rounded < 0 { "-" } else { "" };
        format!("{}{} {}", sign, grouped, self.currency)
    }
}

pub fn hours(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Accepts `7.5`, `7,5` and `1 500 000`
pub fn parse_number(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses `lat,lon` or `lat lon`
pub fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [lat, lon] => Some((lat.parse().ok()?, lon.parse().ok()?)),
        _ => None,
    }
}

/// Splits line-oriented text into messages under `max_len` characters
pub fn chunk_lines<I, S>(lines: I, max_len: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let line = line.as_ref();
        let needed = if current.is_empty() {
            line.chars().count()
        } else {
            current.chars().count() + 1 + line.chars().count()
        };

        if needed > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn worker_line(worker: &Worker) -> String {
    let login = if worker.is_linked() { "linked" } else { "not linked" };
    format!(
        "<b>{}</b>. {} · code <code>{}</code> · {}",
        worker.id,
        escape_html(&worker.name),
        worker.code,
        login
    )
}

pub fn worker_card(worker: &Worker, money: &Money) -> String {
    format!(
        "<b>{}</b>\nID: {}\nRate: {}/h\nSite: {}\nLogin code: <code>{}</code>",
        escape_html(&worker.name),
        worker.id,
        money.format(worker.hourly_rate),
        escape_html(worker.site_label()),
        worker.code
    )
}

pub fn balance_message(balance: &WorkerBalance, money: &Money) -> String {
    let mut text = format!(
        "<b>{}</b>, {}\n\nHours worked: {}\nRate: {}/h\nEarned: {}\nAdvances: {}\n",
        escape_html(&balance.name),
        balance.month,
        hours(balance.hours),
        money.format(balance.hourly_rate),
        money.format(balance.gross),
        money.format(balance.approved_advances),
    );
    if balance.pending_advances > 0.0 {
        text.push_str(&format!(
            "Awaiting approval: {}\n",
            money.format(balance.pending_advances)
        ));
    }
    text.push_str(&format!("\n<b>To be paid: {}</b>", money.format(balance.net)));
    text
}

pub fn stats_message(stats: &GeneralStats, money: &Money) -> String {
    let top = match &stats.top_worker {
        Some(top) => format!("{} ({} h)", escape_html(&top.name), hours(top.hours)),
        None => "nobody yet".to_string(),
    };
    format!(
        "<b>Statistics for {}</b>\n\nActive workers: {}\nHours worked: {}\nAdvances issued: {}\nTop worker: {}",
        stats.month,
        stats.active_workers,
        hours(stats.total_hours),
        money.format(stats.total_advances),
        top
    )
}
