use serde::Serialize;

// Reply-menu labels. Incoming text equal to one of these is a menu selection.
pub const DAILY_REPORT: &str = "Daily report";
pub const CURRENT_STATUS: &str = "Current status";
pub const WORKERS: &str = "Workers";
pub const ISSUE_ADVANCE: &str = "Issue advance";
pub const EXCEL_REPORT: &str = "Excel report";
pub const SETTINGS: &str = "Settings";

pub const MY_BALANCE: &str = "My balance";
pub const REQUEST_ADVANCE: &str = "Request advance";
pub const CHECK_IN: &str = "Check in";

pub const CANCEL: &str = "Cancel";
pub const SKIP: &str = "Skip";

pub const ADMIN_MENU: [&str; 6] = [
    DAILY_REPORT,
    CURRENT_STATUS,
    WORKERS,
    ISSUE_ADVANCE,
    EXCEL_REPORT,
    SETTINGS,
];
pub const WORKER_MENU: [&str; 3] = [MY_BALANCE, REQUEST_ADVANCE, CHECK_IN];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButton {
    pub text: String,
    pub request_location: bool,
}

impl ReplyButton {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            request_location: false,
        }
    }

    pub fn location(text: &str) -> Self {
        Self {
            text: text.to_string(),
            request_location: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "rows", rename_all = "snake_case")]
pub enum Keyboard {
    Menu(Vec<Vec<ReplyButton>>),
    Inline(Vec<Vec<InlineButton>>),
    Remove,
}

impl Keyboard {
    pub fn admin_menu() -> Self {
        Keyboard::Menu(
            ADMIN_MENU
                .chunks(2)
                .map(|row| row.iter().map(|label| ReplyButton::text(label)).collect())
                .collect(),
        )
    }

    pub fn worker_menu() -> Self {
        Keyboard::Menu(vec![
            vec![ReplyButton::text(MY_BALANCE), ReplyButton::text(REQUEST_ADVANCE)],
            vec![ReplyButton::location(CHECK_IN)],
        ])
    }

    pub fn cancel() -> Self {
        Keyboard::Menu(vec![vec![ReplyButton::text(CANCEL)]])
    }

    pub fn skip_or_cancel() -> Self {
        Keyboard::Menu(vec![vec![ReplyButton::text(SKIP), ReplyButton::text(CANCEL)]])
    }

    pub fn share_location() -> Self {
        Keyboard::Menu(vec![
            vec![ReplyButton::location("Send current location")],
            vec![ReplyButton::text(CANCEL)],
        ])
    }

    pub fn settings() -> Self {
        Keyboard::Inline(vec![
            vec![
                InlineButton::new("Add worker", callbacks::SETTINGS_ADD),
                InlineButton::new("Edit worker", callbacks::SETTINGS_EDIT),
            ],
            vec![
                InlineButton::new("Archive worker", callbacks::SETTINGS_ARCHIVE),
                InlineButton::new("Reset login", callbacks::SETTINGS_RESET),
            ],
            vec![
                InlineButton::new("Statistics", callbacks::SETTINGS_STATS),
                InlineButton::new("Check-in location", callbacks::SETTINGS_LOCATION),
            ],
            vec![InlineButton::new("Check-in hours", callbacks::SETTINGS_HOURS)],
        ])
    }

    pub fn edit_fields() -> Self {
        Keyboard::Inline(vec![vec![
            InlineButton::new("Name", callbacks::EDIT_NAME),
            InlineButton::new("Rate", callbacks::EDIT_RATE),
            InlineButton::new("Site", callbacks::EDIT_SITE),
        ]])
    }

    pub fn advance_decision(advance_id: i64) -> Self {
        Keyboard::Inline(vec![vec![
            InlineButton::new("Approve", format!("advance:approve:{}", advance_id)),
            InlineButton::new("Reject", format!("advance:reject:{}", advance_id)),
        ]])
    }
}

/// Callback payloads carried by inline buttons
pub mod callbacks {
    pub const SETTINGS_ADD: &str = "settings:add";
    pub const SETTINGS_EDIT: &str = "settings:edit";
    pub const SETTINGS_ARCHIVE: &str = "settings:archive";
    pub const SETTINGS_RESET: &str = "settings:reset";
    pub const SETTINGS_STATS: &str = "settings:stats";
    pub const SETTINGS_LOCATION: &str = "settings:location";
    pub const SETTINGS_HOURS: &str = "settings:hours";

    pub const EDIT_NAME: &str = "edit:name";
    pub const EDIT_RATE: &str = "edit:rate";
    pub const EDIT_SITE: &str = "edit:site";
}
