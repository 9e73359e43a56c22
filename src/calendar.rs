use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Wall clock of the business, in a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct Calendar {
    offset: FixedOffset,
    frozen: Option<DateTime<FixedOffset>>,
}

impl Calendar {
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self {
            offset,
            frozen: None,
        }
    }

    /// A calendar that always reports the given local date at noon
    pub fn frozen(utc_offset_hours: i32, today: NaiveDate) -> Self {
        let mut calendar = Self::new(utc_offset_hours);
        calendar.frozen = today
            .and_hms_opt(12, 0, 0)
            .and_then(|naive| naive.and_local_timezone(calendar.offset).single());
        calendar
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.frozen
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset))
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn current_month(&self) -> Month {
        Month::of(self.today())
    }
}

/// A calendar month, the payroll period.
///
/// Only built from dates chrono can represent, so both ends always exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
    last: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = (28..=31).rev().find_map(|day| first.with_day(day))?;
        Some(Self { first, last })
    }

    pub fn of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = (28..=31)
            .rev()
            .find_map(|day| date.with_day(day))
            .unwrap_or(date);
        Self { first, last }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month number
    pub fn number(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn days(&self) -> u32 {
        self.last.day()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.first.iter_days().take(self.days() as usize)
    }

    /// `None` past the last month chrono can represent
    pub fn next(&self) -> Option<Month> {
        self.last.succ_opt().map(Month::of)
    }

    pub fn previous(&self) -> Option<Month> {
        self.first.pred_opt().map(Month::of)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.first..=self.last).contains(&date)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.first.month0() as usize]
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}-{:02}", self.year(), self.number()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts `YYYY-MM` and `MM.YYYY`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some((year, month)) = s.split_once('-') {
            year.parse().ok().zip(month.parse().ok())
        } else if let Some((month, year)) = s.split_once('.') {
            year.parse().ok().zip(month.parse().ok())
        } else {
            None
        };

        parsed
            .and_then(|(year, month)| Month::new(year, month))
            .ok_or_else(|| format!("Invalid month: {} (expected YYYY-MM)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn month_boundaries() {
        let feb = Month::new(2024, 2).unwrap();
        assert_eq!(feb.days(), 29);
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(Month::new(2025, 12).unwrap().next(), Month::new(2026, 1));
        assert_eq!(Month::new(2025, 1).unwrap().previous(), Month::new(2024, 12));
        assert_eq!(Month::new(2025, 4).unwrap().dates().count(), 30);
    }

    #[test]
    fn last_representable_month_has_no_successor() {
        let last = Month::of(NaiveDate::MAX);
        assert_eq!(last.last_day(), NaiveDate::MAX);
        assert_eq!(last.days(), 31);
        assert_eq!(last.next(), None);
        assert!(Month::new(NaiveDate::MAX.year() + 1, 1).is_none());
    }

    #[test]
    fn serializes_as_year_and_month() {
        let month = Month::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2025-03\"");
    }

    #[test]
    fn parses_both_notations() {
        assert_eq!("2025-11".parse::<Month>().unwrap(), Month::new(2025, 11).unwrap());
        assert_eq!("03.2024".parse::<Month>().unwrap(), Month::new(2024, 3).unwrap());
        assert!("2025-13".parse::<Month>().is_err());
        assert!("november".parse::<Month>().is_err());
    }

    #[test]
    fn frozen_calendar_reports_fixed_day() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
        let calendar = Calendar::frozen(5, day);
        assert_eq!(calendar.today(), day);
        assert_eq!(calendar.current_month().to_string(), "November 2025");
    }
}
