mod config;
mod consts;
mod picker;
mod prelude;
mod range;
mod selection;
mod set;
#[cfg(test)]
mod test_utils;
mod types;
mod view;

pub use config::{
    Blackout, BlackoutFn, ConfigError, DateInput, DayParser, Direction, Mode, ParseFn,
    PickerConfig, PickerOptions,
};
pub use consts::*;
pub use picker::{Picker, PickerEvent};
pub use range::DayRange;
pub use selection::{Containment, SelectionChange, SelectionManager};
pub use set::DayKeySet;
pub use types::{MonthCount, WeekStart, YearMonth};
pub use view::{ViewChange, ViewManager, ViewWindow};

use crate::prelude::*;
use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime};
use std::str::FromStr;

/// A calendar day with no time-of-day component.
///
/// Two values are equal iff their year, month and day match, so a plain
/// `CalendarDay` works as a set or map key without any normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
#[display(fmt = "{:04}-{:02}-{:02}", "_0.year()", "_0.month()", "_0.day()")]
pub struct CalendarDay(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(i64),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u32),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl CalendarDay {
    /// Earliest representable day
    pub const MIN: Self = Self(NaiveDate::MIN);
    /// Latest representable day
    pub const MAX: Self = Self(NaiveDate::MAX);

    /// Creates a day from its components, validating month and day-of-month
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` or `ParseError::InvalidDay` for
    /// impossible components, `ParseError::InvalidYear` if the year is outside
    /// the representable range.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ParseError> {
        if month == 0 || month > u32::from(MAX_MONTH) {
            return Err(ParseError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self).ok_or_else(|| {
            if NaiveDate::from_ymd_opt(year, month, u32::from(MIN_DAY)).is_some() {
                ParseError::InvalidDay { year, month, day }
            } else {
                ParseError::InvalidYear(i64::from(year))
            }
        })
    }

    /// The current day on the local clock
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    #[inline]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[inline]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[inline]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Day of week counted from Sunday (0 = Sunday … 6 = Saturday)
    pub fn weekday_from_sunday(self) -> u8 {
        u8::try_from(self.0.weekday().num_days_from_sunday()).unwrap_or(0)
    }

    /// Shifts by a signed number of days, saturating at [`Self::MIN`] / [`Self::MAX`]
    #[must_use]
    pub fn add_days(self, days: i64) -> Self {
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            self.0.checked_add_days(magnitude)
        } else {
            self.0.checked_sub_days(magnitude)
        };
        shifted.map_or(if days >= 0 { Self::MAX } else { Self::MIN }, Self)
    }

    /// The following day
    #[must_use]
    pub fn succ(self) -> Self {
        self.add_days(1)
    }

    /// The preceding day
    #[must_use]
    pub fn pred(self) -> Self {
        self.add_days(-1)
    }

    /// Signed number of days from `self` to `other`
    pub fn days_until(self, other: Self) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    pub fn year_month(self) -> YearMonth {
        YearMonth::of(self)
    }

    /// Shifts by a signed number of months. The day of month is clamped to the
    /// length of the target month (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn add_months(self, months: i32) -> Self {
        let magnitude = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            self.0.checked_add_months(magnitude)
        } else {
            self.0.checked_sub_months(magnitude)
        };
        shifted.map_or(if months >= 0 { Self::MAX } else { Self::MIN }, Self)
    }

    #[must_use]
    pub fn first_of_month(self) -> Self {
        self.year_month().first_day()
    }

    #[must_use]
    pub fn last_of_month(self) -> Self {
        self.year_month().last_day()
    }

    /// First day of the week containing `self`
    #[must_use]
    pub fn start_of_week(self, week_start: WeekStart) -> Self {
        let back = (self.weekday_from_sunday() + DAYS_IN_WEEK - week_start.get()) % DAYS_IN_WEEK;
        self.add_days(-i64::from(back))
    }

    /// Last day of the week containing `self`
    #[must_use]
    pub fn end_of_week(self, week_start: WeekStart) -> Self {
        self.start_of_week(week_start).add_days(i64::from(DAYS_IN_WEEK - 1))
    }

    pub fn same_month(self, other: Self) -> bool {
        self.year_month() == other.year_month()
    }

    pub const fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDateTime> for CalendarDay {
    fn from(value: NaiveDateTime) -> Self {
        Self(value.date())
    }
}

impl FromStr for CalendarDay {
    type Err = ParseError;

    /// Parses the ISO form `YYYY-MM-DD` for years `MIN_YEAR..=MAX_YEAR`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let date = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
            .map_err(|err| ParseError::InvalidFormat(format!("{trimmed}: {err}")))?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(ParseError::InvalidYear(i64::from(date.year())));
        }
        Ok(Self(date))
    }
}

impl serde::Serialize for CalendarDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::day;

    #[test]
    fn test_parse_iso_day() {
        let parsed = "2024-03-13".parse::<CalendarDay>().unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 13);
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let parsed = " 2024-03-13\n".parse::<CalendarDay>().unwrap();
        assert_eq!(parsed, day(2024, 3, 13));
    }

    #[test]
    fn test_parse_errors() {
        struct TestCase {
            raw:         &'static str,
            description: &'static str,
        }

        let cases = [
            TestCase { raw: "2024-03", description: "missing day" },
            TestCase { raw: "2024-XX-01", description: "non-numeric month" },
            TestCase { raw: "2024-13-01", description: "month out of range" },
            TestCase { raw: "2023-02-29", description: "no leap day in a common year" },
            TestCase { raw: "2024-03-13T10:00", description: "trailing time" },
        ];

        for case in &cases {
            assert!(
                matches!(case.raw.parse::<CalendarDay>(), Err(ParseError::InvalidFormat(_))),
                "Expected format error for: {}",
                case.description
            );
        }

        assert!(matches!("".parse::<CalendarDay>(), Err(ParseError::EmptyInput)));
        assert!(matches!("0000-01-01".parse::<CalendarDay>(), Err(ParseError::InvalidYear(0))));
        assert!("10000-01-01".parse::<CalendarDay>().is_err());
    }

    #[test]
    fn test_new_validates_components() {
        assert!(CalendarDay::new(2024, 2, 29).is_ok());
        assert!(matches!(CalendarDay::new(2024, 0, 1), Err(ParseError::InvalidMonth(0))));
        assert!(matches!(
            CalendarDay::new(2024, 4, 31),
            Err(ParseError::InvalidDay { year: 2024, month: 4, day: 31 })
        ));
        assert!(matches!(CalendarDay::new(2024, 1, 0), Err(ParseError::InvalidDay { .. })));
        assert!(matches!(CalendarDay::new(2024, 13, 1), Err(ParseError::InvalidMonth(13))));
        assert!(matches!(CalendarDay::new(400_000, 1, 1), Err(ParseError::InvalidYear(400_000))));
    }

    #[test]
    fn test_display() {
        assert_eq!(day(2024, 3, 5).to_string(), "2024-03-05");
        assert_eq!(day(987, 12, 31).to_string(), "0987-12-31");
    }

    #[test]
    fn test_time_of_day_is_discarded() {
        let morning = NaiveDate::from_ymd_opt(2024, 3, 13)
            .and_then(|d| d.and_hms_opt(0, 0, 1))
            .unwrap();
        let evening = NaiveDate::from_ymd_opt(2024, 3, 13)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap();
        assert_eq!(CalendarDay::from(morning), CalendarDay::from(evening));
        assert_eq!(CalendarDay::from(evening), day(2024, 3, 13));
    }

    #[test]
    fn test_ordering() {
        assert!(day(2023, 12, 31) < day(2024, 1, 1));
        assert!(day(2024, 1, 31) < day(2024, 2, 1));
        assert!(day(2024, 2, 1) < day(2024, 2, 2));
    }

    #[test]
    fn test_add_days_across_boundaries() {
        assert_eq!(day(2024, 2, 28).succ(), day(2024, 2, 29));
        assert_eq!(day(2024, 2, 29).succ(), day(2024, 3, 1));
        assert_eq!(day(2024, 1, 1).pred(), day(2023, 12, 31));
        assert_eq!(day(2024, 1, 1).add_days(366), day(2025, 1, 1));
        assert_eq!(CalendarDay::MAX.succ(), CalendarDay::MAX);
        assert_eq!(CalendarDay::MIN.pred(), CalendarDay::MIN);
    }

    #[test]
    fn test_days_until() {
        assert_eq!(day(2024, 1, 1).days_until(day(2024, 3, 1)), 60);
        assert_eq!(day(2024, 3, 1).days_until(day(2024, 1, 1)), -60);
    }

    #[test]
    fn test_add_months_clamps_day() {
        struct TestCase {
            start:       (i32, u32, u32),
            months:      i32,
            expected:    (i32, u32, u32),
            description: &'static str,
        }

        let cases = [
            TestCase {
                start:       (2024, 1, 31),
                months:      1,
                expected:    (2024, 2, 29),
                description: "leap February clamps to 29",
            },
            TestCase {
                start:       (2023, 1, 31),
                months:      1,
                expected:    (2023, 2, 28),
                description: "common February clamps to 28",
            },
            TestCase {
                start:       (2024, 3, 15),
                months:      -3,
                expected:    (2023, 12, 15),
                description: "backwards across a year",
            },
            TestCase {
                start:       (2024, 10, 1),
                months:      2,
                expected:    (2024, 12, 1),
                description: "forwards within a year",
            },
        ];

        for case in &cases {
            let start = day(case.start.0, case.start.1, case.start.2);
            let expected = day(case.expected.0, case.expected.1, case.expected.2);
            assert_eq!(start.add_months(case.months), expected, "{}", case.description);
        }
    }

    #[test]
    fn test_month_edges() {
        assert_eq!(day(2024, 2, 14).first_of_month(), day(2024, 2, 1));
        assert_eq!(day(2024, 2, 14).last_of_month(), day(2024, 2, 29));
        assert!(day(2024, 2, 1).same_month(day(2024, 2, 29)));
        assert!(!day(2024, 2, 1).same_month(day(2023, 2, 1)));
    }

    #[test]
    fn test_week_bounds() {
        // 2024-03-13 is a Wednesday
        let wednesday = day(2024, 3, 13);
        assert_eq!(wednesday.weekday_from_sunday(), 3);

        assert_eq!(wednesday.start_of_week(WeekStart::SUNDAY), day(2024, 3, 10));
        assert_eq!(wednesday.end_of_week(WeekStart::SUNDAY), day(2024, 3, 16));

        assert_eq!(wednesday.start_of_week(WeekStart::MONDAY), day(2024, 3, 11));
        assert_eq!(wednesday.end_of_week(WeekStart::MONDAY), day(2024, 3, 17));

        let saturday_start = WeekStart::new(6).unwrap();
        assert_eq!(wednesday.start_of_week(saturday_start), day(2024, 3, 9));
        assert_eq!(wednesday.end_of_week(saturday_start), day(2024, 3, 15));
    }

    #[test]
    fn test_week_start_on_anchor_day() {
        // A Monday is its own start of week when weeks begin on Monday
        let monday = day(2024, 3, 11);
        assert_eq!(monday.start_of_week(WeekStart::MONDAY), monday);
        assert_eq!(monday.end_of_week(WeekStart::MONDAY), day(2024, 3, 17));
    }

    #[test]
    fn test_serde_string_format() {
        let d = day(2024, 3, 13);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#""2024-03-13""#);
        let parsed: CalendarDay = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn test_serde_validation() {
        assert!(serde_json::from_str::<CalendarDay>(r#""2024-02-30""#).is_err());
        assert!(serde_json::from_str::<CalendarDay>(r#""2024-13-01""#).is_err());
        assert!(serde_json::from_str::<CalendarDay>(r#""not a date""#).is_err());
    }
}
