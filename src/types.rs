use crate::config::ConfigError;
use crate::consts::{DATE_SEPARATOR, MAX_MONTH, MAX_WEEK_START, MIN_DAY, MONTHS_IN_YEAR};
use crate::{CalendarDay, ParseError};
use chrono::Months;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

/// A calendar month of a specific year, used as the unit of view navigation.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year:  i32,
    month: u8,
}

impl YearMonth {
    /// Creates a new `YearMonth`, validating the month number
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` if the month is 0 or > `MAX_MONTH`.
    pub fn new(year: i32, month: u8) -> Result<Self, ParseError> {
        if month == 0 || month > MAX_MONTH {
            return Err(ParseError::InvalidMonth(u32::from(month)));
        }
        Ok(Self { year, month })
    }

    /// The month containing `day`
    pub fn of(day: CalendarDay) -> Self {
        Self::from_index(i64::from(day.year()) * MONTHS_IN_YEAR + i64::from(day.month()) - 1)
    }

    #[inline]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1-indexed
    #[inline]
    pub const fn month(self) -> u8 {
        self.month
    }

    const fn index(self) -> i64 {
        self.year as i64 * MONTHS_IN_YEAR + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        let year = i32::try_from(index.div_euclid(MONTHS_IN_YEAR))
            .unwrap_or(if index < 0 { i32::MIN } else { i32::MAX });
        // rem_euclid(12) is always 0..=11
        let month = u8::try_from(index.rem_euclid(MONTHS_IN_YEAR) + 1).unwrap_or(MAX_MONTH);
        Self { year, month }
    }

    /// Shifts by a signed number of months, rolling over year boundaries
    #[must_use]
    pub fn add(self, months: i32) -> Self {
        Self::from_index(self.index() + i64::from(months))
    }

    /// Signed number of months from `self` to `other`
    pub const fn months_until(self, other: Self) -> i64 {
        other.index() - self.index()
    }

    /// First day of this month, saturating to the representable range
    pub fn first_day(self) -> CalendarDay {
        CalendarDay::new(self.year, u32::from(self.month), u32::from(MIN_DAY)).unwrap_or(if self.year < 0 {
            CalendarDay::MIN
        } else {
            CalendarDay::MAX
        })
    }

    /// Last day of this month: the day before the first of the next month
    pub fn last_day(self) -> CalendarDay {
        self.first_day()
            .as_naive()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map_or(CalendarDay::MAX, CalendarDay::from)
    }

    /// Whether `day` falls in this month
    pub fn contains(self, day: CalendarDay) -> bool {
        day.year_month() == self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let (year, month) = trimmed
            .rsplit_once(DATE_SEPARATOR)
            .ok_or_else(|| ParseError::InvalidFormat(trimmed.to_owned()))?;
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidFormat(trimmed.to_owned()))?;
        let month = month
            .trim()
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(trimmed.to_owned()))?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// First day of the calendar week as an offset from Sunday (0 = Sunday, 1 = Monday, … 6 = Saturday)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekStart(u8);

impl WeekStart {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);

    /// Creates a new `WeekStart`, validating the offset is within `0..=MAX_WEEK_START`
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidWeekStart` if the value is > `MAX_WEEK_START`.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if value > MAX_WEEK_START {
            return Err(ConfigError::InvalidWeekStart(i64::from(value)));
        }
        Ok(Self(value))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for WeekStart {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekStart> for u8 {
    fn from(week_start: WeekStart) -> Self {
        week_start.0
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of consecutive months shown at once. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct MonthCount(NonZeroU16);

impl MonthCount {
    pub const ONE: Self = Self(NonZeroU16::MIN);

    /// Creates a new `MonthCount`
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidMonthCount` if the value is 0.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        NonZeroU16::new(value)
            .map(Self)
            .ok_or(ConfigError::InvalidMonthCount(i64::from(value)))
    }

    /// Floors an arbitrary number to a month count, never going below one
    pub fn coerce(value: f64) -> Self {
        if value.is_nan() || value < 1.0 {
            return Self::ONE;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let floored = value.floor().min(f64::from(u16::MAX)) as u16;
        NonZeroU16::new(floored).map_or(Self::ONE, Self)
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    /// Months between the first and the last visible month (`months - 1`)
    #[inline]
    pub fn span(self) -> i32 {
        i32::from(self.0.get()) - 1
    }
}

impl Default for MonthCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u16> for MonthCount {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MonthCount> for u16 {
    fn from(months: MonthCount) -> Self {
        months.get()
    }
}
