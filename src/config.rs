use std::{
    fmt,
    fmt::Write as _,
    panic::{self, AssertUnwindSafe},
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{
    Deserialize, Serialize,
    de::{self, Unexpected, Visitor},
};

use crate::{CalendarDay, DayKeySet, MAX_WEEK_START, MonthCount, WeekStart, prelude::*};

/// Errors raised by strict configuration constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown selection mode: {0}")]
    UnknownMode(String),

    #[error("Unknown navigation direction: {0}")]
    UnknownDirection(String),

    #[error("Invalid week start {0} (must be 0-{max})", max = MAX_WEEK_START)]
    InvalidWeekStart(i64),

    #[error("Invalid month count {0} (must be at least 1)")]
    InvalidMonthCount(i64),
}

/// Lowercases and unifies `_` / `-` so `"TODAY_PAST"` and `"today-past"` match
fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

/// How clicks and programmatic values map onto the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Zero or one day
    #[default]
    #[display(fmt = "single")]
    Single,
    /// Any number of distinct days
    #[display(fmt = "multiple")]
    Multiple,
    /// Zero or two days, `[start, end]`
    #[display(fmt = "range")]
    Range,
    /// First and last day of the week containing the anchor day
    #[display(fmt = "week")]
    Week,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            "range" => Ok(Self::Range),
            "week" => Ok(Self::Week),
            _ => Err(ConfigError::UnknownMode(s.to_owned())),
        }
    }
}

impl Mode {
    /// Lenient conversion: unset or unrecognised values become [`Mode::Single`]
    pub fn coerce(raw: Option<&str>) -> Self {
        raw.map_or_else(Self::default, |raw| {
            raw.parse().unwrap_or_else(|err| {
                warn!("{err}, falling back to {}", Self::default());
                Self::default()
            })
        })
    }
}

/// Which side of today the picker may navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Strictly before today
    #[display(fmt = "past")]
    Past,
    /// Today or earlier
    #[display(fmt = "today-past")]
    TodayPast,
    #[default]
    #[display(fmt = "any")]
    Any,
    /// Today or later
    #[display(fmt = "today-future")]
    TodayFuture,
    /// Strictly after today
    #[display(fmt = "future")]
    Future,
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "past" => Ok(Self::Past),
            "today-past" => Ok(Self::TodayPast),
            "any" => Ok(Self::Any),
            "today-future" => Ok(Self::TodayFuture),
            "future" => Ok(Self::Future),
            _ => Err(ConfigError::UnknownDirection(s.to_owned())),
        }
    }
}

impl Direction {
    /// Lenient conversion: unset or unrecognised values become [`Direction::Any`]
    pub fn coerce(raw: Option<&str>) -> Self {
        raw.map_or_else(Self::default, |raw| {
            raw.parse().unwrap_or_else(|err| {
                warn!("{err}, falling back to {}", Self::default());
                Self::default()
            })
        })
    }

    /// Inclusive `(start, end)` navigation bounds implied relative to `today`
    pub fn implied_bounds(self, today: CalendarDay) -> (Option<CalendarDay>, Option<CalendarDay>) {
        match self {
            Self::Past => (None, Some(today.pred())),
            Self::TodayPast => (None, Some(today)),
            Self::Any => (None, None),
            Self::TodayFuture => (Some(today), None),
            Self::Future => (Some(today.succ()), None),
        }
    }

    /// Directions whose window already starts at or after today
    pub const fn is_future_biased(self) -> bool {
        matches!(self, Self::TodayFuture | Self::Future)
    }
}

/// A raw, not yet validated date value supplied by the host.
///
/// Deserialized strings always land in `Text` so that the configured
/// [`DayParser`] decides how to read them; numbers become `Timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, From, Serialize)]
#[serde(untagged)]
pub enum DateInput {
    Day(CalendarDay),
    /// Time of day is discarded
    DateTime(NaiveDateTime),
    Text(String),
    /// Milliseconds since the Unix epoch, resolved to the local day
    Timestamp(i64),
}

impl DateInput {
    /// Blank text is treated as "no value" and dropped before parsing
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for DateInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DateInputVisitor)
    }
}

struct DateInputVisitor;

impl Visitor<'_> for DateInputVisitor {
    type Value = DateInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        Ok(DateInput::Text(text.to_owned()))
    }

    fn visit_string<E: de::Error>(self, text: String) -> Result<Self::Value, E> {
        Ok(DateInput::Text(text))
    }

    fn visit_i64<E: de::Error>(self, millis: i64) -> Result<Self::Value, E> {
        Ok(DateInput::Timestamp(millis))
    }

    fn visit_u64<E: de::Error>(self, millis: u64) -> Result<Self::Value, E> {
        i64::try_from(millis)
            .map(DateInput::Timestamp)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(millis), &self))
    }

    fn visit_f64<E: de::Error>(self, millis: f64) -> Result<Self::Value, E> {
        // i64::MAX as f64 rounds up, so the upper bound is exclusive
        #[allow(clippy::cast_precision_loss)]
        let in_range = millis.is_finite() && (i64::MIN as f64..i64::MAX as f64).contains(&millis);
        if !in_range {
            return Err(E::invalid_value(Unexpected::Float(millis), &self));
        }
        #[allow(clippy::cast_possible_truncation)]
        let millis = millis.trunc() as i64;
        Ok(DateInput::Timestamp(millis))
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        Self::Day(CalendarDay::from(date))
    }
}

/// Caller-supplied text parser. A panic inside it is caught and reads as
/// `None` (unless the host builds with `panic = "abort"`).
pub type ParseFn = Arc<dyn Fn(&str) -> Option<CalendarDay> + Send + Sync>;

/// Turns [`DateInput`] into a [`CalendarDay`], yielding `None` for anything
/// that cannot be read as a date.
#[derive(Clone, Default)]
pub enum DayParser {
    /// `YYYY-MM-DD`, naive ISO date-times and RFC 3339 timestamps
    #[default]
    Iso,
    /// A `chrono` strftime pattern such as `%m/%d/%Y`
    Format(String),
    Custom(ParseFn),
}

impl fmt::Debug for DayParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso => f.write_str("Iso"),
            Self::Format(pattern) => f.debug_tuple("Format").field(pattern).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl DayParser {
    pub fn parse(&self, input: &DateInput) -> Option<CalendarDay> {
        match input {
            DateInput::Day(day) => Some(*day),
            DateInput::DateTime(date_time) => Some(CalendarDay::from(*date_time)),
            DateInput::Timestamp(millis) => DateTime::from_timestamp_millis(*millis)
                .map(|utc| CalendarDay::from(utc.with_timezone(&Local).date_naive())),
            DateInput::Text(text) if text.trim().is_empty() => None,
            DateInput::Text(text) => self.parse_text(text.trim()),
        }
    }

    fn parse_text(&self, text: &str) -> Option<CalendarDay> {
        match self {
            Self::Iso => text
                .parse::<CalendarDay>()
                .ok()
                .or_else(|| Self::parse_naive_date_time(text))
                .or_else(|| {
                    DateTime::parse_from_rfc3339(text)
                        .ok()
                        .map(|fixed| CalendarDay::from(fixed.with_timezone(&Local).date_naive()))
                }),
            Self::Format(pattern) => NaiveDate::parse_from_str(text, pattern)
                .map(CalendarDay::from)
                .or_else(|_| NaiveDateTime::parse_from_str(text, pattern).map(CalendarDay::from))
                .ok(),
            Self::Custom(parse) => panic::catch_unwind(AssertUnwindSafe(|| parse(text))).unwrap_or_else(|_| {
                warn!("custom parser panicked on {text:?}, treating it as unparseable");
                None
            }),
        }
    }

    fn parse_naive_date_time(text: &str) -> Option<CalendarDay> {
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
            .map(CalendarDay::from)
    }

    /// Renders `day` so that [`DayParser::parse`] reads it back unchanged.
    /// Custom parsers have no paired formatter and render ISO text.
    pub fn format(&self, day: CalendarDay) -> String {
        match self {
            Self::Iso | Self::Custom(_) => day.to_string(),
            Self::Format(pattern) => {
                let mut out = String::new();
                // An invalid pattern reports a fmt::Error instead of text
                if write!(out, "{}", day.as_naive().format(pattern)).is_err() {
                    return day.to_string();
                }
                out
            },
        }
    }
}

/// Caller-supplied blackout predicate
pub type BlackoutFn = Arc<dyn Fn(CalendarDay) -> bool + Send + Sync>;

/// Days that may not be picked
#[derive(Clone, Default)]
pub enum Blackout {
    #[default]
    Never,
    Days(DayKeySet),
    Predicate(BlackoutFn),
}

impl fmt::Debug for Blackout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Days(days) => f.debug_tuple("Days").field(&days.sorted()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Blackout {
    pub fn is_blacked_out(&self, day: CalendarDay) -> bool {
        match self {
            Self::Never => false,
            Self::Days(days) => days.has(day),
            Self::Predicate(predicate) => predicate(day),
        }
    }
}

/// Raw picker options as supplied by the host.
///
/// Every field is optional. The serializable subset can be read from JSON with
/// camelCase keys; closures are attached with [`PickerOptions::with_parse`] and
/// [`PickerOptions::with_blackout`]. [`PickerConfig::normalize`] never fails:
/// unknown values fall back to defaults and a warning is logged.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerOptions {
    pub mode:           Option<String>,
    pub direction:      Option<String>,
    pub months:         Option<f64>,
    pub week_start:     Option<i64>,
    pub today:          Option<DateInput>,
    pub start_date:     Option<DateInput>,
    pub end_date:       Option<DateInput>,
    /// strftime pattern used to parse text values
    pub format:         Option<String>,
    pub blackout_dates: Option<Vec<DateInput>>,
    /// Takes precedence over `format`
    #[serde(skip)]
    pub parse:          Option<ParseFn>,
    /// Takes precedence over `blackout_dates`
    #[serde(skip)]
    pub blackout:       Option<BlackoutFn>,
}

impl fmt::Debug for PickerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerOptions")
            .field("mode", &self.mode)
            .field("direction", &self.direction)
            .field("months", &self.months)
            .field("week_start", &self.week_start)
            .field("today", &self.today)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("format", &self.format)
            .field("blackout_dates", &self.blackout_dates)
            .field("parse", &self.parse.as_ref().map(|_| ".."))
            .field("blackout", &self.blackout.as_ref().map(|_| ".."))
            .finish()
    }
}

impl PickerOptions {
    #[must_use]
    pub fn with_parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Option<CalendarDay> + Send + Sync + 'static,
    {
        self.parse = Some(Arc::new(parse));
        self
    }

    #[must_use]
    pub fn with_blackout<F>(mut self, blackout: F) -> Self
    where
        F: Fn(CalendarDay) -> bool + Send + Sync + 'static,
    {
        self.blackout = Some(Arc::new(blackout));
        self
    }
}

/// Canonical configuration shared by the selection and view managers.
///
/// `today` is resolved once per normalisation and stays fixed until the host
/// normalises again.
#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub parser:     DayParser,
    pub mode:       Mode,
    pub direction:  Direction,
    pub months:     MonthCount,
    pub week_start: WeekStart,
    pub today:      CalendarDay,
    /// Inclusive lower navigation bound
    pub start_date: Option<CalendarDay>,
    /// Inclusive upper navigation bound
    pub end_date:   Option<CalendarDay>,
    pub blackout:   Blackout,
}

impl PickerConfig {
    /// Normalises against the live local clock
    pub fn normalize(options: &PickerOptions) -> Self {
        Self::normalize_at(options, CalendarDay::today())
    }

    /// Normalises with `live_today` standing in for the clock when the
    /// options carry no `today`
    pub fn normalize_at(options: &PickerOptions, live_today: CalendarDay) -> Self {
        let parser = Self::parser_from(options);
        let mode = Mode::coerce(options.mode.as_deref());
        let direction = Direction::coerce(options.direction.as_deref());
        let months = options.months.map_or(MonthCount::ONE, MonthCount::coerce);
        let week_start = Self::week_start_from(options.week_start);

        let today = options
            .today
            .as_ref()
            .and_then(|raw| parser.parse(raw))
            .unwrap_or(live_today);

        let (implied_start, implied_end) = direction.implied_bounds(today);
        let start_date = options
            .start_date
            .as_ref()
            .and_then(|raw| parser.parse(raw))
            .or(implied_start);
        let end_date = options
            .end_date
            .as_ref()
            .and_then(|raw| parser.parse(raw))
            .or(implied_end);

        let blackout = match (&options.blackout, &options.blackout_dates) {
            (Some(predicate), _) => Blackout::Predicate(Arc::clone(predicate)),
            (None, Some(dates)) => Blackout::Days(dates.iter().filter_map(|raw| parser.parse(raw)).collect()),
            (None, None) => Blackout::Never,
        };

        debug!(
            "normalized picker config: mode={mode} direction={direction} months={} today={today}",
            months.get()
        );
        debug!("navigation bounds {start_date:?}..={end_date:?}");

        Self {
            parser,
            mode,
            direction,
            months,
            week_start,
            today,
            start_date,
            end_date,
            blackout,
        }
    }

    fn parser_from(options: &PickerOptions) -> DayParser {
        if let Some(parse) = &options.parse {
            DayParser::Custom(Arc::clone(parse))
        } else if let Some(pattern) = &options.format {
            DayParser::Format(pattern.clone())
        } else {
            DayParser::Iso
        }
    }

    fn week_start_from(raw: Option<i64>) -> WeekStart {
        let Some(raw) = raw else {
            return WeekStart::default();
        };
        u8::try_from(raw)
            .ok()
            .and_then(|value| WeekStart::new(value).ok())
            .unwrap_or_else(|| {
                warn!("{}, falling back to {}", ConfigError::InvalidWeekStart(raw), WeekStart::default());
                WeekStart::default()
            })
    }

    pub fn parse(&self, input: &DateInput) -> Option<CalendarDay> {
        self.parser.parse(input)
    }

    pub fn format(&self, day: CalendarDay) -> String {
        self.parser.format(day)
    }

    pub fn is_blacked_out(&self, day: CalendarDay) -> bool {
        self.blackout.is_blacked_out(day)
    }

    /// Outside the inclusive `[start_date, end_date]` navigation bounds
    pub fn is_out_of_bounds(&self, day: CalendarDay) -> bool {
        self.start_date.is_some_and(|start| day < start) || self.end_date.is_some_and(|end| day > end)
    }

    /// Days a click must not select
    pub fn is_disabled(&self, day: CalendarDay) -> bool {
        self.is_out_of_bounds(day) || self.is_blacked_out(day)
    }
}
