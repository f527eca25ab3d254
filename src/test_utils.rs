//! Shared helpers for unit tests.

use crate::{CalendarDay, PickerConfig, PickerOptions, YearMonth};

/// Fixed stand-in for the clock: Wednesday 2024-03-13
pub fn today() -> CalendarDay {
    day(2024, 3, 13)
}

pub fn day(year: i32, month: u32, day: u32) -> CalendarDay {
    CalendarDay::new(year, month, day).unwrap()
}

pub fn ym(year: i32, month: u8) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

pub fn options_with(mode: &str) -> PickerOptions {
    PickerOptions {
        mode: Some(mode.to_owned()),
        ..PickerOptions::default()
    }
}

/// Config for `mode` with every other option unset, normalized at [`today`]
pub fn config_for(mode: &str) -> PickerConfig {
    PickerConfig::normalize_at(&options_with(mode), today())
}
