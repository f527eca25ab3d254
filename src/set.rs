use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::CalendarDay;

/// A deduplicated collection of calendar days.
///
/// Days are keyed by their day number, so membership checks are O(1) on
/// average and two separately constructed values for the same day collide.
/// Iteration order is unspecified; use [`DayKeySet::sorted`] when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CalendarDay>", into = "Vec<CalendarDay>")]
pub struct DayKeySet {
    days: HashMap<i32, CalendarDay>,
}

impl DayKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable key for a day: days since 0001-01-01 (proleptic Gregorian), 1-based
    #[inline]
    pub fn key(day: CalendarDay) -> i32 {
        day.as_naive().num_days_from_ce()
    }

    pub fn has(&self, day: CalendarDay) -> bool {
        self.days.contains_key(&Self::key(day))
    }

    pub fn add(&mut self, day: CalendarDay) -> &mut Self {
        self.days.insert(Self::key(day), day);
        self
    }

    pub fn delete(&mut self, day: CalendarDay) -> &mut Self {
        self.days.remove(&Self::key(day));
        self
    }

    /// Days in unspecified order
    pub fn values(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.days.values().copied()
    }

    /// Days in ascending order
    pub fn sorted(&self) -> Vec<CalendarDay> {
        let mut days: Vec<CalendarDay> = self.values().collect();
        days.sort_unstable();
        days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }
}

impl FromIterator<CalendarDay> for DayKeySet {
    fn from_iter<I: IntoIterator<Item = CalendarDay>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<CalendarDay> for DayKeySet {
    fn extend<I: IntoIterator<Item = CalendarDay>>(&mut self, iter: I) {
        for day in iter {
            self.add(day);
        }
    }
}

impl From<Vec<CalendarDay>> for DayKeySet {
    fn from(days: Vec<CalendarDay>) -> Self {
        days.into_iter().collect()
    }
}

impl From<DayKeySet> for Vec<CalendarDay> {
    fn from(set: DayKeySet) -> Self {
        set.sorted()
    }
}
