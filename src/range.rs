use crate::{CalendarDay, prelude::*};

/// An inclusive span of calendar days.
/// The start day is always less than or equal to the end day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DayRange {
    start: CalendarDay,
    end:   CalendarDay,
}

impl DayRange {
    /// Creates a range from two days in either order
    pub fn spanning(a: CalendarDay, b: CalendarDay) -> Self {
        Self {
            start: a.min(b),
            end:   a.max(b),
        }
    }

    pub const fn start(&self) -> CalendarDay {
        self.start
    }

    pub const fn end(&self) -> CalendarDay {
        self.end
    }

    pub const fn days_pair(&self) -> (CalendarDay, CalendarDay) {
        (self.start, self.end)
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.start <= day && day <= self.end
    }

    /// Strictly inside the range, excluding both endpoints
    pub fn strictly_contains(&self, day: CalendarDay) -> bool {
        self.start < day && day < self.end
    }

    /// Checks if this range shares at least one day with another range
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}
