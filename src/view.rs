use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    CalendarDay, DateInput, DayRange, Direction, MonthCount, PickerConfig, RECENTER_MONTH_THRESHOLD,
    SelectionManager, YearMonth,
};

/// The visible window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewWindow {
    /// First day of the first visible month
    pub view_start_date: CalendarDay,
    /// Last day of the last visible month
    pub view_end_date:   CalendarDay,
    /// The window cannot move one month earlier
    pub capped_start:    bool,
    /// The window cannot move one month later
    pub capped_end:      bool,
}

impl ViewWindow {
    pub fn contains(&self, day: CalendarDay) -> bool {
        self.span().contains(day)
    }

    pub fn span(&self) -> DayRange {
        DayRange::spanning(self.view_start_date, self.view_end_date)
    }

    pub fn start_month(&self) -> YearMonth {
        self.view_start_date.year_month()
    }

    pub fn end_month(&self) -> YearMonth {
        self.view_end_date.year_month()
    }
}

/// The window produced by a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewChange {
    pub view_start_date: CalendarDay,
    pub view_end_date:   CalendarDay,
}

/// The block of consecutive months on screen.
///
/// Reads the selection to pick an initial window but never changes it.
/// Navigation past the configured bounds is clamped and reported through the
/// window's capped flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewManager {
    months:      MonthCount,
    start_bound: Option<CalendarDay>,
    end_bound:   Option<CalendarDay>,
    window:      ViewWindow,
}

impl ViewManager {
    /// Establishes the initial window.
    ///
    /// The window starts at `view_start` when it parses, else at the first
    /// selected day, else at today. When more than two months are shown and
    /// that day is in today's month, the window is shifted back so today sits
    /// in the middle (`Any`) or in the last month (`Past` / `TodayPast`).
    pub fn derive(config: &PickerConfig, selection: &SelectionManager, view_start: Option<&DateInput>) -> Self {
        let anchor = view_start
            .and_then(|raw| config.parse(raw))
            .or_else(|| selection.first())
            .unwrap_or(config.today);

        let mut start = anchor.year_month();
        if config.months.get() > RECENTER_MONTH_THRESHOLD && anchor.same_month(config.today) {
            let shift = match config.direction {
                Direction::Any => i32::from(config.months.get() / 2),
                Direction::Past | Direction::TodayPast => config.months.span(),
                Direction::TodayFuture | Direction::Future => 0,
            };
            start = start.add(-shift);
        }

        let manager = Self {
            months:      config.months,
            start_bound: config.start_date,
            end_bound:   config.end_date,
            window:      window_at(start, config.months, config.start_date, config.end_date),
        };

        debug!(
            "derived view {}..={} from anchor {anchor}",
            manager.window.view_start_date, manager.window.view_end_date
        );
        manager
    }

    pub const fn window(&self) -> &ViewWindow {
        &self.window
    }

    pub const fn months(&self) -> MonthCount {
        self.months
    }

    pub const fn start_bound(&self) -> Option<CalendarDay> {
        self.start_bound
    }

    pub const fn end_bound(&self) -> Option<CalendarDay> {
        self.end_bound
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.window.contains(day)
    }

    /// Visible months, earliest first
    pub fn visible_months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        let first = self.window.start_month();
        (0..i32::from(self.months.get())).map(move |offset| first.add(offset))
    }

    fn window_for(&self, start: YearMonth) -> ViewWindow {
        window_at(start, self.months, self.start_bound, self.end_bound)
    }

    /// Latest legal start is `months - 1` before the end bound, earliest is the
    /// start bound. The start bound wins when the two conflict.
    fn clamp(&self, requested: YearMonth) -> YearMonth {
        let mut start = requested;
        if let Some(end) = self.end_bound {
            start = start.min(end.year_month().add(-self.months.span()));
        }
        if let Some(bound) = self.start_bound {
            start = start.max(bound.year_month());
        }
        start
    }

    /// Moves the window to start at the month containing `month`, clamped to
    /// the bounds.
    pub fn set_start_date(&mut self, month: CalendarDay) -> Option<ViewChange> {
        let requested = month.year_month();
        let start = self.clamp(requested);
        if start != requested {
            trace!("view start {requested} clamped to {start}");
        }

        let next = self.window_for(start);
        let moved =
            next.view_start_date != self.window.view_start_date || next.view_end_date != self.window.view_end_date;
        self.window = next;
        if !moved {
            trace!("view unchanged at {}", next.view_start_date);
            return None;
        }

        debug!("view moved to {}..={}", next.view_start_date, next.view_end_date);
        Some(ViewChange {
            view_start_date: next.view_start_date,
            view_end_date:   next.view_end_date,
        })
    }

    /// Takes new month count and bounds from `config`, keeping the current
    /// start month where the new bounds allow it
    pub fn reconfigure(&mut self, config: &PickerConfig) -> Option<ViewChange> {
        self.months = config.months;
        self.start_bound = config.start_date;
        self.end_bound = config.end_date;
        self.set_start_date(self.window.view_start_date)
    }

    /// Scrolls the minimum needed for `day` to become visible
    pub fn bring_date_into_view(&mut self, day: CalendarDay) -> Option<ViewChange> {
        if self.window.contains(day) {
            return None;
        }
        if day < self.window.view_start_date {
            self.set_start_date(day)
        } else {
            self.set_start_date(day.add_months(-self.months.span()))
        }
    }

    /// Brings the first selected day into view when nothing selected is
    /// visible. Meant for commit points (blur, enter), not every keystroke.
    pub fn update_for_selection_if_needed(&mut self, selection: &SelectionManager) -> Option<ViewChange> {
        let first = selection.first()?;
        let visible = match selection.as_range() {
            Some(span) => span.overlaps(&self.window.span()),
            None => selection.value().iter().any(|day| self.window.contains(*day)),
        };
        if visible {
            return None;
        }
        self.bring_date_into_view(first)
    }

    /// One month back
    pub fn previous(&mut self) -> Option<ViewChange> {
        self.set_start_date(self.window.view_start_date.add_months(-1))
    }

    /// One month forward
    pub fn next(&mut self) -> Option<ViewChange> {
        self.set_start_date(self.window.view_start_date.add_months(1))
    }
}

fn window_at(
    start: YearMonth,
    months: MonthCount,
    start_bound: Option<CalendarDay>,
    end_bound: Option<CalendarDay>,
) -> ViewWindow {
    let end = start.add(months.span());
    ViewWindow {
        view_start_date: start.first_day(),
        view_end_date:   end.last_day(),
        capped_start:    start_bound.is_some_and(|bound| bound.year_month() >= start),
        capped_end:      end_bound.is_some_and(|bound| bound.year_month() <= end),
    }
}
