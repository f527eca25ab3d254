use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{CalendarDay, DateInput, DayKeySet, DayRange, Mode, PickerConfig, WeekStart};

/// How a single day relates to the current selection, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Containment {
    Outside,
    /// Selected on its own: a single selection or an isolated multi-selected day
    Selected,
    /// First day of a span or of a run of adjacent days
    Start,
    /// Last day of a span or of a run of adjacent days
    End,
    /// Strictly inside a span or a run
    Middle,
    /// First click of a range gesture awaiting its second click
    InProgress,
}

impl Containment {
    /// Anything the renderer should highlight
    pub const fn is_highlighted(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// The new selection value produced by a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub value: Vec<CalendarDay>,
}

/// Mode-aware selection state.
///
/// The value is always sorted ascending and free of duplicates:
///
/// | Mode       | Length  | Shape                                  |
/// |------------|---------|----------------------------------------|
/// | `Single`   | 0 or 1  | the earliest day supplied              |
/// | `Range`    | 0 or 2  | `[start, end]`                         |
/// | `Week`     | 0 or 2  | first and last day of the anchor week  |
/// | `Multiple` | 0..N    | every distinct day                     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionManager {
    mode:        Mode,
    week_start:  WeekStart,
    value:       Vec<CalendarDay>,
    set:         DayKeySet,
    range_start: Option<CalendarDay>,
}

impl SelectionManager {
    /// A manager with nothing selected
    pub fn empty(mode: Mode, week_start: WeekStart) -> Self {
        Self {
            mode,
            week_start,
            value: Vec::new(),
            set: DayKeySet::new(),
            range_start: None,
        }
    }

    /// Rebuilds the selection from the host's raw value.
    ///
    /// Blank and unparseable entries are dropped silently. Any pending range
    /// gesture is discarded.
    pub fn derive(raw: &[DateInput], config: &PickerConfig) -> Self {
        let days: Vec<CalendarDay> = raw
            .iter()
            .filter(|input| !input.is_blank())
            .filter_map(|input| config.parse(input))
            .collect();
        let dropped = raw.len() - days.len();

        let mut manager = Self::empty(config.mode, config.week_start);
        manager.value = canonicalize(config.mode, config.week_start, days);
        manager.set = manager.value.iter().copied().collect();

        debug!(
            "derived {} selection {:?} ({dropped} raw entries dropped)",
            manager.mode, manager.value
        );
        manager
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// The canonical selected days, ascending
    pub fn value(&self) -> &[CalendarDay] {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn first(&self) -> Option<CalendarDay> {
        self.value.first().copied()
    }

    pub fn last(&self) -> Option<CalendarDay> {
        self.value.last().copied()
    }

    /// First click of an unfinished range gesture
    pub const fn range_start(&self) -> Option<CalendarDay> {
        self.range_start
    }

    /// Whether `day` is one of the selected values
    pub fn has(&self, day: CalendarDay) -> bool {
        if self.mode == Mode::Multiple {
            self.set.has(day)
        } else {
            self.value.contains(&day)
        }
    }

    /// The selected span for `Range` and `Week` selections
    pub fn as_range(&self) -> Option<DayRange> {
        match (self.mode, self.value.as_slice()) {
            (Mode::Range | Mode::Week, [start, end]) => Some(DayRange::spanning(*start, *end)),
            _ => None,
        }
    }

    /// Classifies `day` for rendering. Never changes the selection.
    pub fn contains(&self, day: CalendarDay) -> Containment {
        if self.mode == Mode::Range && self.range_start == Some(day) {
            return Containment::InProgress;
        }

        if self.mode == Mode::Multiple {
            if !self.set.has(day) {
                return Containment::Outside;
            }
            return match (self.set.has(day.pred()), self.set.has(day.succ())) {
                (false, false) => Containment::Selected,
                (false, true) => Containment::Start,
                (true, false) => Containment::End,
                (true, true) => Containment::Middle,
            };
        }

        match self.value.as_slice() {
            [only] if *only == day => Containment::Selected,
            [start, _] if *start == day => Containment::Start,
            [_, end] if *end == day => Containment::End,
            [start, end] if DayRange::spanning(*start, *end).strictly_contains(day) => Containment::Middle,
            _ => Containment::Outside,
        }
    }

    /// Selects `days`, reshaped to the current mode.
    ///
    /// In `Multiple` mode the batch toggles: when every day in it is already
    /// selected the whole batch is removed, otherwise each day flips
    /// individually (so a batch with nothing selected is added in full).
    /// An empty batch clears the selection.
    pub fn select<I>(&mut self, days: I) -> Option<SelectionChange>
    where
        I: IntoIterator<Item = CalendarDay>,
    {
        let days: Vec<CalendarDay> = days.into_iter().collect();
        if days.is_empty() {
            return self.deselect(None);
        }
        self.range_start = None;

        let next = if self.mode == Mode::Multiple {
            self.toggled(&days)
        } else {
            canonicalize(self.mode, self.week_start, days)
        };
        self.apply(next)
    }

    fn toggled(&self, days: &[CalendarDay]) -> Vec<CalendarDay> {
        let batch: DayKeySet = days.iter().copied().collect();
        let mut next = self.set.clone();

        if batch.values().all(|day| self.set.has(day)) {
            for day in batch.values() {
                next.delete(day);
            }
        } else {
            for day in batch.values() {
                if self.set.has(day) {
                    next.delete(day);
                } else {
                    next.add(day);
                }
            }
        }
        next.sorted()
    }

    /// Removes `day` in `Multiple` mode; clears everything otherwise, or when
    /// no day is given.
    pub fn deselect(&mut self, day: Option<CalendarDay>) -> Option<SelectionChange> {
        self.range_start = None;
        match (self.mode, day) {
            (Mode::Multiple, Some(day)) => {
                if !self.set.has(day) {
                    trace!("deselect of unselected {day} ignored");
                    return None;
                }
                let next = self.value.iter().copied().filter(|selected| *selected != day).collect();
                self.apply(next)
            },
            _ => self.apply(Vec::new()),
        }
    }

    /// Handles a click on a day cell.
    ///
    /// Outside `Range` mode this is `select(day)`. In `Range` mode the first
    /// click only records a pending start; the second selects the span between
    /// the two clicks in chronological order.
    pub fn day_clicked(&mut self, day: CalendarDay) -> Option<SelectionChange> {
        if self.mode != Mode::Range {
            return self.select([day]);
        }

        match self.range_start.take() {
            None => {
                trace!("range gesture started at {day}");
                self.range_start = Some(day);
                None
            },
            Some(start) => {
                let span = DayRange::spanning(start, day);
                trace!("range gesture resolved to {span}");
                self.select([span.start(), span.end()])
            },
        }
    }

    fn apply(&mut self, next: Vec<CalendarDay>) -> Option<SelectionChange> {
        if next == self.value {
            trace!("selection unchanged");
            return None;
        }
        self.set = next.iter().copied().collect();
        self.value = next;
        debug!("selection changed to {:?}", self.value);
        Some(SelectionChange {
            value: self.value.clone(),
        })
    }
}

/// Sorts, deduplicates and reshapes `days` for `mode`
fn canonicalize(mode: Mode, week_start: WeekStart, mut days: Vec<CalendarDay>) -> Vec<CalendarDay> {
    days.sort_unstable();
    days.dedup();

    match mode {
        Mode::Single => {
            days.truncate(1);
            days
        },
        Mode::Range => match (days.first(), days.last()) {
            (Some(&start), Some(&end)) => vec![start, end],
            _ => Vec::new(),
        },
        Mode::Week => days.first().map_or_else(Vec::new, |&anchor| {
            vec![anchor.start_of_week(week_start), anchor.end_of_week(week_start)]
        }),
        Mode::Multiple => days,
    }
}
