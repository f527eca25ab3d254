use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    CalendarDay, Containment, DateInput, PickerConfig, PickerOptions, SelectionChange, SelectionManager, ViewChange,
    ViewManager, ViewWindow, YearMonth,
};

/// Something the host should react to after an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PickerEvent {
    /// The selected value changed
    Change { value: Vec<CalendarDay> },
    /// The visible window moved
    #[serde(rename_all = "camelCase")]
    ViewChange {
        view_start_date: CalendarDay,
        view_end_date:   CalendarDay,
    },
}

impl From<SelectionChange> for PickerEvent {
    fn from(change: SelectionChange) -> Self {
        Self::Change { value: change.value }
    }
}

impl From<ViewChange> for PickerEvent {
    fn from(change: ViewChange) -> Self {
        Self::ViewChange {
            view_start_date: change.view_start_date,
            view_end_date:   change.view_end_date,
        }
    }
}

/// Selection and view state for one date picker instance.
///
/// Every mutating operation returns the events it caused, in the order they
/// happened. An empty list means nothing observable changed.
#[derive(Debug, Clone)]
pub struct Picker {
    config:    PickerConfig,
    selection: SelectionManager,
    view:      ViewManager,
}

impl Picker {
    pub fn new(options: &PickerOptions, value: &[DateInput]) -> Self {
        Self::new_at(options, value, CalendarDay::today())
    }

    /// Like [`Picker::new`] with `today` standing in for the clock
    pub fn new_at(options: &PickerOptions, value: &[DateInput], today: CalendarDay) -> Self {
        let config = PickerConfig::normalize_at(options, today);
        let selection = SelectionManager::derive(value, &config);
        let view = ViewManager::derive(&config, &selection, None);
        Self { config, selection, view }
    }

    /// Re-derives the initial window from an explicit start month
    #[must_use]
    pub fn with_view_start(mut self, view_start: &DateInput) -> Self {
        self.view = ViewManager::derive(&self.config, &self.selection, Some(view_start));
        self
    }

    /// Applies new upstream options and value.
    ///
    /// The selection is rebuilt from `value` and reports no change, since the
    /// host supplied it. A new direction, today or month count derives the
    /// window afresh. Otherwise the window keeps its start month unless the
    /// new bounds force it to move.
    pub fn rederive(&mut self, options: &PickerOptions, value: &[DateInput]) -> Vec<PickerEvent> {
        self.rederive_at(options, value, CalendarDay::today())
    }

    pub fn rederive_at(
        &mut self,
        options: &PickerOptions,
        value: &[DateInput],
        today: CalendarDay,
    ) -> Vec<PickerEvent> {
        let config = PickerConfig::normalize_at(options, today);
        let view_inputs_changed = config.direction != self.config.direction
            || config.today != self.config.today
            || config.months != self.config.months;

        self.config = config;
        self.selection = SelectionManager::derive(value, &self.config);
        debug!("picker re-derived with {} selected", self.selection.len());

        let change = if view_inputs_changed {
            let previous = *self.view.window();
            self.view = ViewManager::derive(&self.config, &self.selection, None);
            let window = self.view.window();
            let moved =
                window.view_start_date != previous.view_start_date || window.view_end_date != previous.view_end_date;
            moved.then_some(ViewChange {
                view_start_date: window.view_start_date,
                view_end_date:   window.view_end_date,
            })
        } else {
            self.view.reconfigure(&self.config)
        };
        change.map(PickerEvent::from).into_iter().collect()
    }

    /// A click on a day cell. Disabled days are ignored.
    pub fn day_clicked(&mut self, day: CalendarDay) -> Vec<PickerEvent> {
        if self.config.is_disabled(day) {
            trace!("click on disabled {day} ignored");
            return Vec::new();
        }

        let mut events = Vec::new();
        events.extend(self.selection.day_clicked(day).map(PickerEvent::from));
        events.extend(self.view.bring_date_into_view(day).map(PickerEvent::from));
        events
    }

    pub fn select<I>(&mut self, days: I) -> Vec<PickerEvent>
    where
        I: IntoIterator<Item = CalendarDay>,
    {
        self.selection.select(days).map(PickerEvent::from).into_iter().collect()
    }

    pub fn deselect(&mut self, day: Option<CalendarDay>) -> Vec<PickerEvent> {
        self.selection.deselect(day).map(PickerEvent::from).into_iter().collect()
    }

    pub fn set_view_start(&mut self, month: CalendarDay) -> Vec<PickerEvent> {
        self.view.set_start_date(month).map(PickerEvent::from).into_iter().collect()
    }

    /// Moves back by a whole window
    pub fn previous_page(&mut self) -> Vec<PickerEvent> {
        let months = i32::from(self.view.months().get());
        let target = self.view.window().view_start_date.add_months(-months);
        self.set_view_start(target)
    }

    /// Moves forward by a whole window
    pub fn next_page(&mut self) -> Vec<PickerEvent> {
        let months = i32::from(self.view.months().get());
        let target = self.view.window().view_start_date.add_months(months);
        self.set_view_start(target)
    }

    pub fn bring_date_into_view(&mut self, day: CalendarDay) -> Vec<PickerEvent> {
        self.view.bring_date_into_view(day).map(PickerEvent::from).into_iter().collect()
    }

    /// Resyncs the window with the selection. Call on blur or enter.
    pub fn commit(&mut self) -> Vec<PickerEvent> {
        self.view
            .update_for_selection_if_needed(&self.selection)
            .map(PickerEvent::from)
            .into_iter()
            .collect()
    }

    pub fn contains(&self, day: CalendarDay) -> Containment {
        self.selection.contains(day)
    }

    pub fn is_disabled(&self, day: CalendarDay) -> bool {
        self.config.is_disabled(day)
    }

    pub fn window(&self) -> &ViewWindow {
        self.view.window()
    }

    pub fn visible_months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.view.visible_months()
    }

    pub const fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub const fn view(&self) -> &ViewManager {
        &self.view
    }

    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Interprets host input with the configured parser
    pub fn parse(&self, input: &DateInput) -> Option<CalendarDay> {
        self.config.parse(input)
    }

    pub fn format(&self, day: CalendarDay) -> String {
        self.config.format(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{day, options_with, today, ym};

    fn picker(options: &PickerOptions, value: &[&str]) -> Picker {
        let value: Vec<DateInput> = value.iter().map(|raw| DateInput::from(*raw)).collect();
        Picker::new_at(options, &value, today())
    }

    fn change(days: &[CalendarDay]) -> PickerEvent {
        PickerEvent::Change { value: days.to_vec() }
    }

    fn moved(start: CalendarDay, end: CalendarDay) -> PickerEvent {
        PickerEvent::ViewChange {
            view_start_date: start,
            view_end_date:   end,
        }
    }

    #[test]
    fn test_range_gesture() {
        let mut picker = picker(&options_with("range"), &[]);

        assert!(picker.day_clicked(day(2024, 3, 20)).is_empty());
        assert_eq!(picker.contains(day(2024, 3, 20)), Containment::InProgress);

        let events = picker.day_clicked(day(2024, 3, 4));
        assert_eq!(events, vec![change(&[day(2024, 3, 4), day(2024, 3, 20)])]);
        assert_eq!(picker.contains(day(2024, 3, 10)), Containment::Middle);
        assert_eq!(picker.contains(day(2024, 3, 20)), Containment::End);
    }

    #[test]
    fn test_click_outside_window_scrolls() {
        let mut picker = picker(&options_with("single"), &[]);
        let events = picker.day_clicked(day(2024, 4, 2));
        assert_eq!(
            events,
            vec![
                change(&[day(2024, 4, 2)]),
                moved(day(2024, 4, 1), day(2024, 4, 30)),
            ]
        );
    }

    #[test]
    fn test_disabled_clicks_are_ignored() {
        let options = PickerOptions {
            mode: Some("multiple".into()),
            direction: Some("today-future".into()),
            blackout_dates: Some(vec!["2024-03-20".into()]),
            ..PickerOptions::default()
        };
        let mut picker = picker(&options, &[]);

        assert!(picker.is_disabled(day(2024, 3, 12)));
        assert!(picker.day_clicked(day(2024, 3, 12)).is_empty());
        assert!(picker.is_disabled(day(2024, 3, 20)));
        assert!(picker.day_clicked(day(2024, 3, 20)).is_empty());
        assert!(picker.selection().is_empty());

        assert_eq!(picker.day_clicked(day(2024, 3, 13)), vec![change(&[day(2024, 3, 13)])]);
    }

    #[test]
    fn test_blackout_predicate() {
        let options = options_with("single").with_blackout(|day| day.weekday_from_sunday() == 0);
        let mut picker = picker(&options, &[]);
        // 2024-03-17 is a Sunday
        assert!(picker.day_clicked(day(2024, 3, 17)).is_empty());
        assert_eq!(picker.day_clicked(day(2024, 3, 18)).len(), 1);
    }

    #[test]
    fn test_select_and_deselect() {
        let mut picker = picker(&options_with("multiple"), &["2024-03-01"]);

        let events = picker.select([day(2024, 3, 2), day(2024, 3, 3)]);
        assert_eq!(events, vec![change(&[day(2024, 3, 1), day(2024, 3, 2), day(2024, 3, 3)])]);
        assert_eq!(picker.contains(day(2024, 3, 2)), Containment::Middle);

        assert_eq!(picker.deselect(Some(day(2024, 3, 2))), vec![change(&[day(2024, 3, 1), day(2024, 3, 3)])]);
        assert!(picker.deselect(Some(day(2024, 3, 2))).is_empty());
        assert_eq!(picker.deselect(None), vec![change(&[])]);
    }

    #[test]
    fn test_pages_step_whole_window() {
        let options = PickerOptions {
            months: Some(2.0),
            ..PickerOptions::default()
        };
        let mut picker = picker(&options, &[]);
        assert_eq!(picker.visible_months().collect::<Vec<_>>(), vec![ym(2024, 3), ym(2024, 4)]);

        assert_eq!(picker.next_page(), vec![moved(day(2024, 5, 1), day(2024, 6, 30))]);
        picker.previous_page();
        picker.previous_page();
        assert_eq!(picker.window().view_start_date, day(2024, 1, 1));
    }

    #[test]
    fn test_pages_stop_at_bounds() {
        let options = PickerOptions {
            months: Some(3.0),
            direction: Some("past".into()),
            ..PickerOptions::default()
        };
        let mut picker = picker(&options, &[]);
        assert_eq!(picker.window().start_month(), ym(2024, 1));
        assert!(picker.window().capped_end);
        assert!(picker.next_page().is_empty());
        assert_eq!(picker.window().end_month(), ym(2024, 3));
    }

    #[test]
    fn test_commit_resyncs_view() {
        let mut picker = picker(&options_with("single"), &[]);
        picker.select([day(2025, 1, 9)]);
        assert!(!picker.view().contains(day(2025, 1, 9)));

        assert_eq!(picker.commit(), vec![moved(day(2025, 1, 1), day(2025, 1, 31))]);
        assert!(picker.commit().is_empty());
    }

    #[test]
    fn test_with_view_start() {
        let picker = picker(&options_with("single"), &["2024-03-02"]).with_view_start(&"2023-06-30".into());
        assert_eq!(picker.window().view_start_date, day(2023, 6, 1));
    }

    #[test]
    fn test_rederive_rebuilds_selection_and_clamps_view() {
        let mut picker = picker(&options_with("range"), &[]);
        picker.day_clicked(day(2024, 3, 5));
        picker.set_view_start(day(2024, 6, 1));

        let narrowed = PickerOptions {
            mode: Some("range".into()),
            end_date: Some("2024-04-30".into()),
            ..PickerOptions::default()
        };
        let value = [DateInput::from("2024-03-01"), DateInput::from("2024-03-09")];
        let events = picker.rederive_at(&narrowed, &value, today());

        assert_eq!(events, vec![moved(day(2024, 4, 1), day(2024, 4, 30))]);
        assert_eq!(picker.selection().value(), &[day(2024, 3, 1), day(2024, 3, 9)]);
        assert_eq!(picker.selection().range_start(), None);
        assert!(picker.window().capped_end);
    }

    #[test]
    fn test_rederive_with_new_direction_derives_window_afresh() {
        let any = PickerOptions {
            months: Some(3.0),
            ..PickerOptions::default()
        };
        let mut picker = picker(&any, &[]);
        picker.set_view_start(day(2023, 6, 1));

        let past = PickerOptions {
            months: Some(3.0),
            direction: Some("past".into()),
            ..PickerOptions::default()
        };
        let events = picker.rederive_at(&past, &[], today());
        let fresh = Picker::new_at(&past, &[], today());

        assert_eq!(events, vec![moved(day(2024, 1, 1), day(2024, 3, 31))]);
        assert_eq!(picker.window(), fresh.window());
        assert_eq!(picker.window().end_month(), ym(2024, 3));
        assert!(picker.window().capped_end);
    }

    #[test]
    fn test_rederive_with_new_today_derives_window_afresh() {
        let mut picker = picker(&options_with("single"), &[]);
        assert!(picker.rederive_at(&options_with("single"), &[], today()).is_empty());

        let events = picker.rederive_at(&options_with("single"), &[], day(2024, 5, 2));
        assert_eq!(events, vec![moved(day(2024, 5, 1), day(2024, 5, 31))]);
    }

    #[test]
    fn test_picker_from_json_options() {
        let options: PickerOptions =
            serde_json::from_str(r#"{"mode":"Week","weekStart":1,"months":3.7,"direction":"TODAY_FUTURE"}"#).unwrap();
        let mut picker = picker(&options, &[]);

        assert_eq!(picker.visible_months().count(), 3);
        assert_eq!(picker.window().view_start_date, day(2024, 3, 1));
        assert!(picker.window().capped_start);

        let events = picker.day_clicked(day(2024, 3, 13));
        assert_eq!(events, vec![change(&[day(2024, 3, 11), day(2024, 3, 17)])]);
    }

    #[test]
    fn test_parse_and_format_follow_options() {
        let options = PickerOptions {
            format: Some("%d.%m.%Y".into()),
            ..PickerOptions::default()
        };
        let picker = picker(&options, &["13.03.2024"]);
        assert_eq!(picker.selection().value(), &[day(2024, 3, 13)]);
        assert_eq!(picker.parse(&"01.02.2024".into()), Some(day(2024, 2, 1)));
        assert_eq!(picker.format(day(2024, 2, 1)), "01.02.2024");
    }

    #[test]
    fn test_event_serde() {
        let json = serde_json::to_string(&moved(day(2024, 4, 1), day(2024, 4, 30))).unwrap();
        assert_eq!(json, r#"{"type":"viewChange","viewStartDate":"2024-04-01","viewEndDate":"2024-04-30"}"#);
        let json = serde_json::to_string(&change(&[day(2024, 4, 1)])).unwrap();
        assert_eq!(json, r#"{"type":"change","value":["2024-04-01"]}"#);
    }
}
