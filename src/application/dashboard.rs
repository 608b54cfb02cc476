//! Dashboard session state.
//!
//! Everything the weekly calendar and the routine manager need between
//! commands lives here, owned by `AppState` behind its mutex: the selected
//! person, the navigation offset, the cached authoritative entry collection,
//! empty-group placeholders and the in-flight drag. The cache is a snapshot
//! of backend truth; every mutation round-trips through the backend and ends
//! in a re-fetch, so this state is never the source of record.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::application::modals::{ModalState, ToastQueue};
use crate::domain::calendar::{self, WeekWindow};
use crate::domain::grouping::{EmptyGroupTracker, GroupBucket, bucket_by_group};
use crate::domain::models::{Person, RoutineExerciseWithDetails, WorkoutEntryWithDetails};
use crate::domain::reorder::{
    DragSession, DropTarget, GroupPolicy, MoveRejection, MoveValidity, ReorderEngine, ReorderPlan,
};
use crate::infrastructure::config::Settings;

/// Calendar items group per day and per group number within the day.
pub type CalendarGroupKey = (String, i32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusyFlags {
    pub fetching: bool,
    pub saving_entry: bool,
    pub saving_session: bool,
    pub deleting_entry: bool,
    pub applying_routine: bool,
    pub reordering: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: String,
    pub is_today: bool,
    pub is_selected: bool,
    pub groups: Vec<GroupBucket<WorkoutEntryWithDetails>>,
}

/// Routine-manager working state; lives alongside the calendar because the
/// manager opens from the dashboard and shares its toasts and modals.
#[derive(Debug, Default)]
pub struct RoutineManagerState {
    pub routine_id: Option<i32>,
    pub exercises: Vec<RoutineExerciseWithDetails>,
    pub empty_groups: EmptyGroupTracker,
    pub drag: Option<DragSession<i32>>,
}

impl RoutineManagerState {
    pub fn open(&mut self, routine_id: i32) {
        self.routine_id = Some(routine_id);
        self.exercises.clear();
        self.empty_groups = EmptyGroupTracker::default();
        self.drag = None;
    }

    pub fn close(&mut self) {
        self.routine_id = None;
        self.exercises.clear();
        self.empty_groups = EmptyGroupTracker::default();
        self.drag = None;
    }

    pub fn set_exercises(&mut self, exercises: Vec<RoutineExerciseWithDetails>) {
        self.exercises = exercises;
        self.empty_groups.prune(&self.occupied_groups());
        self.drag = None;
    }

    pub fn occupied_groups(&self) -> Vec<i32> {
        let mut groups: Vec<i32> = self
            .exercises
            .iter()
            .map(|exercise| exercise.group_number)
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    pub fn grouped(&self) -> Vec<GroupBucket<RoutineExerciseWithDetails>> {
        bucket_by_group(
            &self.exercises,
            self.empty_groups.numbers(),
            |exercise| exercise.group_number,
            |exercise| exercise.order_index,
        )
    }

    fn engine() -> ReorderEngine {
        ReorderEngine::new(GroupPolicy::NumberedGroup)
    }

    pub fn begin_drag(&mut self, exercise_id: i32) -> bool {
        if self.drag.is_some() {
            return false;
        }
        match Self::engine().begin(&self.exercises, exercise_id) {
            Some(session) => {
                self.drag = Some(session);
                true
            }
            None => false,
        }
    }

    pub fn evaluate_drag(&self, target: &DropTarget<i32>) -> MoveValidity {
        let Some(drag) = &self.drag else {
            return MoveValidity::Invalid(MoveRejection::StaleTarget);
        };
        Self::engine().evaluate(
            &self.exercises,
            drag.active_id,
            target,
            self.empty_groups.numbers(),
        )
    }

    pub fn complete_drag(
        &self,
        target: Option<&DropTarget<i32>>,
    ) -> Result<ReorderPlan<i32>, MoveRejection> {
        let Some(drag) = &self.drag else {
            return Ok(ReorderPlan::empty());
        };
        Self::engine().complete(
            &self.exercises,
            drag.active_id,
            target,
            self.empty_groups.numbers(),
            None,
        )
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

#[derive(Debug)]
pub struct DashboardSession {
    pub settings: Settings,
    pub selected_person: Option<Person>,
    pub week_offset: i64,
    pub selected_date: Option<String>,
    pub entries: Vec<WorkoutEntryWithDetails>,
    empty_groups: HashMap<String, EmptyGroupTracker>,
    pub drag: Option<DragSession<CalendarGroupKey>>,
    pub routine_manager: RoutineManagerState,
    pub modal: ModalState,
    pub toasts: ToastQueue,
    pub busy: BusyFlags,
}

impl DashboardSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            selected_person: None,
            week_offset: 0,
            selected_date: None,
            entries: Vec::new(),
            empty_groups: HashMap::new(),
            drag: None,
            routine_manager: RoutineManagerState::default(),
            modal: ModalState::default(),
            toasts: ToastQueue::default(),
            busy: BusyFlags::default(),
        }
    }

    pub fn select_person(&mut self, person: Option<Person>) {
        self.selected_person = person;
        self.selected_date = None;
        self.entries.clear();
        self.empty_groups.clear();
        self.drag = None;
    }

    pub fn selected_person_id(&self) -> Option<i32> {
        self.selected_person.as_ref().and_then(|person| person.id)
    }

    pub fn window(&self, today: NaiveDate) -> WeekWindow {
        WeekWindow::compute(today, self.week_offset)
    }

    /// Inclusive `YYYY-MM-DD` range the backend must be asked for.
    pub fn fetch_range(&self, today: NaiveDate) -> (String, String) {
        let (start, end) = self.window(today).range();
        (calendar::format_db_date(start), calendar::format_db_date(end))
    }

    /// Replace the cache with the authoritative collection and drop
    /// placeholders that gained members meanwhile.
    pub fn set_entries(&mut self, entries: Vec<WorkoutEntryWithDetails>) {
        self.entries = entries;
        let occupied_by_date = self.occupied_by_date();
        self.empty_groups.retain(|date, tracker| {
            let occupied = occupied_by_date
                .get(date)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            tracker.prune(occupied);
            !tracker.numbers().is_empty()
        });
    }

    fn occupied_by_date(&self) -> HashMap<String, Vec<i32>> {
        let mut occupied: HashMap<String, Vec<i32>> = HashMap::new();
        for entry in &self.entries {
            let groups = occupied.entry(entry.date.clone()).or_default();
            if !groups.contains(&entry.group_number) {
                groups.push(entry.group_number);
            }
        }
        occupied
    }

    pub fn entries_for_date(&self, date: &str) -> Vec<WorkoutEntryWithDetails> {
        let mut entries: Vec<WorkoutEntryWithDetails> = self
            .entries
            .iter()
            .filter(|entry| entry.date == date)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.group_number, entry.order_index));
        entries
    }

    pub fn occupied_groups(&self, date: &str) -> Vec<i32> {
        let mut groups: Vec<i32> = self
            .entries
            .iter()
            .filter(|entry| entry.date == date)
            .map(|entry| entry.group_number)
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    pub fn create_empty_group(&mut self, date: &str) -> i32 {
        let occupied = self.occupied_groups(date);
        self.empty_groups
            .entry(date.to_string())
            .or_default()
            .create_group(&occupied)
    }

    pub fn remove_empty_group(&mut self, date: &str, group_number: i32) {
        if let Some(tracker) = self.empty_groups.get_mut(date) {
            tracker.remove_group(group_number);
            if tracker.numbers().is_empty() {
                self.empty_groups.remove(date);
            }
        }
    }

    fn placeholder_keys(&self) -> Vec<CalendarGroupKey> {
        self.empty_groups
            .iter()
            .flat_map(|(date, tracker)| {
                tracker
                    .numbers()
                    .iter()
                    .map(|group_number| (date.clone(), *group_number))
            })
            .collect()
    }

    fn placeholders_for_date(&self, date: &str) -> Vec<i32> {
        self.empty_groups
            .get(date)
            .map(|tracker| tracker.numbers().to_vec())
            .unwrap_or_default()
    }

    /// The grid the shell renders: weeks newest-first, one cell per visible
    /// day, each cell grouped and ordered.
    pub fn day_cells(&self, today: NaiveDate) -> Vec<Vec<DayCell>> {
        let window = self.window(today);
        window
            .weeks
            .iter()
            .map(|week| {
                week.iter()
                    .filter(|date| self.settings.show_weekends || !calendar::is_weekend(**date))
                    .map(|date| {
                        let date_string = calendar::format_db_date(*date);
                        let day_entries = self.entries_for_date(&date_string);
                        let placeholders = self.placeholders_for_date(&date_string);
                        DayCell {
                            is_today: *date == today,
                            is_selected: self.selected_date.as_deref() == Some(&date_string),
                            groups: bucket_by_group(
                                &day_entries,
                                &placeholders,
                                |entry| entry.group_number,
                                |entry| entry.order_index,
                            ),
                            date: date_string,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn engine() -> ReorderEngine {
        ReorderEngine::new(GroupPolicy::CalendarDay)
    }

    /// A new drag cannot start while another is in flight.
    pub fn begin_drag(&mut self, entry_id: i32) -> bool {
        if self.drag.is_some() {
            return false;
        }
        match Self::engine().begin(&self.entries, entry_id) {
            Some(session) => {
                self.drag = Some(session);
                true
            }
            None => false,
        }
    }

    pub fn evaluate_drag(&self, target: &DropTarget<CalendarGroupKey>) -> MoveValidity {
        let Some(drag) = &self.drag else {
            return MoveValidity::Invalid(MoveRejection::StaleTarget);
        };
        Self::engine().evaluate(&self.entries, drag.active_id, target, &self.placeholder_keys())
    }

    pub fn complete_drag(
        &self,
        target: Option<&DropTarget<CalendarGroupKey>>,
    ) -> Result<ReorderPlan<CalendarGroupKey>, MoveRejection> {
        let Some(drag) = &self.drag else {
            return Ok(ReorderPlan::empty());
        };
        Self::engine().complete(
            &self.entries,
            drag.active_id,
            target,
            &self.placeholder_keys(),
            None,
        )
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::test_support::{entry_with_details, sample_person};

    fn session_with_entries(entries: Vec<WorkoutEntryWithDetails>) -> DashboardSession {
        let mut session = DashboardSession::new(Settings::default());
        session.select_person(Some(sample_person()));
        session.set_entries(entries);
        session
    }

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-03-04", "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn selecting_a_person_clears_calendar_state() {
        let mut session = session_with_entries(vec![entry_with_details(1, "2026-03-02", 1, 0)]);
        session.selected_date = Some("2026-03-02".to_string());
        session.create_empty_group("2026-03-02");
        assert!(session.begin_drag(1));

        session.select_person(None);
        assert!(session.entries.is_empty());
        assert!(session.selected_date.is_none());
        assert!(session.drag.is_none());
        assert!(session.placeholder_keys().is_empty());
    }

    #[test]
    fn fetch_range_covers_the_three_week_window() {
        let session = DashboardSession::new(Settings::default());
        let (start, end) = session.fetch_range(today());
        assert_eq!(start, "2026-02-15");
        assert_eq!(end, "2026-03-07");
    }

    #[test]
    fn day_cells_group_entries_and_hide_weekends_when_configured() {
        let mut session = session_with_entries(vec![
            entry_with_details(1, "2026-03-02", 1, 1),
            entry_with_details(2, "2026-03-02", 1, 0),
            entry_with_details(3, "2026-03-02", 2, 0),
        ]);

        let weeks = session.day_cells(today());
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].len(), 7);

        let monday = &weeks[0][1];
        assert_eq!(monday.date, "2026-03-02");
        assert_eq!(monday.groups.len(), 2);
        let ids: Vec<i32> = monday.groups[0].items.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![2, 1]);

        session.settings.show_weekends = false;
        let weeks = session.day_cells(today());
        assert_eq!(weeks[0].len(), 5);
        assert!(weeks[0].iter().all(|cell| cell.date != "2026-03-01"));
    }

    #[test]
    fn empty_groups_render_until_occupied() {
        let mut session = session_with_entries(vec![entry_with_details(1, "2026-03-02", 1, 0)]);
        let created = session.create_empty_group("2026-03-02");
        assert_eq!(created, 2);

        let weeks = session.day_cells(today());
        let monday = &weeks[0][1];
        assert_eq!(monday.groups.len(), 2);
        assert!(monday.groups[1].items.is_empty());

        // The re-fetch after a drop into the placeholder prunes the tracker.
        session.set_entries(vec![
            entry_with_details(1, "2026-03-02", 1, 0),
            entry_with_details(2, "2026-03-02", 2, 0),
        ]);
        assert!(session.placeholder_keys().is_empty());
        let weeks = session.day_cells(today());
        assert_eq!(weeks[0][1].groups.len(), 2);
    }

    #[test]
    fn only_one_drag_can_be_in_flight() {
        let mut session = session_with_entries(vec![
            entry_with_details(1, "2026-03-02", 1, 0),
            entry_with_details(2, "2026-03-02", 1, 1),
        ]);
        assert!(session.begin_drag(1));
        assert!(!session.begin_drag(2));
        session.end_drag();
        assert!(session.begin_drag(2));
    }

    #[test]
    fn calendar_drag_across_days_is_valid() {
        let mut session = session_with_entries(vec![
            entry_with_details(1, "2026-03-02", 1, 0),
            entry_with_details(2, "2026-03-03", 1, 0),
        ]);
        assert!(session.begin_drag(1));
        let target = DropTarget::Group(("2026-03-03".to_string(), 1));
        assert!(session.evaluate_drag(&target).is_valid());

        let plan = session.complete_drag(Some(&target)).expect("valid move");
        let moved = plan.group_move().expect("group move");
        assert_eq!(moved.item_id, 1);
        assert_eq!(moved.order_index, Some(1));
    }

    #[test]
    fn routine_manager_blocks_sole_member_moves() {
        let mut manager = RoutineManagerState::default();
        manager.open(3);
        manager.set_exercises(vec![
            crate::domain::models::test_support::routine_exercise_with_details(1, 1, 0),
            crate::domain::models::test_support::routine_exercise_with_details(2, 2, 0),
        ]);

        assert!(manager.begin_drag(2));
        let validity = manager.evaluate_drag(&DropTarget::Group(1));
        assert_eq!(
            validity,
            MoveValidity::Invalid(MoveRejection::SoleMemberOfGroup)
        );
        assert_eq!(
            manager.complete_drag(Some(&DropTarget::Group(1))),
            Err(MoveRejection::SoleMemberOfGroup)
        );
    }
}
