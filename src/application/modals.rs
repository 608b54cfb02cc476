//! Modal orchestration and form state for the dashboard.
//!
//! At most one modal is open at a time; opening another replaces it. Confirm
//! prompts carry the action they guard, so resolving the prompt is the only
//! way the guarded action runs.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::models::WorkoutEntry;

const TOAST_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

/// Bounded FIFO of pending notifications; the shell drains it after every
/// command. Overflow drops the oldest toast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind) {
        if self.toasts.len() == TOAST_CAPACITY {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            message: message.into(),
            kind,
        });
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// One row of the entry/session editors. Numeric fields keep the backend's
/// optional semantics: empty means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub exercise_id: Option<i32>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: String,
    pub group_number: i32,
}

impl EntryForm {
    pub fn with_group(group_number: i32) -> Self {
        Self {
            group_number,
            ..Self::default()
        }
    }

    pub fn has_exercise(&self) -> bool {
        self.exercise_id.is_some_and(|id| id > 0)
    }

    pub fn to_entry(
        &self,
        person_id: i32,
        date: &str,
        order_index: i32,
    ) -> Result<WorkoutEntry, String> {
        let exercise_id = self
            .exercise_id
            .filter(|id| *id > 0)
            .ok_or("an exercise must be selected")?;
        let entry = WorkoutEntry {
            id: None,
            person_id,
            exercise_id,
            date: date.to_string(),
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            notes: if self.notes.trim().is_empty() {
                None
            } else {
                Some(self.notes.trim().to_string())
            },
            group_number: self.group_number.max(1),
            order_index,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// The whole-day editor: an ordered list of rows for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionForm {
    pub date: String,
    pub rows: Vec<EntryForm>,
}

impl SessionForm {
    pub fn for_date(date: &str, row_count: u32) -> Self {
        Self {
            date: date.to_string(),
            rows: (0..row_count).map(|_| EntryForm::with_group(1)).collect(),
        }
    }

    /// Rows with an exercise chosen, in presentation order.
    pub fn valid_rows(&self) -> Vec<&EntryForm> {
        self.rows.iter().filter(|row| row.has_exercise()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineLoadForm {
    pub routine_id: Option<i32>,
    pub date: String,
    pub group_number: i32,
}

/// Action deferred behind a confirm prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteEntry { entry_id: i32 },
    ApplyRoutineToDate {
        routine_id: i32,
        date: String,
        group_number: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub action: PendingAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardModal {
    EntryEditor(EntryForm),
    SessionEditor(SessionForm),
    LoadRoutine(RoutineLoadForm),
    Confirm(ConfirmPrompt),
    Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalState {
    pub open: Option<DashboardModal>,
}

impl ModalState {
    pub fn open(&mut self, modal: DashboardModal) {
        self.open = Some(modal);
    }

    pub fn close(&mut self) -> Option<DashboardModal> {
        self.open.take()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Close the confirm prompt and hand back its guarded action, if the
    /// open modal was a confirm prompt.
    pub fn take_confirm(&mut self) -> Option<ConfirmPrompt> {
        match self.open.take() {
            Some(DashboardModal::Confirm(prompt)) => Some(prompt),
            other => {
                self.open = other;
                None
            }
        }
    }

    pub fn session_form_mut(&mut self) -> Option<&mut SessionForm> {
        match self.open.as_mut() {
            Some(DashboardModal::SessionEditor(form)) => Some(form),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_queue_drops_oldest_on_overflow() {
        let mut queue = ToastQueue::default();
        for index in 0..25 {
            queue.push(format!("toast {index}"), ToastKind::Info);
        }
        assert_eq!(queue.len(), TOAST_CAPACITY);
        let drained = queue.drain();
        assert_eq!(drained[0].message, "toast 5");
        assert!(queue.is_empty());
    }

    #[test]
    fn entry_form_requires_an_exercise() {
        let form = EntryForm::with_group(1);
        assert!(form.to_entry(7, "2026-03-02", 0).is_err());

        let mut form = form;
        form.exercise_id = Some(42);
        let entry = form.to_entry(7, "2026-03-02", 3).expect("valid entry");
        assert_eq!(entry.order_index, 3);
        assert_eq!(entry.group_number, 1);
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn entry_form_trims_notes_and_clamps_group() {
        let form = EntryForm {
            exercise_id: Some(5),
            sets: Some(3),
            reps: None,
            weight: None,
            notes: "  al fallo  ".to_string(),
            group_number: 0,
        };
        let entry = form.to_entry(7, "2026-03-02", 0).expect("valid entry");
        assert_eq!(entry.notes.as_deref(), Some("al fallo"));
        assert_eq!(entry.group_number, 1);
    }

    #[test]
    fn session_form_filters_rows_without_exercise() {
        let mut form = SessionForm::for_date("2026-03-02", 3);
        assert_eq!(form.rows.len(), 3);
        form.rows[1].exercise_id = Some(9);
        assert_eq!(form.valid_rows().len(), 1);
    }

    #[test]
    fn opening_a_modal_replaces_the_previous_one() {
        let mut modals = ModalState::default();
        modals.open(DashboardModal::Settings);
        modals.open(DashboardModal::EntryEditor(EntryForm::with_group(1)));
        assert!(matches!(
            modals.open,
            Some(DashboardModal::EntryEditor(_))
        ));
    }

    #[test]
    fn take_confirm_only_takes_confirm_prompts() {
        let mut modals = ModalState::default();
        modals.open(DashboardModal::Settings);
        assert!(modals.take_confirm().is_none());
        assert!(modals.is_open());

        modals.open(DashboardModal::Confirm(ConfirmPrompt {
            title: "Eliminar Ejercicio".to_string(),
            message: "¿Seguro?".to_string(),
            confirm_label: "Eliminar".to_string(),
            action: PendingAction::DeleteEntry { entry_id: 4 },
        }));
        let prompt = modals.take_confirm().expect("confirm prompt");
        assert_eq!(prompt.action, PendingAction::DeleteEntry { entry_id: 4 });
        assert!(!modals.is_open());
    }
}
