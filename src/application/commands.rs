//! Command implementations behind the tauri layer.
//!
//! Dashboard flows follow one protocol: validate locally, fire the backend
//! calls, then re-fetch the affected collection so local state resyncs with
//! backend-assigned truth. Outcomes surface through the toast queue; CRUD
//! passthroughs for the management screens propagate errors to the shell
//! instead, which renders them inline.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::bootstrap::bootstrap_workspace;
use crate::application::dashboard::{
    BusyFlags, CalendarGroupKey, DashboardSession, DayCell,
};
use crate::application::modals::{
    ConfirmPrompt, DashboardModal, EntryForm, PendingAction, RoutineLoadForm, SessionForm, Toast,
    ToastKind,
};
use crate::application::services::{
    ExerciseService, PersonService, RoutineService, WorkoutService,
};
use crate::domain::grouping::GroupBucket;
use crate::domain::models::{
    Exercise, Person, Routine, RoutineExercise, RoutineExerciseWithDetails, WorkoutEntry,
};
use crate::domain::reorder::{DropTarget, MoveRejection, ReorderPlan};
use crate::infrastructure::bridge::CommandBridge;
use crate::infrastructure::config::{Settings, load_settings, save_settings};
use crate::infrastructure::error::AppError;

const MSG_PERSON_REQUIRED: &str = "Por favor, selecciona una persona primero.";
const MSG_PERSON_AND_DATE_REQUIRED: &str = "Por favor, selecciona una persona y fecha";
const MSG_ENTRY_SAVED: &str = "Entrada de entrenamiento agregada correctamente";
const MSG_SESSION_SAVED: &str = "Sesión de entrenamiento guardada correctamente";
const MSG_ENTRY_DELETED: &str = "Ejercicio eliminado correctamente";
const MSG_NO_VALID_ROWS: &str = "No hay ejercicios válidos en la sesión";
const MSG_SAVE_ENTRY_FAILED: &str = "Error al guardar la entrada de entrenamiento";
const MSG_SAVE_SESSION_FAILED: &str = "Error al guardar la sesión de entrenamiento";
const MSG_DELETE_FAILED: &str = "Error al eliminar el ejercicio";
const MSG_FETCH_FAILED: &str = "Error al obtener las entradas de entrenamiento";
const MSG_MOVE_LAST_ITEM: &str = "No puedes mover el último elemento del grupo";
const MSG_MOVE_UNKNOWN_GROUP: &str = "No puedes mover el elemento a un grupo que no existe";
const MSG_MOVE_FAILED: &str = "Error al mover el elemento";
const MSG_ROUTINE_EMPTY: &str = "La rutina seleccionada no tiene ejercicios.";
const MSG_ROUTINE_APPLIED: &str = "Rutina aplicada exitosamente a la fecha seleccionada";
const MSG_ROUTINE_LOAD_FAILED: &str =
    "Error al cargar la rutina. Por favor, inténtalo de nuevo.";
const MSG_APPLY_ROUTINE_FAILED: &str =
    "Error al aplicar la rutina. Por favor, inténtalo de nuevo.";

pub struct AppState {
    config_dir: PathBuf,
    logs_dir: PathBuf,
    persons: PersonService,
    exercises: ExerciseService,
    routines: RoutineService,
    workouts: WorkoutService,
    session: Mutex<DashboardSession>,
    log_guard: Mutex<()>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf, bridge: Arc<dyn CommandBridge>) -> Result<Self, AppError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let settings = load_settings(&bootstrap.config_dir)?;

        Ok(Self {
            config_dir: bootstrap.config_dir,
            logs_dir: bootstrap.logs_dir,
            persons: PersonService::new(Arc::clone(&bridge)),
            exercises: ExerciseService::new(Arc::clone(&bridge)),
            routines: RoutineService::new(Arc::clone(&bridge)),
            workouts: WorkoutService::new(bridge),
            session: Mutex::new(DashboardSession::new(settings)),
            log_guard: Mutex::new(()),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn command_error(&self, command: &str, error: &AppError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

fn lock_session(state: &AppState) -> Result<MutexGuard<'_, DashboardSession>, AppError> {
    state
        .session
        .lock()
        .map_err(|error| AppError::InvalidInput(format!("session lock poisoned: {error}")))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The backend message when it carries the user-facing marker, otherwise the
/// generic fallback for the failed operation.
fn backend_failure_message(error: &AppError, fallback: &str) -> String {
    error
        .user_message()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| fallback.to_string())
}

fn rejection_message(rejection: MoveRejection) -> &'static str {
    match rejection {
        MoveRejection::SoleMemberOfGroup => MSG_MOVE_LAST_ITEM,
        MoveRejection::UnknownGroup => MSG_MOVE_UNKNOWN_GROUP,
        MoveRejection::CrossGroupItem | MoveRejection::StaleTarget => MSG_MOVE_FAILED,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardViewResponse {
    pub person: Option<Person>,
    pub week_offset: i64,
    pub selected_date: Option<String>,
    pub title: String,
    pub weeks: Vec<Vec<DayCell>>,
    pub busy: BusyFlags,
    pub modal: Option<DashboardModal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineManagerView {
    pub routine_id: Option<i32>,
    pub groups: Vec<GroupBucket<RoutineExerciseWithDetails>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarDropDto {
    Group { date: String, group_number: i32 },
    Item { entry_id: i32 },
}

impl CalendarDropDto {
    fn into_target(self) -> DropTarget<CalendarGroupKey> {
        match self {
            CalendarDropDto::Group { date, group_number } => {
                DropTarget::Group((date, group_number))
            }
            CalendarDropDto::Item { entry_id } => DropTarget::Item(entry_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutineDropDto {
    Group { group_number: i32 },
    Item { exercise_id: i32 },
}

impl RoutineDropDto {
    fn into_target(self) -> DropTarget<i32> {
        match self {
            RoutineDropDto::Group { group_number } => DropTarget::Group(group_number),
            RoutineDropDto::Item { exercise_id } => DropTarget::Item(exercise_id),
        }
    }
}

fn view_of(session: &DashboardSession) -> DashboardViewResponse {
    let now = today();
    DashboardViewResponse {
        person: session.selected_person.clone(),
        week_offset: session.week_offset,
        selected_date: session.selected_date.clone(),
        title: session.window(now).title(),
        weeks: session.day_cells(now),
        busy: session.busy,
        modal: session.modal.open.clone(),
    }
}

fn routine_view_of(session: &DashboardSession) -> RoutineManagerView {
    RoutineManagerView {
        routine_id: session.routine_manager.routine_id,
        groups: session.routine_manager.grouped(),
    }
}

/// Re-fetch the authoritative window for the selected person. Mandatory after
/// every mutation; also reverts optimistic assumptions after a rejection.
async fn refresh_entries(state: &AppState) -> Result<(), AppError> {
    let scope = {
        let mut session = lock_session(state)?;
        match session.selected_person_id() {
            Some(person_id) => {
                session.busy.fetching = true;
                Some((person_id, session.fetch_range(today())))
            }
            None => None,
        }
    };
    let Some((person_id, (start_date, end_date))) = scope else {
        return Ok(());
    };

    let fetched = state
        .workouts
        .by_person_and_range(person_id, &start_date, &end_date)
        .await;

    let mut session = lock_session(state)?;
    session.busy.fetching = false;
    match fetched {
        Ok(entries) => {
            session.set_entries(entries);
            Ok(())
        }
        Err(error) => {
            session.toasts.push(MSG_FETCH_FAILED, ToastKind::Error);
            Err(error)
        }
    }
}

async fn refresh_routine_exercises(state: &AppState) -> Result<(), AppError> {
    let routine_id = {
        let session = lock_session(state)?;
        session.routine_manager.routine_id
    };
    let Some(routine_id) = routine_id else {
        return Ok(());
    };

    let fetched = state.routines.exercises(routine_id).await;
    let mut session = lock_session(state)?;
    match fetched {
        Ok(exercises) => {
            session.routine_manager.set_exercises(exercises);
            Ok(())
        }
        Err(error) => {
            session
                .toasts
                .push(MSG_ROUTINE_LOAD_FAILED, ToastKind::Error);
            Err(error)
        }
    }
}

pub fn dashboard_view_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let session = lock_session(state)?;
    Ok(view_of(&session))
}

pub async fn select_person_impl(
    state: &AppState,
    person: Option<Person>,
) -> Result<DashboardViewResponse, AppError> {
    {
        let mut session = lock_session(state)?;
        session.select_person(person);
    }
    let _ = refresh_entries(state).await;
    state.log_info("select_person", "dashboard person changed");
    dashboard_view_impl(state)
}

pub async fn navigate_weeks_impl(
    state: &AppState,
    direction: String,
) -> Result<DashboardViewResponse, AppError> {
    {
        let mut session = lock_session(state)?;
        match direction.trim() {
            "newer" => session.week_offset += 1,
            "older" => session.week_offset -= 1,
            "current" => session.week_offset = 0,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "unsupported navigation direction: {other}"
                )));
            }
        }
    }
    let _ = refresh_entries(state).await;
    dashboard_view_impl(state)
}

pub async fn refresh_dashboard_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let _ = refresh_entries(state).await;
    dashboard_view_impl(state)
}

/// Left click on a day: open the whole-session editor for that date,
/// pre-filled from the entries already scheduled there.
pub fn day_click_impl(state: &AppState, date: String) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if session.selected_person.is_none() {
        session.toasts.push(MSG_PERSON_REQUIRED, ToastKind::Error);
        return Ok(view_of(&session));
    }

    let existing = session.entries_for_date(&date);
    let form = if existing.is_empty() {
        SessionForm::for_date(&date, session.settings.default_session_rows)
    } else {
        SessionForm {
            date: date.clone(),
            rows: existing
                .iter()
                .map(|entry| EntryForm {
                    exercise_id: Some(entry.exercise_id),
                    sets: entry.sets,
                    reps: entry.reps,
                    weight: entry.weight,
                    notes: entry.notes.clone().unwrap_or_default(),
                    group_number: entry.group_number,
                })
                .collect(),
        }
    };

    session.selected_date = Some(date);
    session.modal.open(DashboardModal::SessionEditor(form));
    Ok(view_of(&session))
}

/// Right click on a day: open the quick single-entry editor.
pub fn day_context_impl(state: &AppState, date: String) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if session.selected_person.is_none() {
        session.toasts.push(MSG_PERSON_REQUIRED, ToastKind::Error);
        return Ok(view_of(&session));
    }
    session.selected_date = Some(date);
    session
        .modal
        .open(DashboardModal::EntryEditor(EntryForm::with_group(1)));
    Ok(view_of(&session))
}

pub fn update_entry_form_impl(
    state: &AppState,
    form: EntryForm,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if matches!(session.modal.open, Some(DashboardModal::EntryEditor(_))) {
        session.modal.open(DashboardModal::EntryEditor(form));
    }
    Ok(view_of(&session))
}

pub fn update_session_form_impl(
    state: &AppState,
    form: SessionForm,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if let Some(open) = session.modal.session_form_mut() {
        *open = form;
    }
    Ok(view_of(&session))
}

pub fn close_modal_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    session.modal.close();
    Ok(view_of(&session))
}

pub async fn save_entry_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let prepared = {
        let mut session = lock_session(state)?;
        let form = match &session.modal.open {
            Some(DashboardModal::EntryEditor(form)) => form.clone(),
            _ => return Ok(view_of(&session)),
        };
        let (person_id, date) = match (session.selected_person_id(), session.selected_date.clone())
        {
            (Some(person_id), Some(date)) => (person_id, date),
            _ => {
                session
                    .toasts
                    .push(MSG_PERSON_AND_DATE_REQUIRED, ToastKind::Error);
                return Ok(view_of(&session));
            }
        };

        // Append to the chosen group on that date.
        let next_order = session
            .entries_for_date(&date)
            .iter()
            .filter(|entry| entry.group_number == form.group_number.max(1))
            .count() as i32;
        match form.to_entry(person_id, &date, next_order) {
            Ok(entry) => {
                session.busy.saving_entry = true;
                entry
            }
            Err(_) => {
                session
                    .toasts
                    .push(MSG_PERSON_AND_DATE_REQUIRED, ToastKind::Error);
                return Ok(view_of(&session));
            }
        }
    };

    let saved = state.workouts.create_entry(&prepared).await;
    {
        let mut session = lock_session(state)?;
        session.busy.saving_entry = false;
        match &saved {
            Ok(_) => {
                session.modal.close();
                session.toasts.push(MSG_ENTRY_SAVED, ToastKind::Success);
            }
            Err(error) => {
                let message = backend_failure_message(error, MSG_SAVE_ENTRY_FAILED);
                session.toasts.push(message, ToastKind::Error);
                state.log_error("save_entry", &error.to_string());
            }
        }
    }
    if saved.is_ok() {
        let _ = refresh_entries(state).await;
        state.log_info("save_entry", "created workout entry");
    }
    dashboard_view_impl(state)
}

/// Save the whole-day editor with replace semantics: the date's previous
/// entries are deleted, then the valid rows are recreated with their
/// presentation order.
pub async fn save_session_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let prepared = {
        let mut session = lock_session(state)?;
        let form = match &session.modal.open {
            Some(DashboardModal::SessionEditor(form)) => form.clone(),
            _ => return Ok(view_of(&session)),
        };
        let Some(person_id) = session.selected_person_id() else {
            session.toasts.push(MSG_PERSON_REQUIRED, ToastKind::Error);
            return Ok(view_of(&session));
        };

        let mut rows = Vec::new();
        let mut order: i32 = 0;
        for row in form.valid_rows() {
            match row.to_entry(person_id, &form.date, order) {
                Ok(entry) => {
                    rows.push(entry);
                    order += 1;
                }
                Err(_) => continue,
            }
        }
        if rows.is_empty() {
            session.toasts.push(MSG_NO_VALID_ROWS, ToastKind::Error);
            return Ok(view_of(&session));
        }

        let stale_ids: Vec<i32> = session
            .entries_for_date(&form.date)
            .iter()
            .map(|entry| entry.id)
            .collect();
        session.busy.saving_session = true;
        (rows, stale_ids)
    };

    let (rows, stale_ids) = prepared;
    let mut outcome: Result<(), AppError> = Ok(());
    for stale_id in stale_ids {
        if let Err(error) = state.workouts.delete_entry(stale_id).await {
            outcome = Err(error);
            break;
        }
    }
    if outcome.is_ok() {
        for entry in &rows {
            if let Err(error) = state.workouts.create_entry(entry).await {
                outcome = Err(error);
                break;
            }
        }
    }

    {
        let mut session = lock_session(state)?;
        session.busy.saving_session = false;
        match &outcome {
            Ok(()) => {
                session.modal.close();
                session.toasts.push(MSG_SESSION_SAVED, ToastKind::Success);
            }
            Err(error) => {
                let message = backend_failure_message(error, MSG_SAVE_SESSION_FAILED);
                session.toasts.push(message, ToastKind::Error);
                state.log_error("save_session", &error.to_string());
            }
        }
    }
    let _ = refresh_entries(state).await;
    if outcome.is_ok() {
        state.log_info("save_session", "replaced workout session");
    }
    dashboard_view_impl(state)
}

pub fn request_delete_entry_impl(
    state: &AppState,
    entry_id: i32,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    let Some(entry) = session.entries.iter().find(|entry| entry.id == entry_id) else {
        // Deleted concurrently; nothing to confirm.
        return Ok(view_of(&session));
    };
    let prompt = ConfirmPrompt {
        title: "Eliminar Ejercicio".to_string(),
        message: format!(
            "¿Estás seguro de que quieres eliminar \"{}\" del {}?",
            entry.exercise_name, entry.date
        ),
        confirm_label: "Eliminar".to_string(),
        action: PendingAction::DeleteEntry { entry_id },
    };
    session.modal.open(DashboardModal::Confirm(prompt));
    Ok(view_of(&session))
}

pub fn open_load_routine_impl(
    state: &AppState,
    date: Option<String>,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if session.selected_person.is_none() {
        session.toasts.push(MSG_PERSON_REQUIRED, ToastKind::Error);
        return Ok(view_of(&session));
    }
    let form = RoutineLoadForm {
        routine_id: None,
        date: date
            .or_else(|| session.selected_date.clone())
            .unwrap_or_default(),
        group_number: 1,
    };
    session.modal.open(DashboardModal::LoadRoutine(form));
    Ok(view_of(&session))
}

pub fn update_load_routine_impl(
    state: &AppState,
    form: RoutineLoadForm,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    if matches!(session.modal.open, Some(DashboardModal::LoadRoutine(_))) {
        session.modal.open(DashboardModal::LoadRoutine(form));
    }
    Ok(view_of(&session))
}

/// Applying a routine replaces the date's existing entries, so it always
/// goes through a confirm prompt first.
pub fn request_apply_routine_impl(state: &AppState) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    let form = match &session.modal.open {
        Some(DashboardModal::LoadRoutine(form)) => form.clone(),
        _ => return Ok(view_of(&session)),
    };
    let (Some(routine_id), date) = (form.routine_id, form.date.clone()) else {
        session
            .toasts
            .push("Por favor selecciona una rutina y una fecha", ToastKind::Error);
        return Ok(view_of(&session));
    };
    if date.trim().is_empty() {
        session
            .toasts
            .push("Por favor selecciona una rutina y una fecha", ToastKind::Error);
        return Ok(view_of(&session));
    }

    let prompt = ConfirmPrompt {
        title: "Confirmar aplicación de rutina".to_string(),
        message: format!(
            "¿Estás seguro de que quieres aplicar esta rutina al {date}? Si ya existen ejercicios para esa fecha, serán reemplazados."
        ),
        confirm_label: "Aplicar Rutina".to_string(),
        action: PendingAction::ApplyRoutineToDate {
            routine_id,
            date,
            group_number: form.group_number.max(1),
        },
    };
    session.modal.open(DashboardModal::Confirm(prompt));
    Ok(view_of(&session))
}

pub async fn resolve_confirm_impl(
    state: &AppState,
    approve: bool,
) -> Result<DashboardViewResponse, AppError> {
    let action = {
        let mut session = lock_session(state)?;
        match session.modal.take_confirm() {
            Some(prompt) if approve => Some(prompt.action),
            _ => None,
        }
    };

    match action {
        Some(PendingAction::DeleteEntry { entry_id }) => delete_entry(state, entry_id).await,
        Some(PendingAction::ApplyRoutineToDate {
            routine_id,
            date,
            group_number,
        }) => apply_routine_to_date(state, routine_id, &date, group_number).await,
        None => {}
    }
    dashboard_view_impl(state)
}

async fn delete_entry(state: &AppState, entry_id: i32) {
    if let Ok(mut session) = lock_session(state) {
        session.busy.deleting_entry = true;
    }
    let deleted = state.workouts.delete_entry(entry_id).await;
    if let Ok(mut session) = lock_session(state) {
        session.busy.deleting_entry = false;
        match &deleted {
            Ok(()) => session.toasts.push(MSG_ENTRY_DELETED, ToastKind::Success),
            Err(error) => {
                let message = backend_failure_message(error, MSG_DELETE_FAILED);
                session.toasts.push(message, ToastKind::Error);
                state.log_error("delete_entry", &error.to_string());
            }
        }
    }
    let _ = refresh_entries(state).await;
    if deleted.is_ok() {
        state.log_info("delete_entry", &format!("deleted entry_id={entry_id}"));
    }
}

async fn apply_routine_to_date(state: &AppState, routine_id: i32, date: &str, group_number: i32) {
    let person_id = {
        let mut session = match lock_session(state) {
            Ok(session) => session,
            Err(_) => return,
        };
        let Some(person_id) = session.selected_person_id() else {
            session
                .toasts
                .push(MSG_PERSON_AND_DATE_REQUIRED, ToastKind::Error);
            return;
        };
        session.busy.applying_routine = true;
        person_id
    };

    let outcome = apply_routine_calls(state, person_id, routine_id, date, group_number).await;

    if let Ok(mut session) = lock_session(state) {
        session.busy.applying_routine = false;
        match &outcome {
            Ok(true) => session.toasts.push(MSG_ROUTINE_APPLIED, ToastKind::Success),
            Ok(false) => session.toasts.push(MSG_ROUTINE_EMPTY, ToastKind::Warning),
            Err(error) => {
                let message = backend_failure_message(error, MSG_APPLY_ROUTINE_FAILED);
                session.toasts.push(message, ToastKind::Error);
                state.log_error("apply_routine", &error.to_string());
            }
        }
    }
    let _ = refresh_entries(state).await;
    if let Ok(true) = outcome {
        state.log_info(
            "apply_routine",
            &format!("applied routine_id={routine_id} to {date}"),
        );
    }
}

/// Returns `Ok(false)` when the routine has no exercises to apply.
async fn apply_routine_calls(
    state: &AppState,
    person_id: i32,
    routine_id: i32,
    date: &str,
    group_number: i32,
) -> Result<bool, AppError> {
    let Some(routine) = state.routines.with_exercises(routine_id).await? else {
        return Ok(false);
    };
    if routine.exercises.is_empty() {
        return Ok(false);
    }

    let stale_ids: Vec<i32> = {
        let session = lock_session(state)?;
        session
            .entries_for_date(date)
            .iter()
            .map(|entry| entry.id)
            .collect()
    };
    for stale_id in stale_ids {
        state.workouts.delete_entry(stale_id).await?;
    }

    let mut slots = routine.exercises.clone();
    slots.sort_by_key(|slot| (slot.group_number, slot.order_index));
    for (order, slot) in slots.iter().enumerate() {
        let entry = WorkoutEntry {
            id: None,
            person_id,
            exercise_id: slot.exercise_id,
            date: date.to_string(),
            sets: slot.sets,
            reps: slot.reps,
            weight: slot.weight,
            notes: slot.notes.clone(),
            group_number,
            order_index: order as i32,
        };
        state.workouts.create_entry(&entry).await?;
    }
    Ok(true)
}

/// Load a routine into the open session editor instead of persisting it.
pub async fn load_routine_into_session_impl(
    state: &AppState,
    routine_id: i32,
) -> Result<DashboardViewResponse, AppError> {
    let date = {
        let mut session = lock_session(state)?;
        if session.selected_person.is_none() {
            session.toasts.push(MSG_PERSON_REQUIRED, ToastKind::Error);
            return Ok(view_of(&session));
        }
        match session.selected_date.clone() {
            Some(date) => date,
            None => {
                session
                    .toasts
                    .push(MSG_PERSON_AND_DATE_REQUIRED, ToastKind::Error);
                return Ok(view_of(&session));
            }
        }
    };

    let fetched = state.routines.with_exercises(routine_id).await;
    let mut session = lock_session(state)?;
    match fetched {
        Ok(Some(routine)) if !routine.exercises.is_empty() => {
            let mut slots = routine.exercises.clone();
            slots.sort_by_key(|slot| (slot.group_number, slot.order_index));
            let rows: Vec<EntryForm> = slots
                .iter()
                .map(|slot| EntryForm {
                    exercise_id: Some(slot.exercise_id),
                    sets: slot.sets,
                    reps: slot.reps,
                    weight: slot.weight,
                    notes: slot.notes.clone().unwrap_or_default(),
                    group_number: slot.group_number,
                })
                .collect();
            let count = rows.len();
            session
                .modal
                .open(DashboardModal::SessionEditor(SessionForm { date, rows }));
            session.toasts.push(
                format!("Rutina \"{}\" cargada con {} ejercicios.", routine.name, count),
                ToastKind::Success,
            );
        }
        Ok(_) => {
            session.toasts.push(MSG_ROUTINE_EMPTY, ToastKind::Warning);
        }
        Err(error) => {
            let message = backend_failure_message(&error, MSG_ROUTINE_LOAD_FAILED);
            session.toasts.push(message, ToastKind::Error);
            state.log_error("load_routine", &error.to_string());
        }
    }
    Ok(view_of(&session))
}

pub fn create_day_group_impl(
    state: &AppState,
    date: String,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    session.create_empty_group(&date);
    Ok(view_of(&session))
}

pub fn remove_day_group_impl(
    state: &AppState,
    date: String,
    group_number: i32,
) -> Result<DashboardViewResponse, AppError> {
    let mut session = lock_session(state)?;
    session.remove_empty_group(&date, group_number);
    Ok(view_of(&session))
}

pub fn begin_drag_impl(state: &AppState, entry_id: i32) -> Result<bool, AppError> {
    let mut session = lock_session(state)?;
    Ok(session.begin_drag(entry_id))
}

pub fn evaluate_drag_impl(state: &AppState, target: CalendarDropDto) -> Result<bool, AppError> {
    let session = lock_session(state)?;
    Ok(session.evaluate_drag(&target.into_target()).is_valid())
}

pub async fn complete_drag_impl(
    state: &AppState,
    target: Option<CalendarDropDto>,
) -> Result<DashboardViewResponse, AppError> {
    let target = target.map(CalendarDropDto::into_target);
    let plan = {
        let mut session = lock_session(state)?;
        match session.complete_drag(target.as_ref()) {
            Ok(plan) if plan.is_empty() => {
                session.end_drag();
                return Ok(view_of(&session));
            }
            Ok(plan) => {
                session.busy.reordering = true;
                plan
            }
            Err(rejection) => {
                session.end_drag();
                session
                    .toasts
                    .push(rejection_message(rejection), ToastKind::Warning);
                return Ok(view_of(&session));
            }
        }
    };

    let outcome = persist_calendar_plan(state, &plan).await;
    {
        let mut session = lock_session(state)?;
        session.busy.reordering = false;
        session.end_drag();
        if let Err(error) = &outcome {
            let message = backend_failure_message(error, MSG_MOVE_FAILED);
            session.toasts.push(message, ToastKind::Error);
            state.log_error("complete_drag", &error.to_string());
        }
    }
    let _ = refresh_entries(state).await;
    if outcome.is_ok() {
        state.log_info(
            "complete_drag",
            &format!("persisted {} order updates", plan.updates.len()),
        );
    }
    dashboard_view_impl(state)
}

async fn persist_calendar_plan(
    state: &AppState,
    plan: &ReorderPlan<CalendarGroupKey>,
) -> Result<(), AppError> {
    // The moved entry carries its new date/group/order as a full row update;
    // everything else is a batched renumbering.
    if let Some(moved) = plan.group_move() {
        let entry = {
            let session = lock_session(state)?;
            let Some(stored) = session
                .entries
                .iter()
                .find(|entry| entry.id == moved.item_id)
            else {
                return Ok(());
            };
            let mut entry = stored.to_entry();
            if let Some((date, group_number)) = moved.group.clone() {
                entry.date = date;
                entry.group_number = group_number;
            }
            if let Some(order_index) = moved.order_index {
                entry.order_index = order_index;
            }
            entry
        };
        state.workouts.update_entry(&entry).await?;
    }

    let pairs = plan.order_pairs();
    if !pairs.is_empty() {
        state.workouts.update_order(&pairs).await?;
    }
    Ok(())
}

pub async fn open_routine_manager_impl(
    state: &AppState,
    routine_id: i32,
) -> Result<RoutineManagerView, AppError> {
    {
        let mut session = lock_session(state)?;
        session.routine_manager.open(routine_id);
    }
    refresh_routine_exercises(state).await?;
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}

pub fn close_routine_manager_impl(state: &AppState) -> Result<(), AppError> {
    let mut session = lock_session(state)?;
    session.routine_manager.close();
    Ok(())
}

pub fn routine_manager_view_impl(state: &AppState) -> Result<RoutineManagerView, AppError> {
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}

pub fn create_routine_group_impl(state: &AppState) -> Result<RoutineManagerView, AppError> {
    let mut session = lock_session(state)?;
    let occupied = session.routine_manager.occupied_groups();
    session.routine_manager.empty_groups.create_group(&occupied);
    Ok(routine_view_of(&session))
}

pub fn remove_routine_group_impl(
    state: &AppState,
    group_number: i32,
) -> Result<RoutineManagerView, AppError> {
    let mut session = lock_session(state)?;
    session.routine_manager.empty_groups.remove_group(group_number);
    Ok(routine_view_of(&session))
}

pub fn routine_begin_drag_impl(state: &AppState, exercise_id: i32) -> Result<bool, AppError> {
    let mut session = lock_session(state)?;
    Ok(session.routine_manager.begin_drag(exercise_id))
}

pub fn routine_evaluate_drag_impl(
    state: &AppState,
    target: RoutineDropDto,
) -> Result<bool, AppError> {
    let session = lock_session(state)?;
    Ok(session
        .routine_manager
        .evaluate_drag(&target.into_target())
        .is_valid())
}

pub async fn routine_complete_drag_impl(
    state: &AppState,
    target: Option<RoutineDropDto>,
) -> Result<RoutineManagerView, AppError> {
    let target = target.map(RoutineDropDto::into_target);
    let (plan, routine_id) = {
        let mut session = lock_session(state)?;
        let routine_id = session.routine_manager.routine_id;
        match session.routine_manager.complete_drag(target.as_ref()) {
            Ok(plan) if plan.is_empty() => {
                session.routine_manager.end_drag();
                return Ok(routine_view_of(&session));
            }
            Ok(plan) => {
                session.busy.reordering = true;
                (plan, routine_id)
            }
            Err(rejection) => {
                session.routine_manager.end_drag();
                session
                    .toasts
                    .push(rejection_message(rejection), ToastKind::Warning);
                return Ok(routine_view_of(&session));
            }
        }
    };

    let outcome = persist_routine_plan(state, routine_id, &plan).await;
    {
        let mut session = lock_session(state)?;
        session.busy.reordering = false;
        session.routine_manager.end_drag();
        if let Err(error) = &outcome {
            let message = backend_failure_message(error, MSG_MOVE_FAILED);
            session.toasts.push(message, ToastKind::Error);
            state.log_error("routine_complete_drag", &error.to_string());
        }
    }
    let _ = refresh_routine_exercises(state).await;
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}

async fn persist_routine_plan(
    state: &AppState,
    routine_id: Option<i32>,
    plan: &ReorderPlan<i32>,
) -> Result<(), AppError> {
    let Some(routine_id) = routine_id else {
        return Ok(());
    };

    if let Some(moved) = plan.group_move() {
        let slot = {
            let session = lock_session(state)?;
            let Some(stored) = session
                .routine_manager
                .exercises
                .iter()
                .find(|slot| slot.id == moved.item_id)
            else {
                return Ok(());
            };
            let mut slot = stored.to_routine_exercise();
            if let Some(group_number) = moved.group {
                slot.group_number = group_number;
            }
            if let Some(order_index) = moved.order_index {
                slot.order_index = order_index;
            }
            slot
        };
        state.routines.update_exercise(&slot).await?;
    }

    let pairs = plan.order_pairs();
    if !pairs.is_empty() {
        state.routines.reorder(routine_id, &pairs).await?;
    }
    Ok(())
}

pub fn drain_toasts_impl(state: &AppState) -> Result<Vec<Toast>, AppError> {
    let mut session = lock_session(state)?;
    Ok(session.toasts.drain())
}

pub fn get_settings_impl(state: &AppState) -> Result<Settings, AppError> {
    let session = lock_session(state)?;
    Ok(session.settings.clone())
}

pub fn update_settings_impl(state: &AppState, settings: Settings) -> Result<Settings, AppError> {
    save_settings(state.config_dir(), &settings)?;
    let mut session = lock_session(state)?;
    session.settings = settings.clone();
    state.log_info("update_settings", "settings saved");
    Ok(settings)
}

// CRUD passthroughs for the management screens. Validation failures and
// backend rejections propagate to the shell, which renders them inline.

pub async fn list_people_impl(
    state: &AppState,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Person>, AppError> {
    let default_size = get_settings_impl(state)?.people_page_size;
    state
        .persons
        .list_paginated(page.unwrap_or(1), page_size.unwrap_or(default_size))
        .await
}

pub async fn search_people_impl(
    state: &AppState,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Person>, AppError> {
    let default_size = get_settings_impl(state)?.people_page_size;
    state
        .persons
        .search_paginated(&query, page.unwrap_or(1), page_size.unwrap_or(default_size))
        .await
}

pub async fn create_person_impl(state: &AppState, person: Person) -> Result<Person, AppError> {
    person.validate().map_err(AppError::InvalidInput)?;
    let created = state.persons.create(&person).await?;
    state.log_info("create_person", "created person");
    Ok(created)
}

pub async fn update_person_impl(state: &AppState, person: Person) -> Result<(), AppError> {
    person.validate().map_err(AppError::InvalidInput)?;
    state.persons.update(&person).await
}

pub async fn delete_person_impl(state: &AppState, id: i32) -> Result<(), AppError> {
    state.persons.delete(id).await?;
    let mut session = lock_session(state)?;
    if session.selected_person_id() == Some(id) {
        session.select_person(None);
    }
    Ok(())
}

pub async fn list_exercises_impl(
    state: &AppState,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Exercise>, AppError> {
    let default_size = get_settings_impl(state)?.exercises_page_size;
    state
        .exercises
        .list_paginated(page.unwrap_or(1), page_size.unwrap_or(default_size))
        .await
}

pub async fn search_exercises_impl(
    state: &AppState,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Exercise>, AppError> {
    let default_size = get_settings_impl(state)?.exercises_page_size;
    state
        .exercises
        .search_paginated(&query, page.unwrap_or(1), page_size.unwrap_or(default_size))
        .await
}

pub async fn create_exercise_impl(
    state: &AppState,
    exercise: Exercise,
) -> Result<Exercise, AppError> {
    exercise.validate().map_err(AppError::InvalidInput)?;
    state.exercises.create(&exercise).await
}

pub async fn update_exercise_impl(state: &AppState, exercise: Exercise) -> Result<(), AppError> {
    exercise.validate().map_err(AppError::InvalidInput)?;
    state.exercises.update(&exercise).await
}

pub async fn delete_exercise_impl(state: &AppState, id: i32) -> Result<(), AppError> {
    state.exercises.delete(id).await
}

pub async fn list_routines_impl(
    state: &AppState,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Routine>, AppError> {
    state
        .routines
        .list_paginated(page.unwrap_or(1), page_size.unwrap_or(50))
        .await
}

pub async fn search_routines_impl(
    state: &AppState,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Routine>, AppError> {
    state
        .routines
        .search_paginated(&query, page.unwrap_or(1), page_size.unwrap_or(50))
        .await
}

pub async fn create_routine_impl(
    state: &AppState,
    name: String,
    code: String,
) -> Result<i32, AppError> {
    let draft = Routine {
        id: None,
        name,
        code,
        created_at: None,
        updated_at: None,
    };
    draft.validate().map_err(AppError::InvalidInput)?;
    state.routines.create(&draft.name, &draft.code).await
}

pub async fn update_routine_impl(
    state: &AppState,
    id: i32,
    name: String,
    code: String,
) -> Result<(), AppError> {
    let draft = Routine {
        id: Some(id),
        name,
        code,
        created_at: None,
        updated_at: None,
    };
    draft.validate().map_err(AppError::InvalidInput)?;
    state.routines.update(id, &draft.name, &draft.code).await
}

pub async fn delete_routine_impl(state: &AppState, id: i32) -> Result<(), AppError> {
    state.routines.delete(id).await?;
    let mut session = lock_session(state)?;
    if session.routine_manager.routine_id == Some(id) {
        session.routine_manager.close();
    }
    Ok(())
}

pub async fn add_routine_exercise_impl(
    state: &AppState,
    slot: RoutineExercise,
) -> Result<RoutineManagerView, AppError> {
    slot.validate().map_err(AppError::InvalidInput)?;
    state.routines.add_exercise(&slot).await?;
    refresh_routine_exercises(state).await?;
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}

pub async fn update_routine_exercise_impl(
    state: &AppState,
    slot: RoutineExercise,
) -> Result<RoutineManagerView, AppError> {
    slot.validate().map_err(AppError::InvalidInput)?;
    state.routines.update_exercise(&slot).await?;
    refresh_routine_exercises(state).await?;
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}

pub async fn remove_routine_exercise_impl(
    state: &AppState,
    routine_id: i32,
    exercise_id: i32,
) -> Result<RoutineManagerView, AppError> {
    state.routines.remove_exercise(routine_id, exercise_id).await?;
    refresh_routine_exercises(state).await?;
    let session = lock_session(state)?;
    Ok(routine_view_of(&session))
}
