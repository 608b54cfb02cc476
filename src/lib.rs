mod application;
mod domain;
mod infrastructure;

use application::bootstrap::bootstrap_workspace;
use application::commands::{
    AppState, CalendarDropDto, DashboardViewResponse, RoutineDropDto, RoutineManagerView,
    add_routine_exercise_impl, begin_drag_impl, close_modal_impl, close_routine_manager_impl,
    complete_drag_impl, create_day_group_impl, create_exercise_impl, create_person_impl,
    create_routine_group_impl, create_routine_impl, dashboard_view_impl, day_click_impl,
    day_context_impl, delete_exercise_impl, delete_person_impl, delete_routine_impl,
    drain_toasts_impl, evaluate_drag_impl, get_settings_impl, list_exercises_impl,
    list_people_impl, list_routines_impl, load_routine_into_session_impl, navigate_weeks_impl,
    open_load_routine_impl, open_routine_manager_impl, refresh_dashboard_impl,
    remove_day_group_impl, remove_routine_exercise_impl, remove_routine_group_impl,
    request_apply_routine_impl, request_delete_entry_impl, resolve_confirm_impl,
    routine_begin_drag_impl, routine_complete_drag_impl, routine_evaluate_drag_impl,
    routine_manager_view_impl, save_entry_impl, save_session_impl, search_exercises_impl,
    search_people_impl, search_routines_impl, select_person_impl, update_entry_form_impl,
    update_exercise_impl, update_load_routine_impl, update_person_impl,
    update_routine_exercise_impl, update_routine_impl, update_session_form_impl,
    update_settings_impl,
};
use application::modals::{EntryForm, RoutineLoadForm, SessionForm, Toast};
use domain::models::{Exercise, Person, Routine, RoutineExercise};
use infrastructure::bridge::InMemoryBridge;
use infrastructure::config::Settings;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct BootstrapResponse {
    workspace_root: String,
    config_dir: String,
}

#[tauri::command]
fn bootstrap(root: Option<String>) -> Result<BootstrapResponse, String> {
    let workspace_root = match root {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().map_err(|error| error.to_string())?,
    };

    let result = bootstrap_workspace(&workspace_root).map_err(|error| error.to_string())?;
    Ok(BootstrapResponse {
        workspace_root: result.workspace_root.display().to_string(),
        config_dir: result.config_dir.display().to_string(),
    })
}

#[tauri::command]
fn ping() -> &'static str {
    "pong"
}

#[tauri::command]
fn dashboard_view(state: tauri::State<'_, AppState>) -> Result<DashboardViewResponse, String> {
    dashboard_view_impl(state.inner()).map_err(|error| state.command_error("dashboard_view", &error))
}

#[tauri::command]
async fn select_person(
    state: tauri::State<'_, AppState>,
    person: Option<Person>,
) -> Result<DashboardViewResponse, String> {
    select_person_impl(state.inner(), person)
        .await
        .map_err(|error| state.command_error("select_person", &error))
}

#[tauri::command]
async fn navigate_weeks(
    state: tauri::State<'_, AppState>,
    direction: String,
) -> Result<DashboardViewResponse, String> {
    navigate_weeks_impl(state.inner(), direction)
        .await
        .map_err(|error| state.command_error("navigate_weeks", &error))
}

#[tauri::command]
async fn refresh_dashboard(
    state: tauri::State<'_, AppState>,
) -> Result<DashboardViewResponse, String> {
    refresh_dashboard_impl(state.inner())
        .await
        .map_err(|error| state.command_error("refresh_dashboard", &error))
}

#[tauri::command]
fn day_click(
    state: tauri::State<'_, AppState>,
    date: String,
) -> Result<DashboardViewResponse, String> {
    day_click_impl(state.inner(), date).map_err(|error| state.command_error("day_click", &error))
}

#[tauri::command]
fn day_context(
    state: tauri::State<'_, AppState>,
    date: String,
) -> Result<DashboardViewResponse, String> {
    day_context_impl(state.inner(), date)
        .map_err(|error| state.command_error("day_context", &error))
}

#[tauri::command]
fn update_entry_form(
    state: tauri::State<'_, AppState>,
    form: EntryForm,
) -> Result<DashboardViewResponse, String> {
    update_entry_form_impl(state.inner(), form)
        .map_err(|error| state.command_error("update_entry_form", &error))
}

#[tauri::command]
fn update_session_form(
    state: tauri::State<'_, AppState>,
    form: SessionForm,
) -> Result<DashboardViewResponse, String> {
    update_session_form_impl(state.inner(), form)
        .map_err(|error| state.command_error("update_session_form", &error))
}

#[tauri::command]
fn close_modal(state: tauri::State<'_, AppState>) -> Result<DashboardViewResponse, String> {
    close_modal_impl(state.inner()).map_err(|error| state.command_error("close_modal", &error))
}

#[tauri::command]
async fn save_entry(state: tauri::State<'_, AppState>) -> Result<DashboardViewResponse, String> {
    save_entry_impl(state.inner())
        .await
        .map_err(|error| state.command_error("save_entry", &error))
}

#[tauri::command]
async fn save_session(state: tauri::State<'_, AppState>) -> Result<DashboardViewResponse, String> {
    save_session_impl(state.inner())
        .await
        .map_err(|error| state.command_error("save_session", &error))
}

#[tauri::command]
fn request_delete_entry(
    state: tauri::State<'_, AppState>,
    entry_id: i32,
) -> Result<DashboardViewResponse, String> {
    request_delete_entry_impl(state.inner(), entry_id)
        .map_err(|error| state.command_error("request_delete_entry", &error))
}

#[tauri::command]
fn open_load_routine(
    state: tauri::State<'_, AppState>,
    date: Option<String>,
) -> Result<DashboardViewResponse, String> {
    open_load_routine_impl(state.inner(), date)
        .map_err(|error| state.command_error("open_load_routine", &error))
}

#[tauri::command]
fn update_load_routine(
    state: tauri::State<'_, AppState>,
    form: RoutineLoadForm,
) -> Result<DashboardViewResponse, String> {
    update_load_routine_impl(state.inner(), form)
        .map_err(|error| state.command_error("update_load_routine", &error))
}

#[tauri::command]
fn request_apply_routine(
    state: tauri::State<'_, AppState>,
) -> Result<DashboardViewResponse, String> {
    request_apply_routine_impl(state.inner())
        .map_err(|error| state.command_error("request_apply_routine", &error))
}

#[tauri::command]
async fn resolve_confirm(
    state: tauri::State<'_, AppState>,
    approve: bool,
) -> Result<DashboardViewResponse, String> {
    resolve_confirm_impl(state.inner(), approve)
        .await
        .map_err(|error| state.command_error("resolve_confirm", &error))
}

#[tauri::command]
async fn load_routine_into_session(
    state: tauri::State<'_, AppState>,
    routine_id: i32,
) -> Result<DashboardViewResponse, String> {
    load_routine_into_session_impl(state.inner(), routine_id)
        .await
        .map_err(|error| state.command_error("load_routine_into_session", &error))
}

#[tauri::command]
fn create_day_group(
    state: tauri::State<'_, AppState>,
    date: String,
) -> Result<DashboardViewResponse, String> {
    create_day_group_impl(state.inner(), date)
        .map_err(|error| state.command_error("create_day_group", &error))
}

#[tauri::command]
fn remove_day_group(
    state: tauri::State<'_, AppState>,
    date: String,
    group_number: i32,
) -> Result<DashboardViewResponse, String> {
    remove_day_group_impl(state.inner(), date, group_number)
        .map_err(|error| state.command_error("remove_day_group", &error))
}

#[tauri::command]
fn begin_drag(state: tauri::State<'_, AppState>, entry_id: i32) -> Result<bool, String> {
    begin_drag_impl(state.inner(), entry_id)
        .map_err(|error| state.command_error("begin_drag", &error))
}

#[tauri::command]
fn evaluate_drag(
    state: tauri::State<'_, AppState>,
    target: CalendarDropDto,
) -> Result<bool, String> {
    evaluate_drag_impl(state.inner(), target)
        .map_err(|error| state.command_error("evaluate_drag", &error))
}

#[tauri::command]
async fn complete_drag(
    state: tauri::State<'_, AppState>,
    target: Option<CalendarDropDto>,
) -> Result<DashboardViewResponse, String> {
    complete_drag_impl(state.inner(), target)
        .await
        .map_err(|error| state.command_error("complete_drag", &error))
}

#[tauri::command]
async fn open_routine_manager(
    state: tauri::State<'_, AppState>,
    routine_id: i32,
) -> Result<RoutineManagerView, String> {
    open_routine_manager_impl(state.inner(), routine_id)
        .await
        .map_err(|error| state.command_error("open_routine_manager", &error))
}

#[tauri::command]
fn close_routine_manager(state: tauri::State<'_, AppState>) -> Result<(), String> {
    close_routine_manager_impl(state.inner())
        .map_err(|error| state.command_error("close_routine_manager", &error))
}

#[tauri::command]
fn routine_manager_view(
    state: tauri::State<'_, AppState>,
) -> Result<RoutineManagerView, String> {
    routine_manager_view_impl(state.inner())
        .map_err(|error| state.command_error("routine_manager_view", &error))
}

#[tauri::command]
fn create_routine_group(
    state: tauri::State<'_, AppState>,
) -> Result<RoutineManagerView, String> {
    create_routine_group_impl(state.inner())
        .map_err(|error| state.command_error("create_routine_group", &error))
}

#[tauri::command]
fn remove_routine_group(
    state: tauri::State<'_, AppState>,
    group_number: i32,
) -> Result<RoutineManagerView, String> {
    remove_routine_group_impl(state.inner(), group_number)
        .map_err(|error| state.command_error("remove_routine_group", &error))
}

#[tauri::command]
fn routine_begin_drag(
    state: tauri::State<'_, AppState>,
    exercise_id: i32,
) -> Result<bool, String> {
    routine_begin_drag_impl(state.inner(), exercise_id)
        .map_err(|error| state.command_error("routine_begin_drag", &error))
}

#[tauri::command]
fn routine_evaluate_drag(
    state: tauri::State<'_, AppState>,
    target: RoutineDropDto,
) -> Result<bool, String> {
    routine_evaluate_drag_impl(state.inner(), target)
        .map_err(|error| state.command_error("routine_evaluate_drag", &error))
}

#[tauri::command]
async fn routine_complete_drag(
    state: tauri::State<'_, AppState>,
    target: Option<RoutineDropDto>,
) -> Result<RoutineManagerView, String> {
    routine_complete_drag_impl(state.inner(), target)
        .await
        .map_err(|error| state.command_error("routine_complete_drag", &error))
}

#[tauri::command]
fn drain_toasts(state: tauri::State<'_, AppState>) -> Result<Vec<Toast>, String> {
    drain_toasts_impl(state.inner()).map_err(|error| state.command_error("drain_toasts", &error))
}

#[tauri::command]
fn get_settings(state: tauri::State<'_, AppState>) -> Result<Settings, String> {
    get_settings_impl(state.inner()).map_err(|error| state.command_error("get_settings", &error))
}

#[tauri::command]
fn update_settings(
    state: tauri::State<'_, AppState>,
    settings: Settings,
) -> Result<Settings, String> {
    update_settings_impl(state.inner(), settings)
        .map_err(|error| state.command_error("update_settings", &error))
}

#[tauri::command]
async fn list_people(
    state: tauri::State<'_, AppState>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Person>, String> {
    list_people_impl(state.inner(), page, page_size)
        .await
        .map_err(|error| state.command_error("list_people", &error))
}

#[tauri::command]
async fn search_people(
    state: tauri::State<'_, AppState>,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Person>, String> {
    search_people_impl(state.inner(), query, page, page_size)
        .await
        .map_err(|error| state.command_error("search_people", &error))
}

#[tauri::command]
async fn create_person(
    state: tauri::State<'_, AppState>,
    person: Person,
) -> Result<Person, String> {
    create_person_impl(state.inner(), person)
        .await
        .map_err(|error| state.command_error("create_person", &error))
}

#[tauri::command]
async fn update_person(state: tauri::State<'_, AppState>, person: Person) -> Result<(), String> {
    update_person_impl(state.inner(), person)
        .await
        .map_err(|error| state.command_error("update_person", &error))
}

#[tauri::command]
async fn delete_person(state: tauri::State<'_, AppState>, id: i32) -> Result<(), String> {
    delete_person_impl(state.inner(), id)
        .await
        .map_err(|error| state.command_error("delete_person", &error))
}

#[tauri::command]
async fn list_exercises(
    state: tauri::State<'_, AppState>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Exercise>, String> {
    list_exercises_impl(state.inner(), page, page_size)
        .await
        .map_err(|error| state.command_error("list_exercises", &error))
}

#[tauri::command]
async fn search_exercises(
    state: tauri::State<'_, AppState>,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Exercise>, String> {
    search_exercises_impl(state.inner(), query, page, page_size)
        .await
        .map_err(|error| state.command_error("search_exercises", &error))
}

#[tauri::command]
async fn create_exercise(
    state: tauri::State<'_, AppState>,
    exercise: Exercise,
) -> Result<Exercise, String> {
    create_exercise_impl(state.inner(), exercise)
        .await
        .map_err(|error| state.command_error("create_exercise", &error))
}

#[tauri::command]
async fn update_exercise(
    state: tauri::State<'_, AppState>,
    exercise: Exercise,
) -> Result<(), String> {
    update_exercise_impl(state.inner(), exercise)
        .await
        .map_err(|error| state.command_error("update_exercise", &error))
}

#[tauri::command]
async fn delete_exercise(state: tauri::State<'_, AppState>, id: i32) -> Result<(), String> {
    delete_exercise_impl(state.inner(), id)
        .await
        .map_err(|error| state.command_error("delete_exercise", &error))
}

#[tauri::command]
async fn list_routines(
    state: tauri::State<'_, AppState>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Routine>, String> {
    list_routines_impl(state.inner(), page, page_size)
        .await
        .map_err(|error| state.command_error("list_routines", &error))
}

#[tauri::command]
async fn search_routines(
    state: tauri::State<'_, AppState>,
    query: String,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<Vec<Routine>, String> {
    search_routines_impl(state.inner(), query, page, page_size)
        .await
        .map_err(|error| state.command_error("search_routines", &error))
}

#[tauri::command]
async fn create_routine(
    state: tauri::State<'_, AppState>,
    name: String,
    code: String,
) -> Result<i32, String> {
    create_routine_impl(state.inner(), name, code)
        .await
        .map_err(|error| state.command_error("create_routine", &error))
}

#[tauri::command]
async fn update_routine(
    state: tauri::State<'_, AppState>,
    id: i32,
    name: String,
    code: String,
) -> Result<(), String> {
    update_routine_impl(state.inner(), id, name, code)
        .await
        .map_err(|error| state.command_error("update_routine", &error))
}

#[tauri::command]
async fn delete_routine(state: tauri::State<'_, AppState>, id: i32) -> Result<(), String> {
    delete_routine_impl(state.inner(), id)
        .await
        .map_err(|error| state.command_error("delete_routine", &error))
}

#[tauri::command]
async fn add_routine_exercise(
    state: tauri::State<'_, AppState>,
    routine_exercise: RoutineExercise,
) -> Result<RoutineManagerView, String> {
    add_routine_exercise_impl(state.inner(), routine_exercise)
        .await
        .map_err(|error| state.command_error("add_routine_exercise", &error))
}

#[tauri::command]
async fn update_routine_exercise(
    state: tauri::State<'_, AppState>,
    routine_exercise: RoutineExercise,
) -> Result<RoutineManagerView, String> {
    update_routine_exercise_impl(state.inner(), routine_exercise)
        .await
        .map_err(|error| state.command_error("update_routine_exercise", &error))
}

#[tauri::command]
async fn remove_routine_exercise(
    state: tauri::State<'_, AppState>,
    routine_id: i32,
    exercise_id: i32,
) -> Result<RoutineManagerView, String> {
    remove_routine_exercise_impl(state.inner(), routine_id, exercise_id)
        .await
        .map_err(|error| state.command_error("remove_routine_exercise", &error))
}

pub fn run() {
    let workspace_root = std::env::current_dir().expect("failed to resolve current directory");
    let bridge = Arc::new(InMemoryBridge::new());
    let app_state = AppState::new(workspace_root, bridge).expect("failed to initialize app state");

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            ping,
            bootstrap,
            dashboard_view,
            select_person,
            navigate_weeks,
            refresh_dashboard,
            day_click,
            day_context,
            update_entry_form,
            update_session_form,
            close_modal,
            save_entry,
            save_session,
            request_delete_entry,
            open_load_routine,
            update_load_routine,
            request_apply_routine,
            resolve_confirm,
            load_routine_into_session,
            create_day_group,
            remove_day_group,
            begin_drag,
            evaluate_drag,
            complete_drag,
            open_routine_manager,
            close_routine_manager,
            routine_manager_view,
            create_routine_group,
            remove_routine_group,
            routine_begin_drag,
            routine_evaluate_drag,
            routine_complete_drag,
            drain_toasts,
            get_settings,
            update_settings,
            list_people,
            search_people,
            create_person,
            update_person,
            delete_person,
            list_exercises,
            search_exercises,
            create_exercise,
            update_exercise,
            delete_exercise,
            list_routines,
            search_routines,
            create_routine,
            update_routine,
            delete_routine,
            add_routine_exercise,
            update_routine_exercise,
            remove_routine_exercise
        ])
        .run(tauri::generate_context!())
        .expect("failed to run tauri app");
}
