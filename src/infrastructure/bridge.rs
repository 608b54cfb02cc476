//! Generic command bridge to the persistence backend.
//!
//! The backend is an external collaborator that accepts named commands with
//! JSON argument objects and answers with JSON values or an error string.
//! Nothing in this crate depends on how those commands are implemented; the
//! in-memory bridge below exists so the application can run and be tested
//! without the real backend, and records every invocation so tests can
//! assert exactly which persistence calls a flow emitted.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;

use crate::domain::models::{
    Exercise, Person, Routine, RoutineExercise, RoutineExerciseWithDetails, RoutineWithExercises,
    WorkoutEntry, WorkoutEntryWithDetails,
};

#[async_trait]
pub trait CommandBridge: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, String>;
}

#[derive(Debug, Default)]
struct Tables {
    people: Vec<Person>,
    exercises: Vec<Exercise>,
    routines: Vec<Routine>,
    routine_slots: Vec<RoutineExercise>,
    entries: Vec<WorkoutEntry>,
    next_id: i32,
}

impl Tables {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBridge {
    tables: Mutex<Tables>,
    invocations: Mutex<Vec<(String, Value)>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageArgs {
    page: u32,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    page: u32,
    page_size: u32,
}

#[derive(Deserialize)]
struct IdArgs {
    id: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeArgs {
    person_id: i32,
    start_date: String,
    end_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderArgs {
    exercise_orders: Vec<(i32, i32)>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutineOrderArgs {
    routine_id: i32,
    exercise_orders: Vec<(i32, i32)>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutineMemberArgs {
    routine_id: i32,
    exercise_id: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutineUpsertArgs {
    name: String,
    code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutineUpdateArgs {
    id: i32,
    name: String,
    code: String,
}

impl InMemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(command, args)` pair invoked so far, oldest first.
    pub fn recorded(&self) -> Vec<(String, Value)> {
        self.invocations
            .lock()
            .map(|invocations| invocations.clone())
            .unwrap_or_default()
    }

    pub fn clear_recorded(&self) {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.clear();
        }
    }

    fn dispatch(&self, command: &str, args: Value) -> Result<Value, String> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|error| format!("backend state poisoned: {error}"))?;

        match command {
            "get_persons_paginated" => {
                let args: PageArgs = decode(args)?;
                let people = paginate(&tables.people, args.page, args.page_size);
                encode(&people)
            }
            "search_persons_paginated" => {
                let args: SearchArgs = decode(args)?;
                let needle = args.query.to_lowercase();
                let matches: Vec<&Person> = tables
                    .people
                    .iter()
                    .filter(|person| {
                        person.name.to_lowercase().contains(&needle)
                            || person.last_name.to_lowercase().contains(&needle)
                    })
                    .collect();
                encode(&paginate(&matches, args.page, args.page_size))
            }
            "create_person" => {
                let mut person: Person = decode_field(args, "person")?;
                person.id = Some(tables.allocate_id());
                let created = person.clone();
                tables.people.push(person);
                encode(&created)
            }
            "update_person" => {
                let person: Person = decode_field(args, "person")?;
                let id = person.id.ok_or("person.id is required")?;
                let slot = tables
                    .people
                    .iter_mut()
                    .find(|candidate| candidate.id == Some(id))
                    .ok_or(format!("person not found: {id}"))?;
                *slot = person;
                Ok(Value::Null)
            }
            "delete_person" => {
                let args: IdArgs = decode(args)?;
                tables.people.retain(|person| person.id != Some(args.id));
                tables.entries.retain(|entry| entry.person_id != args.id);
                Ok(Value::Null)
            }

            "get_exercises_paginated" => {
                let args: PageArgs = decode(args)?;
                encode(&paginate(&tables.exercises, args.page, args.page_size))
            }
            "search_exercises_paginated" => {
                let args: SearchArgs = decode(args)?;
                let needle = args.query.to_lowercase();
                let matches: Vec<&Exercise> = tables
                    .exercises
                    .iter()
                    .filter(|exercise| {
                        exercise.name.to_lowercase().contains(&needle)
                            || exercise.code.to_lowercase().contains(&needle)
                    })
                    .collect();
                encode(&paginate(&matches, args.page, args.page_size))
            }
            "create_exercise" => {
                let mut exercise: Exercise = decode_field(args, "exercise")?;
                exercise.id = Some(tables.allocate_id());
                let created = exercise.clone();
                tables.exercises.push(exercise);
                encode(&created)
            }
            "update_exercise" => {
                let exercise: Exercise = decode_field(args, "exercise")?;
                let id = exercise.id.ok_or("exercise.id is required")?;
                let slot = tables
                    .exercises
                    .iter_mut()
                    .find(|candidate| candidate.id == Some(id))
                    .ok_or(format!("exercise not found: {id}"))?;
                *slot = exercise;
                Ok(Value::Null)
            }
            "delete_exercise" => {
                let args: IdArgs = decode(args)?;
                tables
                    .exercises
                    .retain(|exercise| exercise.id != Some(args.id));
                Ok(Value::Null)
            }

            "list_routines_paginated" => {
                let args: PageArgs = decode(args)?;
                encode(&paginate(&tables.routines, args.page, args.page_size))
            }
            "search_routines_paginated" => {
                let args: SearchArgs = decode(args)?;
                let needle = args.query.to_lowercase();
                let matches: Vec<&Routine> = tables
                    .routines
                    .iter()
                    .filter(|routine| {
                        routine.name.to_lowercase().contains(&needle)
                            || routine.code.to_lowercase().contains(&needle)
                    })
                    .collect();
                encode(&paginate(&matches, args.page, args.page_size))
            }
            "create_routine" => {
                let args: RoutineUpsertArgs = decode(args)?;
                if tables.routines.iter().any(|routine| routine.code == args.code) {
                    return Err("UNIQUE constraint failed: routines.code".to_string());
                }
                let id = tables.allocate_id();
                tables.routines.push(Routine {
                    id: Some(id),
                    name: args.name,
                    code: args.code,
                    created_at: None,
                    updated_at: None,
                });
                encode(&id)
            }
            "update_routine" => {
                let args: RoutineUpdateArgs = decode(args)?;
                let routine = tables
                    .routines
                    .iter_mut()
                    .find(|candidate| candidate.id == Some(args.id))
                    .ok_or(format!("routine not found: {}", args.id))?;
                routine.name = args.name;
                routine.code = args.code;
                Ok(Value::Null)
            }
            "delete_routine" => {
                let args: IdArgs = decode(args)?;
                tables.routines.retain(|routine| routine.id != Some(args.id));
                tables.routine_slots.retain(|slot| slot.routine_id != args.id);
                Ok(Value::Null)
            }
            "get_routine_with_exercises" => {
                let args: IdArgs = decode(args)?;
                let Some(routine) = tables
                    .routines
                    .iter()
                    .find(|candidate| candidate.id == Some(args.id))
                else {
                    return Ok(Value::Null);
                };
                let detailed = RoutineWithExercises {
                    id: args.id,
                    name: routine.name.clone(),
                    code: routine.code.clone(),
                    exercises: routine_details(&tables, args.id)?,
                };
                encode(&detailed)
            }
            "get_routine_exercises" => {
                let routine_id = args
                    .get("routineId")
                    .and_then(Value::as_i64)
                    .ok_or("routineId is required")? as i32;
                encode(&routine_details(&tables, routine_id)?)
            }
            "add_exercise_to_routine" => {
                let mut slot: RoutineExercise = decode_field(args, "routineExercise")?;
                if tables.routine_slots.iter().any(|existing| {
                    existing.routine_id == slot.routine_id
                        && existing.exercise_id == slot.exercise_id
                }) {
                    return Err("exercise already in routine".to_string());
                }
                validate_group_sequence(&tables, slot.routine_id, slot.group_number, None)?;
                slot.id = Some(tables.allocate_id());
                let created = slot.clone();
                tables.routine_slots.push(slot);
                encode(&created)
            }
            "update_routine_exercise" => {
                let slot: RoutineExercise = decode_field(args, "routineExercise")?;
                let id = slot.id.ok_or("routine_exercise.id is required")?;
                validate_group_sequence(&tables, slot.routine_id, slot.group_number, Some(id))?;
                let stored = tables
                    .routine_slots
                    .iter_mut()
                    .find(|candidate| candidate.id == Some(id))
                    .ok_or(format!("routine exercise not found: {id}"))?;
                *stored = slot;
                Ok(Value::Null)
            }
            "remove_exercise_from_routine" => {
                let args: RoutineMemberArgs = decode(args)?;
                tables.routine_slots.retain(|slot| {
                    !(slot.routine_id == args.routine_id && slot.exercise_id == args.exercise_id)
                });
                Ok(Value::Null)
            }
            "reorder_routine_exercises" => {
                let args: RoutineOrderArgs = decode(args)?;
                for (id, order) in args.exercise_orders {
                    if let Some(slot) = tables
                        .routine_slots
                        .iter_mut()
                        .find(|candidate| {
                            candidate.id == Some(id) && candidate.routine_id == args.routine_id
                        })
                    {
                        slot.order_index = order;
                    }
                }
                Ok(Value::Null)
            }

            "create_workout_entry" => {
                let mut entry: WorkoutEntry = decode_field(args, "workoutEntry")?;
                entry.id = Some(tables.allocate_id());
                let created = entry.clone();
                tables.entries.push(entry);
                encode(&created)
            }
            "update_workout_entry" => {
                let entry: WorkoutEntry = decode_field(args, "workoutEntry")?;
                let id = entry.id.ok_or("workout_entry.id is required")?;
                let stored = tables
                    .entries
                    .iter_mut()
                    .find(|candidate| candidate.id == Some(id))
                    .ok_or(format!("workout entry not found: {id}"))?;
                *stored = entry;
                Ok(Value::Null)
            }
            "delete_workout_entry" => {
                let args: IdArgs = decode(args)?;
                tables.entries.retain(|entry| entry.id != Some(args.id));
                Ok(Value::Null)
            }
            "get_workout_entries_by_person_and_date_range" => {
                let args: RangeArgs = decode(args)?;
                let mut detailed: Vec<WorkoutEntryWithDetails> = tables
                    .entries
                    .iter()
                    .filter(|entry| {
                        entry.person_id == args.person_id
                            && entry.date.as_str() >= args.start_date.as_str()
                            && entry.date.as_str() <= args.end_date.as_str()
                    })
                    .map(|entry| entry_details(&tables, entry))
                    .collect::<Result<_, String>>()?;
                detailed.sort_by(|left, right| {
                    (left.date.as_str(), left.group_number, left.order_index).cmp(&(
                        right.date.as_str(),
                        right.group_number,
                        right.order_index,
                    ))
                });
                encode(&detailed)
            }
            "update_exercise_order" => {
                let args: OrderArgs = decode(args)?;
                for (id, order) in args.exercise_orders {
                    if let Some(entry) = tables
                        .entries
                        .iter_mut()
                        .find(|candidate| candidate.id == Some(id))
                    {
                        entry.order_index = order;
                    }
                }
                Ok(Value::Null)
            }

            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[async_trait]
impl CommandBridge for InMemoryBridge {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, String> {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push((command.to_string(), args.clone()));
        }
        self.dispatch(command, args)
    }
}

fn decode<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|error| format!("invalid arguments: {error}"))
}

fn decode_field<T: serde::de::DeserializeOwned>(args: Value, field: &str) -> Result<T, String> {
    let value = args
        .get(field)
        .cloned()
        .ok_or(format!("{field} is required"))?;
    decode(value)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|error| format!("encode failure: {error}"))
}

fn paginate<T: Clone>(rows: &[T], page: u32, page_size: u32) -> Vec<T> {
    let page = page.max(1) as usize;
    let page_size = page_size.max(1) as usize;
    rows.iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect()
}

/// Numbered groups must stay consecutive from 1; the backend rejects a slot
/// that would open a hole, with a message shown to the user verbatim.
fn validate_group_sequence(
    tables: &Tables,
    routine_id: i32,
    group_number: i32,
    ignore_slot: Option<i32>,
) -> Result<(), String> {
    let highest = tables
        .routine_slots
        .iter()
        .filter(|slot| slot.routine_id == routine_id)
        .filter(|slot| ignore_slot.is_none_or(|ignored| slot.id != Some(ignored)))
        .map(|slot| slot.group_number)
        .max()
        .unwrap_or(0);
    if group_number > highest + 1 {
        return Err(format!(
            "⚠️ No puedes saltar grupos: el grupo {} no es consecutivo",
            group_number
        ));
    }
    Ok(())
}

fn routine_details(
    tables: &Tables,
    routine_id: i32,
) -> Result<Vec<RoutineExerciseWithDetails>, String> {
    let mut detailed: Vec<RoutineExerciseWithDetails> = tables
        .routine_slots
        .iter()
        .filter(|slot| slot.routine_id == routine_id)
        .map(|slot| {
            let exercise = tables
                .exercises
                .iter()
                .find(|candidate| candidate.id == Some(slot.exercise_id))
                .ok_or(format!("exercise not found: {}", slot.exercise_id))?;
            Ok(RoutineExerciseWithDetails {
                id: slot.id.ok_or("routine exercise without id")?,
                routine_id: slot.routine_id,
                exercise_id: slot.exercise_id,
                order_index: slot.order_index,
                sets: slot.sets,
                reps: slot.reps,
                weight: slot.weight,
                notes: slot.notes.clone(),
                group_number: slot.group_number,
                exercise_name: exercise.name.clone(),
                exercise_code: exercise.code.clone(),
            })
        })
        .collect::<Result<_, String>>()?;
    detailed.sort_by_key(|slot| (slot.group_number, slot.order_index));
    Ok(detailed)
}

fn entry_details(
    tables: &Tables,
    entry: &WorkoutEntry,
) -> Result<WorkoutEntryWithDetails, String> {
    let person = tables
        .people
        .iter()
        .find(|candidate| candidate.id == Some(entry.person_id))
        .ok_or(format!("person not found: {}", entry.person_id))?;
    let exercise = tables
        .exercises
        .iter()
        .find(|candidate| candidate.id == Some(entry.exercise_id))
        .ok_or(format!("exercise not found: {}", entry.exercise_id))?;
    Ok(WorkoutEntryWithDetails {
        id: entry.id.ok_or("workout entry without id")?,
        person_id: entry.person_id,
        exercise_id: entry.exercise_id,
        date: entry.date.clone(),
        sets: entry.sets,
        reps: entry.reps,
        weight: entry.weight,
        notes: entry.notes.clone(),
        group_number: entry.group_number,
        order_index: entry.order_index,
        person_name: person.name.clone(),
        person_last_name: person.last_name.clone(),
        exercise_name: exercise.name.clone(),
        exercise_code: exercise.code.clone(),
    })
}
