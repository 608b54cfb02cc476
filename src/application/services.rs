//! Typed wrappers over the command bridge.
//!
//! One wrapper per backend surface, mirroring the command names the backend
//! exposes. Wrappers only encode arguments and decode results; they add no
//! behavior of their own.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::domain::models::{
    Exercise, Person, Routine, RoutineExercise, RoutineExerciseWithDetails, RoutineWithExercises,
    WorkoutEntry, WorkoutEntryWithDetails,
};
use crate::infrastructure::bridge::CommandBridge;
use crate::infrastructure::error::AppError;

mod commands {
    pub const GET_PERSONS_PAGINATED: &str = "get_persons_paginated";
    pub const SEARCH_PERSONS_PAGINATED: &str = "search_persons_paginated";
    pub const CREATE_PERSON: &str = "create_person";
    pub const UPDATE_PERSON: &str = "update_person";
    pub const DELETE_PERSON: &str = "delete_person";

    pub const GET_EXERCISES_PAGINATED: &str = "get_exercises_paginated";
    pub const SEARCH_EXERCISES_PAGINATED: &str = "search_exercises_paginated";
    pub const CREATE_EXERCISE: &str = "create_exercise";
    pub const UPDATE_EXERCISE: &str = "update_exercise";
    pub const DELETE_EXERCISE: &str = "delete_exercise";

    pub const LIST_ROUTINES_PAGINATED: &str = "list_routines_paginated";
    pub const SEARCH_ROUTINES_PAGINATED: &str = "search_routines_paginated";
    pub const CREATE_ROUTINE: &str = "create_routine";
    pub const UPDATE_ROUTINE: &str = "update_routine";
    pub const DELETE_ROUTINE: &str = "delete_routine";
    pub const GET_ROUTINE_WITH_EXERCISES: &str = "get_routine_with_exercises";
    pub const GET_ROUTINE_EXERCISES: &str = "get_routine_exercises";
    pub const ADD_EXERCISE_TO_ROUTINE: &str = "add_exercise_to_routine";
    pub const UPDATE_ROUTINE_EXERCISE: &str = "update_routine_exercise";
    pub const REMOVE_EXERCISE_FROM_ROUTINE: &str = "remove_exercise_from_routine";
    pub const REORDER_ROUTINE_EXERCISES: &str = "reorder_routine_exercises";

    pub const CREATE_WORKOUT_ENTRY: &str = "create_workout_entry";
    pub const UPDATE_WORKOUT_ENTRY: &str = "update_workout_entry";
    pub const DELETE_WORKOUT_ENTRY: &str = "delete_workout_entry";
    pub const GET_WORKOUT_ENTRIES_BY_PERSON_AND_DATE_RANGE: &str =
        "get_workout_entries_by_person_and_date_range";
    pub const UPDATE_EXERCISE_ORDER: &str = "update_exercise_order";
}

async fn call<T: DeserializeOwned>(
    bridge: &dyn CommandBridge,
    command: &str,
    args: Value,
) -> Result<T, AppError> {
    let value = bridge
        .invoke(command, args)
        .await
        .map_err(AppError::Backend)?;
    Ok(serde_json::from_value(value)?)
}

async fn call_unit(
    bridge: &dyn CommandBridge,
    command: &str,
    args: Value,
) -> Result<(), AppError> {
    bridge
        .invoke(command, args)
        .await
        .map_err(AppError::Backend)?;
    Ok(())
}

#[derive(Clone)]
pub struct PersonService {
    bridge: Arc<dyn CommandBridge>,
}

impl PersonService {
    pub fn new(bridge: Arc<dyn CommandBridge>) -> Self {
        Self { bridge }
    }

    pub async fn list_paginated(&self, page: u32, page_size: u32) -> Result<Vec<Person>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::GET_PERSONS_PAGINATED,
            json!({"page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn search_paginated(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Person>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::SEARCH_PERSONS_PAGINATED,
            json!({"query": query, "page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn create(&self, person: &Person) -> Result<Person, AppError> {
        call(
            self.bridge.as_ref(),
            commands::CREATE_PERSON,
            json!({"person": person}),
        )
        .await
    }

    pub async fn update(&self, person: &Person) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_PERSON,
            json!({"person": person}),
        )
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        call_unit(self.bridge.as_ref(), commands::DELETE_PERSON, json!({"id": id})).await
    }
}

#[derive(Clone)]
pub struct ExerciseService {
    bridge: Arc<dyn CommandBridge>,
}

impl ExerciseService {
    pub fn new(bridge: Arc<dyn CommandBridge>) -> Self {
        Self { bridge }
    }

    pub async fn list_paginated(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Exercise>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::GET_EXERCISES_PAGINATED,
            json!({"page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn search_paginated(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Exercise>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::SEARCH_EXERCISES_PAGINATED,
            json!({"query": query, "page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn create(&self, exercise: &Exercise) -> Result<Exercise, AppError> {
        call(
            self.bridge.as_ref(),
            commands::CREATE_EXERCISE,
            json!({"exercise": exercise}),
        )
        .await
    }

    pub async fn update(&self, exercise: &Exercise) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_EXERCISE,
            json!({"exercise": exercise}),
        )
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        call_unit(self.bridge.as_ref(), commands::DELETE_EXERCISE, json!({"id": id})).await
    }
}

#[derive(Clone)]
pub struct RoutineService {
    bridge: Arc<dyn CommandBridge>,
}

impl RoutineService {
    pub fn new(bridge: Arc<dyn CommandBridge>) -> Self {
        Self { bridge }
    }

    pub async fn list_paginated(&self, page: u32, page_size: u32) -> Result<Vec<Routine>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::LIST_ROUTINES_PAGINATED,
            json!({"page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn search_paginated(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Routine>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::SEARCH_ROUTINES_PAGINATED,
            json!({"query": query, "page": page, "pageSize": page_size}),
        )
        .await
    }

    pub async fn create(&self, name: &str, code: &str) -> Result<i32, AppError> {
        call(
            self.bridge.as_ref(),
            commands::CREATE_ROUTINE,
            json!({"name": name, "code": code}),
        )
        .await
    }

    pub async fn update(&self, id: i32, name: &str, code: &str) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_ROUTINE,
            json!({"id": id, "name": name, "code": code}),
        )
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        call_unit(self.bridge.as_ref(), commands::DELETE_ROUTINE, json!({"id": id})).await
    }

    pub async fn with_exercises(&self, id: i32) -> Result<Option<RoutineWithExercises>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::GET_ROUTINE_WITH_EXERCISES,
            json!({"id": id}),
        )
        .await
    }

    pub async fn exercises(
        &self,
        routine_id: i32,
    ) -> Result<Vec<RoutineExerciseWithDetails>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::GET_ROUTINE_EXERCISES,
            json!({"routineId": routine_id}),
        )
        .await
    }

    pub async fn add_exercise(&self, slot: &RoutineExercise) -> Result<RoutineExercise, AppError> {
        call(
            self.bridge.as_ref(),
            commands::ADD_EXERCISE_TO_ROUTINE,
            json!({"routineExercise": slot}),
        )
        .await
    }

    pub async fn update_exercise(&self, slot: &RoutineExercise) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_ROUTINE_EXERCISE,
            json!({"routineExercise": slot}),
        )
        .await
    }

    pub async fn remove_exercise(&self, routine_id: i32, exercise_id: i32) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::REMOVE_EXERCISE_FROM_ROUTINE,
            json!({"routineId": routine_id, "exerciseId": exercise_id}),
        )
        .await
    }

    pub async fn reorder(
        &self,
        routine_id: i32,
        exercise_orders: &[(i32, i32)],
    ) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::REORDER_ROUTINE_EXERCISES,
            json!({"routineId": routine_id, "exerciseOrders": exercise_orders}),
        )
        .await
    }
}

#[derive(Clone)]
pub struct WorkoutService {
    bridge: Arc<dyn CommandBridge>,
}

impl WorkoutService {
    pub fn new(bridge: Arc<dyn CommandBridge>) -> Self {
        Self { bridge }
    }

    pub async fn create_entry(&self, entry: &WorkoutEntry) -> Result<WorkoutEntry, AppError> {
        call(
            self.bridge.as_ref(),
            commands::CREATE_WORKOUT_ENTRY,
            json!({"workoutEntry": entry}),
        )
        .await
    }

    pub async fn update_entry(&self, entry: &WorkoutEntry) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_WORKOUT_ENTRY,
            json!({"workoutEntry": entry}),
        )
        .await
    }

    pub async fn delete_entry(&self, id: i32) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::DELETE_WORKOUT_ENTRY,
            json!({"id": id}),
        )
        .await
    }

    pub async fn by_person_and_range(
        &self,
        person_id: i32,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<WorkoutEntryWithDetails>, AppError> {
        call(
            self.bridge.as_ref(),
            commands::GET_WORKOUT_ENTRIES_BY_PERSON_AND_DATE_RANGE,
            json!({"personId": person_id, "startDate": start_date, "endDate": end_date}),
        )
        .await
    }

    pub async fn update_order(&self, exercise_orders: &[(i32, i32)]) -> Result<(), AppError> {
        call_unit(
            self.bridge.as_ref(),
            commands::UPDATE_EXERCISE_ORDER,
            json!({"exerciseOrders": exercise_orders}),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bridge::InMemoryBridge;

    fn bridge() -> Arc<InMemoryBridge> {
        Arc::new(InMemoryBridge::new())
    }

    #[tokio::test]
    async fn person_service_roundtrip() {
        let bridge = bridge();
        let service = PersonService::new(bridge.clone());

        let created = service
            .create(&Person {
                id: None,
                name: "Marta".to_string(),
                last_name: "Gil".to_string(),
                phone: "555-2020".to_string(),
            })
            .await
            .expect("create");
        assert!(created.id.is_some());

        let listed = service.list_paginated(1, 10).await.expect("list");
        assert_eq!(listed.len(), 1);

        let found = service.search_paginated("gil", 1, 10).await.expect("search");
        assert_eq!(found.len(), 1);

        service
            .delete(created.id.expect("id"))
            .await
            .expect("delete");
        assert!(service.list_paginated(1, 10).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn backend_rejections_become_backend_errors() {
        let bridge = bridge();
        let service = RoutineService::new(bridge.clone());
        service.create("Empuje", "PUSH").await.expect("first");

        let error = service
            .create("Duplicada", "PUSH")
            .await
            .expect_err("duplicate code must fail");
        match error {
            AppError::Backend(message) => {
                assert!(message.contains("UNIQUE constraint failed"));
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn workout_service_emits_the_batched_reorder_command() {
        let bridge = bridge();
        let service = WorkoutService::new(bridge.clone());
        bridge.clear_recorded();

        service
            .update_order(&[(4, 0), (9, 1)])
            .await
            .expect("reorder");

        let recorded = bridge.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "update_exercise_order");
        assert_eq!(recorded[0].1["exerciseOrders"][1][0], 9);
    }
}
