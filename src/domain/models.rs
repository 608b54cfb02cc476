use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: Option<i32>,
    pub name: String,
    pub last_name: String,
    pub phone: String,
}

impl Person {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "person.name")?;
        validate_non_empty(&self.last_name, "person.last_name")?;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: Option<i32>,
    pub name: String,
    pub code: String,
}

impl Exercise {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "exercise.name")?;
        validate_non_empty(&self.code, "exercise.code")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routine {
    pub id: Option<i32>,
    pub name: String,
    pub code: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Routine {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "routine.name")?;
        validate_non_empty(&self.code, "routine.code")?;
        Ok(())
    }
}

/// An exercise slot inside a routine. `group_number` buckets slots that are
/// performed together; `order_index` orders slots inside the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineExercise {
    pub id: Option<i32>,
    pub routine_id: i32,
    pub exercise_id: i32,
    pub order_index: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub group_number: i32,
}

impl RoutineExercise {
    pub fn validate(&self) -> Result<(), String> {
        if self.routine_id <= 0 {
            return Err("routine_exercise.routine_id must be > 0".to_string());
        }
        if self.exercise_id <= 0 {
            return Err("routine_exercise.exercise_id must be > 0".to_string());
        }
        validate_ordering(self.group_number, self.order_index, "routine_exercise")?;
        validate_effort(self.sets, self.reps, self.weight, "routine_exercise")?;
        Ok(())
    }
}

/// Routine exercise as returned by the backend, joined with display fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineExerciseWithDetails {
    pub id: i32,
    pub routine_id: i32,
    pub exercise_id: i32,
    pub order_index: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub group_number: i32,
    pub exercise_name: String,
    pub exercise_code: String,
}

impl RoutineExerciseWithDetails {
    pub fn to_routine_exercise(&self) -> RoutineExercise {
        RoutineExercise {
            id: Some(self.id),
            routine_id: self.routine_id,
            exercise_id: self.exercise_id,
            order_index: self.order_index,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            notes: self.notes.clone(),
            group_number: self.group_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineWithExercises {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub exercises: Vec<RoutineExerciseWithDetails>,
}

/// One scheduled exercise on a person's calendar. Entries sharing a date and
/// `group_number` render as one visual block on the day cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub id: Option<i32>,
    pub person_id: i32,
    pub exercise_id: i32,
    pub date: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub group_number: i32,
    pub order_index: i32,
}

impl WorkoutEntry {
    pub fn validate(&self) -> Result<(), String> {
        if self.person_id <= 0 {
            return Err("workout_entry.person_id must be > 0".to_string());
        }
        if self.exercise_id <= 0 {
            return Err("workout_entry.exercise_id must be > 0".to_string());
        }
        validate_date(&self.date, "workout_entry.date")?;
        validate_ordering(self.group_number, self.order_index, "workout_entry")?;
        validate_effort(self.sets, self.reps, self.weight, "workout_entry")?;
        Ok(())
    }
}

/// Workout entry as returned by the backend, joined with display fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntryWithDetails {
    pub id: i32,
    pub person_id: i32,
    pub exercise_id: i32,
    pub date: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub group_number: i32,
    pub order_index: i32,
    pub person_name: String,
    pub person_last_name: String,
    pub exercise_name: String,
    pub exercise_code: String,
}

impl WorkoutEntryWithDetails {
    /// Persistable projection, used when a calendar interaction mutates
    /// group/order/date and the full row must be sent back.
    pub fn to_entry(&self) -> WorkoutEntry {
        WorkoutEntry {
            id: Some(self.id),
            person_id: self.person_id,
            exercise_id: self.exercise_id,
            date: self.date.clone(),
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            notes: self.notes.clone(),
            group_number: self.group_number,
            order_index: self.order_index,
        }
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

fn validate_ordering(group_number: i32, order_index: i32, prefix: &str) -> Result<(), String> {
    if group_number < 1 {
        return Err(format!("{prefix}.group_number must be >= 1"));
    }
    if order_index < 0 {
        return Err(format!("{prefix}.order_index must be >= 0"));
    }
    Ok(())
}

fn validate_effort(
    sets: Option<i32>,
    reps: Option<i32>,
    weight: Option<f64>,
    prefix: &str,
) -> Result<(), String> {
    if let Some(sets) = sets {
        if sets <= 0 {
            return Err(format!("{prefix}.sets must be > 0"));
        }
    }
    if let Some(reps) = reps {
        if reps <= 0 {
            return Err(format!("{prefix}.reps must be > 0"));
        }
    }
    if let Some(weight) = weight {
        if weight < 0.0 {
            return Err(format!("{prefix}.weight must be >= 0"));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn sample_person() -> Person {
        Person {
            id: Some(7),
            name: "Lucía".to_string(),
            last_name: "Moreno".to_string(),
            phone: "555-0134".to_string(),
        }
    }

    pub fn entry_with_details(
        id: i32,
        date: &str,
        group_number: i32,
        order_index: i32,
    ) -> WorkoutEntryWithDetails {
        WorkoutEntryWithDetails {
            id,
            person_id: 7,
            exercise_id: 100 + id,
            date: date.to_string(),
            sets: Some(3),
            reps: Some(10),
            weight: Some(40.0),
            notes: None,
            group_number,
            order_index,
            person_name: "Lucía".to_string(),
            person_last_name: "Moreno".to_string(),
            exercise_name: format!("Exercise {id}"),
            exercise_code: format!("EX{id}"),
        }
    }

    pub fn routine_exercise_with_details(
        id: i32,
        group_number: i32,
        order_index: i32,
    ) -> RoutineExerciseWithDetails {
        RoutineExerciseWithDetails {
            id,
            routine_id: 3,
            exercise_id: 200 + id,
            order_index,
            sets: Some(4),
            reps: Some(8),
            weight: None,
            notes: None,
            group_number,
            exercise_name: format!("Exercise {id}"),
            exercise_code: format!("EX{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_person;
    use super::*;

    fn sample_entry() -> WorkoutEntry {
        WorkoutEntry {
            id: None,
            person_id: 7,
            exercise_id: 42,
            date: "2026-03-02".to_string(),
            sets: Some(3),
            reps: Some(12),
            weight: Some(55.5),
            notes: Some("tempo 3-1-1".to_string()),
            group_number: 1,
            order_index: 0,
        }
    }

    #[test]
    fn person_validate_rejects_blank_last_name() {
        let mut person = sample_person();
        person.last_name = "   ".to_string();
        assert!(person.validate().is_err());
        assert!(sample_person().validate().is_ok());
    }

    #[test]
    fn workout_entry_validate_accepts_valid_entry() {
        assert!(sample_entry().validate().is_ok());
    }

    #[test]
    fn workout_entry_validate_rejects_bad_date() {
        let mut entry = sample_entry();
        entry.date = "02/03/2026".to_string();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn workout_entry_validate_rejects_group_zero() {
        let mut entry = sample_entry();
        entry.group_number = 0;
        assert!(entry.validate().is_err());
    }

    #[test]
    fn workout_entry_validate_rejects_non_positive_sets() {
        let mut entry = sample_entry();
        entry.sets = Some(0);
        assert!(entry.validate().is_err());
        entry.sets = None;
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn routine_exercise_validate_checks_ids() {
        let slot = RoutineExercise {
            id: None,
            routine_id: 0,
            exercise_id: 9,
            order_index: 0,
            sets: None,
            reps: None,
            weight: None,
            notes: None,
            group_number: 1,
        };
        assert!(slot.validate().is_err());
    }

    #[test]
    fn with_details_projects_back_to_entry() {
        let detailed = super::test_support::entry_with_details(11, "2026-03-02", 2, 1);
        let entry = detailed.to_entry();
        assert_eq!(entry.id, Some(11));
        assert_eq!(entry.group_number, 2);
        assert_eq!(entry.order_index, 1);
        assert_eq!(entry.date, "2026-03-02");
    }

    #[test]
    fn models_support_serde_roundtrip() {
        let person = sample_person();
        let entry = sample_entry();
        let person_roundtrip: Person =
            serde_json::from_str(&serde_json::to_string(&person).expect("serialize person"))
                .expect("deserialize person");
        let entry_roundtrip: WorkoutEntry =
            serde_json::from_str(&serde_json::to_string(&entry).expect("serialize entry"))
                .expect("deserialize entry");
        assert_eq!(person_roundtrip, person);
        assert_eq!(entry_roundtrip, entry);
    }
}
