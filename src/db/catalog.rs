//! Exercise catalog storage and filtered lookup

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

use super::Database;
use crate::exercises::{
    DEFAULT_CATALOG, Difficulty, ExerciseQuery, ExerciseRecord, MuscleMatch, NewExercise, fold_case,
};
use crate::planner::ExerciseCatalog;

const EXERCISE_COLUMNS: &str = "id, name, category, primary_muscle, secondary_muscle, difficulty, equipment, \
                                base_sets, base_reps, base_duration";

/// Catalog order: difficulty rank first, then id
const DIFFICULTY_ORDER: &str =
    "CASE difficulty WHEN 'Beginner' THEN 0 WHEN 'Intermediate' THEN 1 ELSE 2 END, id";

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseRecord> {
    let difficulty: String = row.get(5)?;
    Ok(ExerciseRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        primary_muscle: row.get(3)?,
        secondary_muscle: row.get(4)?,
        difficulty: Difficulty::parse(&difficulty).unwrap_or(Difficulty::Advanced),
        equipment: row.get(6)?,
        base_sets: row.get(7)?,
        base_reps: row.get(8)?,
        base_duration: row.get(9)?,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

impl Database {
    /// Add an exercise to the catalog, returns its id
    pub fn add_exercise(&self, exercise: &NewExercise) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercises (name, category, primary_muscle, secondary_muscle, difficulty, equipment,
                                    base_sets, base_reps, base_duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                exercise.name,
                exercise.category,
                exercise.primary_muscle,
                exercise.secondary_muscle,
                exercise.difficulty.as_str(),
                exercise.equipment,
                exercise.base_sets,
                exercise.base_reps,
                exercise.base_duration,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_exercise(&self, id: i64) -> Result<Option<ExerciseRecord>> {
        let exercise = self
            .conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                params![id],
                exercise_from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Whole catalog in difficulty order
    pub fn list_exercises(&self) -> Result<Vec<ExerciseRecord>> {
        self.query_exercises(&ExerciseQuery::default())
    }

    /// Insert the built-in catalog when the table is empty, returns rows added
    pub fn seed_default_catalog(&self) -> Result<usize> {
        let existing: i64 = self.conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if existing > 0 {
            debug!(existing, "catalog already populated, skipping seed");
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        for entry in DEFAULT_CATALOG {
            self.add_exercise(&entry.to_new_exercise())?;
        }
        tx.commit()?;

        info!(count = DEFAULT_CATALOG.len(), "seeded default exercise catalog");
        Ok(DEFAULT_CATALOG.len())
    }
}

impl ExerciseCatalog for Database {
    fn query_exercises(&self, query: &ExerciseQuery) -> Result<Vec<ExerciseRecord>> {
        let mut sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1 = 1");
        let mut values: Vec<Value> = Vec::new();

        match &query.muscle {
            Some(MuscleMatch::Primary(muscle)) => {
                sql.push_str(" AND primary_muscle = ?");
                values.push(Value::Text(muscle.clone()));
            }
            Some(MuscleMatch::PrimaryOrSecondary(muscle)) => {
                sql.push_str(" AND (primary_muscle = ? OR secondary_muscle = ?)");
                values.push(Value::Text(muscle.clone()));
                values.push(Value::Text(muscle.clone()));
            }
            None => {}
        }

        if !query.name_in.is_empty() {
            sql.push_str(&format!(" AND name IN ({})", placeholders(query.name_in.len())));
            values.extend(query.name_in.iter().map(|n| Value::Text(n.clone())));
        }
        if !query.name_not_in.is_empty() {
            sql.push_str(&format!(" AND fold_case(name) NOT IN ({})", placeholders(query.name_not_in.len())));
            values.extend(query.name_not_in.iter().map(|n| Value::Text(fold_case(n))));
        }
        if !query.difficulty_in.is_empty() {
            sql.push_str(&format!(" AND difficulty IN ({})", placeholders(query.difficulty_in.len())));
            values.extend(query.difficulty_in.iter().map(|d| Value::Text(d.as_str().to_string())));
        }
        if !query.equipment_not_in.is_empty() {
            sql.push_str(&format!(
                " AND (equipment IS NULL OR fold_case(equipment) NOT IN ({}))",
                placeholders(query.equipment_not_in.len())
            ));
            values.extend(query.equipment_not_in.iter().map(|e| Value::Text(fold_case(e))));
        }
        if !query.id_not_in.is_empty() {
            sql.push_str(&format!(" AND id NOT IN ({})", placeholders(query.id_not_in.len())));
            values.extend(query.id_not_in.iter().map(|id| Value::Integer(*id)));
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(DIFFICULTY_ORDER);
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let exercises = stmt
            .query_map(params_from_iter(values.iter()), exercise_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exercises)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn exercise(name: &str, primary: &str, secondary: Option<&str>, difficulty: Difficulty, equipment: Option<&str>) -> NewExercise {
        NewExercise {
            name: name.to_string(),
            category: "Strength".to_string(),
            primary_muscle: primary.to_string(),
            secondary_muscle: secondary.map(str::to_string),
            difficulty,
            equipment: equipment.map(str::to_string),
            base_sets: Some(3),
            base_reps: Some(10),
            base_duration: None,
        }
    }

    fn setup() -> Database {
        let db = Database::open(":memory:").unwrap();
        db.add_exercise(&exercise("Bench Press", "Chest", Some("Triceps"), Difficulty::Advanced, Some("Barbell")))
            .unwrap();
        db.add_exercise(&exercise("Push-ups", "Chest", Some("Triceps"), Difficulty::Beginner, None)).unwrap();
        db.add_exercise(&exercise("Incline Press", "Chest", Some("Shoulders"), Difficulty::Intermediate, Some("dumbbells")))
            .unwrap();
        db.add_exercise(&exercise("Dips", "Triceps", Some("Chest"), Difficulty::Beginner, Some("Bench")))
            .unwrap();
        db
    }

    fn names(exercises: &[ExerciseRecord]) -> Vec<&str> {
        exercises.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_add_and_get_exercise() {
        let db = setup();
        let bench = db.get_exercise(1).unwrap().unwrap();
        assert_eq!(bench.name, "Bench Press");
        assert_eq!(bench.difficulty, Difficulty::Advanced);
        assert_eq!(bench.secondary_muscle.as_deref(), Some("Triceps"));
        assert!(db.get_exercise(99).unwrap().is_none());
    }

    #[test]
    fn test_order_by_difficulty_rank_then_id() {
        let db = setup();
        let all = db.list_exercises().unwrap();
        assert_eq!(names(&all), vec!["Push-ups", "Dips", "Incline Press", "Bench Press"]);
    }

    #[test]
    fn test_primary_or_secondary_match() {
        let db = setup();
        let query = ExerciseQuery {
            muscle: Some(MuscleMatch::PrimaryOrSecondary("Triceps".to_string())),
            ..Default::default()
        };
        let found = db.query_exercises(&query).unwrap();
        assert_eq!(names(&found), vec!["Push-ups", "Dips", "Bench Press"]);
    }

    #[test]
    fn test_exclusions_case_insensitive_and_null_equipment_kept() {
        let db = setup();
        let query = ExerciseQuery {
            muscle: Some(MuscleMatch::Primary("Chest".to_string())),
            name_not_in: vec!["BENCH PRESS".to_string()],
            equipment_not_in: vec!["Dumbbells".to_string()],
            ..Default::default()
        };
        let found = db.query_exercises(&query).unwrap();
        assert_eq!(names(&found), vec!["Push-ups"]);
    }

    #[test]
    fn test_difficulty_ids_and_limit() {
        let db = setup();
        let query = ExerciseQuery {
            difficulty_in: vec![Difficulty::Beginner, Difficulty::Intermediate],
            id_not_in: BTreeSet::from([2]),
            limit: Some(1),
            ..Default::default()
        };
        let found = db.query_exercises(&query).unwrap();
        assert_eq!(names(&found), vec!["Dips"]);
    }

    #[test]
    fn test_matches_in_memory_filter() {
        let db = setup();
        let all = db.list_exercises().unwrap();
        let query = ExerciseQuery {
            muscle: Some(MuscleMatch::PrimaryOrSecondary("Chest".to_string())),
            equipment_not_in: vec!["bench".to_string()],
            difficulty_in: vec![Difficulty::Beginner, Difficulty::Intermediate],
            ..Default::default()
        };
        let from_sql = db.query_exercises(&query).unwrap();
        let from_memory = query.run(&all);
        assert_eq!(from_sql, from_memory);
    }

    #[test]
    fn test_exclusions_fold_non_ascii() {
        let db = setup();
        db.add_exercise(&exercise("ÉLÉVATIONS", "Shoulders", None, Difficulty::Beginner, Some("HALTÈRES")))
            .unwrap();
        let all = db.list_exercises().unwrap();
        let shoulders = Some(MuscleMatch::Primary("Shoulders".to_string()));

        for name in ["ÉLÉVATIONS", "élévations"] {
            let query = ExerciseQuery {
                muscle: shoulders.clone(),
                name_not_in: vec![name.to_string()],
                ..Default::default()
            };
            assert!(db.query_exercises(&query).unwrap().is_empty(), "{name} not excluded");
            assert!(query.run(&all).is_empty());
        }

        for equipment in ["HALTÈRES", "haltères"] {
            let query = ExerciseQuery {
                muscle: shoulders.clone(),
                equipment_not_in: vec![equipment.to_string()],
                ..Default::default()
            };
            assert!(db.query_exercises(&query).unwrap().is_empty(), "{equipment} not excluded");
            assert_eq!(db.query_exercises(&query).unwrap(), query.run(&all));
        }
    }

    #[test]
    fn test_seed_only_once() {
        let db = Database::open(":memory:").unwrap();
        let added = db.seed_default_catalog().unwrap();
        assert_eq!(added, DEFAULT_CATALOG.len());
        assert_eq!(db.seed_default_catalog().unwrap(), 0);
        assert_eq!(db.list_exercises().unwrap().len(), DEFAULT_CATALOG.len());
    }
}
