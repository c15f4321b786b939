//! Database module - SQLite storage for users, catalog, plans and workout logs

mod catalog;
mod logs;
mod plans;
mod weight;

pub use logs::{LogDetail, NewWorkoutLog, WorkoutLog, WorkoutLogPatch};
pub use weight::WeightEntry;
pub use plans::{Plan, PlanDay, PlanDayDetail, PlanDetail, PlanDraft, PlanExercise};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::exercises::fold_case;
use crate::planner::{ExperienceLevel, FitnessGoal, ProfileSource, UserProfile};

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub experience_level: Option<ExperienceLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    /// Latest logged body weight
    pub weight_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database (":memory:" for a throwaway one)
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("failed to open database {path}"))?;
        let db = Self { conn };
        db.register_functions()?;
        db.init_schema()?;
        Ok(db)
    }

    /// SQL functions backed by Rust code
    fn register_functions(&self) -> Result<()> {
        // SQLite's lower() only folds ASCII
        self.conn.create_scalar_function(
            "fold_case",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: Option<String> = ctx.get(0)?;
                Ok(value.as_deref().map(fold_case))
            },
        )?;
        Ok(())
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                experience_level TEXT,
                fitness_goal TEXT,
                weight_kg REAL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                primary_muscle TEXT NOT NULL,
                secondary_muscle TEXT,
                difficulty TEXT NOT NULL,
                equipment TEXT,
                base_sets INTEGER,
                base_reps INTEGER,
                base_duration TEXT
            );

            CREATE TABLE IF NOT EXISTS plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                days_per_week INTEGER NOT NULL,
                preferred_days TEXT,
                is_active INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS plan_days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
                day_number INTEGER NOT NULL,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS plan_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_day_id INTEGER NOT NULL REFERENCES plan_days(id) ON DELETE CASCADE,
                exercise_id INTEGER NOT NULL REFERENCES exercises(id)
            );

            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                plan_exercise_id INTEGER REFERENCES plan_exercises(id) ON DELETE SET NULL,
                date TEXT NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                duration_minutes REAL,
                weight REAL,
                notes TEXT
            );

            CREATE TABLE IF NOT EXISTS weight_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date_logged TEXT NOT NULL,
                weight_kg REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workout_logs_user_date ON workout_logs(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_weight_history_user_date ON weight_history(user_id, date_logged);",
        )?;
        Ok(())
    }

    /// Register a user, returns the new id
    pub fn create_user(&self, username: &str, email: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
                params![username, email, format_timestamp(&Utc::now())],
            )
            .with_context(|| format!("failed to create user {username}"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Set the training profile used by the plan generator
    pub fn update_profile(&self, user_id: i64, level: ExperienceLevel, goal: FitnessGoal) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET experience_level = ?1, fitness_goal = ?2 WHERE id = ?3",
            params![level.as_str(), goal.as_str(), user_id],
        )?;
        if updated == 0 {
            return Err(StoreError::UserNotFound(user_id).into());
        }
        Ok(())
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email, experience_level, fitness_goal, weight_kg, created_at FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    let level: Option<String> = row.get(3)?;
                    let goal: Option<String> = row.get(4)?;
                    let created: String = row.get(6)?;
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        experience_level: level.as_deref().map(ExperienceLevel::parse_lossy),
                        fitness_goal: goal.as_deref().map(FitnessGoal::parse_lossy),
                        weight_kg: row.get(5)?,
                        created_at: parse_timestamp(&created),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Fail with `UserNotFound` unless the user exists
    fn require_user(&self, user_id: i64) -> Result<()> {
        if self.get_user(user_id)?.is_none() {
            return Err(StoreError::UserNotFound(user_id).into());
        }
        Ok(())
    }
}

impl ProfileSource for Database {
    fn user_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        Ok(self.get_user(user_id)?.map(|user| UserProfile {
            user_id: user.id,
            username: user.username,
            experience_level: user.experience_level.unwrap_or_default(),
            fitness_goal: user.fitness_goal,
        }))
    }
}

/// Timestamps are stored as RFC 3339 text with second precision
pub(crate) fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open(":memory:").unwrap();
        assert!(db.get_user(1).unwrap().is_none());
    }

    #[test]
    fn test_create_user_and_profile() {
        let db = Database::open(":memory:").unwrap();
        let id = db.create_user("testuser1", "test1@example.com").unwrap();

        let profile = db.user_profile(id).unwrap().unwrap();
        assert_eq!(profile.experience_level, ExperienceLevel::Intermediate);
        assert_eq!(profile.fitness_goal, None);

        db.update_profile(id, ExperienceLevel::Beginner, FitnessGoal::Endurance).unwrap();
        let profile = db.user_profile(id).unwrap().unwrap();
        assert_eq!(profile.experience_level, ExperienceLevel::Beginner);
        assert_eq!(profile.fitness_goal, Some(FitnessGoal::Endurance));
    }

    #[test]
    fn test_update_profile_unknown_user() {
        let db = Database::open(":memory:").unwrap();
        let err = db
            .update_profile(42, ExperienceLevel::Advanced, FitnessGoal::Strength)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<StoreError>(), Some(&StoreError::UserNotFound(42)));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = Database::open(":memory:").unwrap();
        db.create_user("testuser1", "a@example.com").unwrap();
        assert!(db.create_user("testuser1", "b@example.com").is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(&now));
        assert_eq!(parsed.timestamp(), now.timestamp());
    }

    mod generation {
        use std::collections::{BTreeSet, HashSet};

        use chrono::{Duration, NaiveDate};

        use super::super::*;
        use crate::error::PlanError;
        use crate::exercises::{Difficulty, NewExercise};
        use crate::planner::{ExercisePreferences, PlanRequest, generate_plan, generate_plan_on};

        fn today() -> NaiveDate {
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        }

        fn exercise(name: &str, primary: &str, equipment: Option<&str>) -> NewExercise {
            NewExercise {
                name: name.to_string(),
                category: "Strength".to_string(),
                primary_muscle: primary.to_string(),
                secondary_muscle: None,
                difficulty: Difficulty::Beginner,
                equipment: equipment.map(str::to_string),
                base_sets: Some(3),
                base_reps: Some(10),
                base_duration: None,
            }
        }

        fn user_with_goal(db: &Database, goal: FitnessGoal) -> i64 {
            let id = db.create_user("testuser1", "test1@example.com").unwrap();
            db.update_profile(id, ExperienceLevel::Advanced, goal).unwrap();
            id
        }

        fn request(user_id: i64, days: u32) -> PlanRequest {
            PlanRequest { user_id, days_per_week: days, ..Default::default() }
        }

        #[test]
        fn test_workout_logged_now_counts_toward_history() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();
            let user = user_with_goal(&db, FitnessGoal::Strength);
            db.log_workout(
                user,
                &NewWorkoutLog {
                    exercise_id: 1,
                    plan_exercise_id: None,
                    date: Utc::now(),
                    sets: 4,
                    reps: 6,
                    duration_minutes: None,
                    weight: None,
                    notes: None,
                },
            )
            .unwrap();

            // one workout a week against three planned days: 4 sets scale down to 1
            let plan = generate_plan(&db, &request(user, 3)).unwrap();
            for exercise in plan.days.iter().flat_map(|d| &d.exercises) {
                assert_eq!(exercise.recommended_sets, 1);
            }
        }

        #[test]
        fn test_three_day_plan_from_seeded_catalog() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();
            let user = user_with_goal(&db, FitnessGoal::Hypertrophy);

            let plan = generate_plan_on(&db, &request(user, 3), today()).unwrap();
            let descriptions: Vec<_> = plan.days.iter().map(|d| d.description.as_str()).collect();
            assert_eq!(descriptions, vec!["Push Day", "Pull Day", "Legs Day"]);
            assert_eq!(plan.name, "AI-Generated 3-Day Plan");
            assert_eq!(plan.description, "AI-generated plan for hypertrophy");

            let ids = plan.exercise_ids();
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(ids.len(), unique.len());

            let stored = db.plan_detail(user, plan.id).unwrap();
            assert!(!stored.plan.is_active);
            assert_eq!(stored.days.len(), 3);
            for (generated, persisted) in plan.days.iter().zip(&stored.days) {
                assert_eq!(persisted.day.day_number, generated.day_number);
                let persisted_ids: Vec<_> = persisted.exercises.iter().map(|e| e.exercise_id).collect();
                let generated_ids: Vec<_> = generated.exercises.iter().map(|e| e.exercise_id).collect();
                assert_eq!(persisted_ids, generated_ids);
            }
        }

        #[test]
        fn test_every_frequency_persists_all_days() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();
            let user = user_with_goal(&db, FitnessGoal::General);

            for days in 1..=7 {
                let plan = generate_plan_on(&db, &request(user, days), today()).unwrap();
                let numbers: Vec<_> = plan.days.iter().map(|d| d.day_number).collect();
                assert_eq!(numbers, (1..=days).collect::<Vec<_>>());
                assert_eq!(db.list_plan_days(user, plan.id).unwrap().len(), days as usize);
            }
            assert_eq!(db.list_plans(user).unwrap().len(), 7);
        }

        #[test]
        fn test_sparse_catalog_with_equipment_exclusion() {
            let db = Database::open(":memory:").unwrap();
            db.add_exercise(&exercise("Bench Press", "Chest", Some("Barbell"))).unwrap();
            db.add_exercise(&exercise("Pull-Ups", "Back", Some("Pull-up Bar"))).unwrap();
            db.add_exercise(&exercise("Dumbbell Flyes", "Chest", Some("Dumbbells"))).unwrap();
            let user = user_with_goal(&db, FitnessGoal::General);

            let mut req = request(user, 3);
            req.preferences = Some(ExercisePreferences {
                excluded_equipment: BTreeSet::from(["dumbbells".to_string()]),
                ..Default::default()
            });
            let plan = generate_plan_on(&db, &req, today()).unwrap();

            let names: Vec<_> = plan
                .days
                .iter()
                .flat_map(|d| d.exercises.iter().map(|e| e.name.as_str()))
                .collect();
            assert_eq!(names, vec!["Bench Press", "Pull-Ups"]);
            assert!(plan.days[2].exercises.is_empty());
        }

        #[test]
        fn test_legs_day_covers_sub_categories() {
            let db = Database::open(":memory:").unwrap();
            for name in ["Squats", "Leg Press", "Hamstring Curls", "Bulgarian Split Squats"] {
                db.add_exercise(&exercise(name, "Legs", None)).unwrap();
            }
            let user = user_with_goal(&db, FitnessGoal::General);

            let plan = generate_plan_on(&db, &request(user, 3), today()).unwrap();
            let legs: Vec<_> = plan.days[2].exercises.iter().map(|e| e.name.as_str()).collect();
            assert!(legs.contains(&"Squats") || legs.contains(&"Leg Press"));
            assert!(legs.contains(&"Hamstring Curls"));
            assert!(legs.contains(&"Bulgarian Split Squats"));
        }

        #[test]
        fn test_strength_goal_prescription() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();
            let user = user_with_goal(&db, FitnessGoal::Strength);

            let plan = generate_plan_on(&db, &request(user, 4), today()).unwrap();
            assert!(!plan.exercise_ids().is_empty());
            for exercise in plan.days.iter().flat_map(|d| &d.exercises) {
                assert_eq!(exercise.recommended_sets, 4);
                assert_eq!(exercise.recommended_reps, 6);
            }
        }

        #[test]
        fn test_low_recent_frequency_reduces_sets() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();
            let user = user_with_goal(&db, FitnessGoal::Strength);
            let squats = db.list_exercises().unwrap()[0].id;

            let week_ago = (today() - Duration::days(7)).and_hms_opt(12, 0, 0).unwrap().and_utc();
            db.log_workout(
                user,
                &NewWorkoutLog {
                    exercise_id: squats,
                    plan_exercise_id: None,
                    date: week_ago,
                    sets: 4,
                    reps: 6,
                    duration_minutes: None,
                    weight: Some(80.0),
                    notes: None,
                },
            )
            .unwrap();

            let plan = generate_plan_on(&db, &request(user, 3), today()).unwrap();
            assert!(!plan.exercise_ids().is_empty());
            for exercise in plan.days.iter().flat_map(|d| &d.exercises) {
                assert!(exercise.recommended_sets < 4);
            }
        }

        #[test]
        fn test_unknown_user_persists_nothing() {
            let db = Database::open(":memory:").unwrap();
            db.seed_default_catalog().unwrap();

            let err = generate_plan_on(&db, &request(5, 3), today()).unwrap_err();
            assert!(matches!(err, PlanError::UserNotFound(5)));
            let plans: i64 = db.conn.query_row("SELECT COUNT(*) FROM plans", [], |row| row.get(0)).unwrap();
            assert_eq!(plans, 0);
        }

        #[test]
        fn test_invalid_frequency() {
            let db = Database::open(":memory:").unwrap();
            let user = user_with_goal(&db, FitnessGoal::General);
            let err = generate_plan_on(&db, &request(user, 8), today()).unwrap_err();
            assert!(matches!(err, PlanError::InvalidFrequency(8)));
        }
    }
}
