//! Planner module - rule-based training plan generation
//!
//! Features:
//! - Weekly split selection by training frequency
//! - Day structures per archetype (with leg sub-categories)
//! - Exercise selection under user exclusions and a difficulty ceiling
//! - Volume scaling from recent training frequency
//!
//! The planner owns no storage. It talks to the outside world through the
//! collaborator traits below, all of which `crate::db::Database` implements.

pub mod generator;
pub mod profile;
pub mod selector;
pub mod split;
pub mod structure;
pub mod volume;

pub use generator::{GeneratedPlan, GeneratedPlanDay, PlanRequest, generate_plan, generate_plan_on};
pub use profile::{ExperienceLevel, FitnessGoal, UserProfile, Volume};
pub use selector::{ExercisePreferences, SelectedExercise, select_exercises};
pub use split::{Archetype, plan_split};
pub use structure::{DaySpec, ExerciseCount, LegFocus, resolve};
pub use volume::{WeeklyCount, adjust_volume, volume_factor};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::WorkoutLog;
use crate::exercises::{ExerciseQuery, ExerciseRecord};

/// Source of user profiles
pub trait ProfileSource {
    fn user_profile(&self, user_id: i64) -> Result<Option<UserProfile>>;
}

/// Filtered, difficulty-ordered exercise lookup
pub trait ExerciseCatalog {
    fn query_exercises(&self, query: &ExerciseQuery) -> Result<Vec<ExerciseRecord>>;
}

/// Access to a user's logged workouts
pub trait TrainingHistory {
    /// Logs from the trailing `weeks` weeks, newest first
    fn recent_logs(&self, user_id: i64, weeks: u32) -> Result<Vec<WorkoutLog>>;

    /// Workout counts per calendar week in `[start, end]`, empty weeks omitted
    fn weekly_frequency(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeeklyCount>>;
}

/// Day of a plan about to be persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlanDay {
    pub day_number: u32,
    pub description: String,
    pub exercise_ids: Vec<i64>,
}

/// Complete plan handed to the store in one piece
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlan {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub days_per_week: u32,
    pub preferred_days: Option<String>,
    pub is_active: bool,
    pub days: Vec<NewPlanDay>,
}

/// Persistence of generated plans
pub trait PlanStore {
    /// Write the plan with all its days and exercises atomically, returning the plan id
    fn commit_plan(&self, plan: &NewPlan) -> Result<i64>;
}

/// Everything plan generation needs from the outside
pub trait PlanBackend: ProfileSource + ExerciseCatalog + TrainingHistory + PlanStore {}

impl<T> PlanBackend for T where T: ProfileSource + ExerciseCatalog + TrainingHistory + PlanStore {}
