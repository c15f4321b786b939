//! Exercise catalog records, catalog queries and the built-in starter catalog

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::planner::ExerciseCatalog;

/// Exercise difficulty. Ordering is Beginner < Intermediate < Advanced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    /// Sort rank used by catalog queries
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Advanced => 2,
        }
    }

    /// Case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    /// All levels, easiest first
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercise as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub primary_muscle: String,
    pub secondary_muscle: Option<String>,
    pub difficulty: Difficulty,
    pub equipment: Option<String>,
    pub base_sets: Option<u32>,
    pub base_reps: Option<u32>,
    pub base_duration: Option<String>,
}

impl ExerciseRecord {
    /// Secondary muscle, treating the legacy "N/A" marker as absent
    pub fn secondary(&self) -> Option<&str> {
        self.secondary_muscle
            .as_deref()
            .filter(|m| !m.is_empty() && *m != "N/A")
    }
}

/// Exercise to be inserted into the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    pub primary_muscle: String,
    pub secondary_muscle: Option<String>,
    pub difficulty: Difficulty,
    pub equipment: Option<String>,
    pub base_sets: Option<u32>,
    pub base_reps: Option<u32>,
    pub base_duration: Option<String>,
}

/// How a query constrains muscles
#[derive(Debug, Clone, PartialEq)]
pub enum MuscleMatch {
    /// primary_muscle = m
    Primary(String),
    /// primary_muscle = m OR secondary_muscle = m
    PrimaryOrSecondary(String),
}

/// Filtered catalog lookup.
///
/// Empty lists mean "no constraint". Results are always ordered by
/// difficulty (easiest first), then by id ascending.
#[derive(Debug, Clone, Default)]
pub struct ExerciseQuery {
    pub muscle: Option<MuscleMatch>,
    pub name_in: Vec<String>,
    pub name_not_in: Vec<String>,
    pub difficulty_in: Vec<Difficulty>,
    pub equipment_not_in: Vec<String>,
    pub id_not_in: BTreeSet<i64>,
    pub limit: Option<usize>,
}

impl ExerciseQuery {
    /// Check a single record against every filter (ordering and limit aside)
    pub fn matches(&self, exercise: &ExerciseRecord) -> bool {
        let muscle_ok = match &self.muscle {
            None => true,
            Some(MuscleMatch::Primary(m)) => exercise.primary_muscle == *m,
            Some(MuscleMatch::PrimaryOrSecondary(m)) => {
                exercise.primary_muscle == *m || exercise.secondary() == Some(m.as_str())
            }
        };
        if !muscle_ok {
            return false;
        }

        if !self.name_in.is_empty() && !self.name_in.iter().any(|n| n == &exercise.name) {
            return false;
        }

        if contains_ignore_case(&self.name_not_in, &exercise.name) {
            return false;
        }

        if !self.difficulty_in.is_empty() && !self.difficulty_in.contains(&exercise.difficulty) {
            return false;
        }

        // Null equipment is never excluded
        if let Some(equipment) = &exercise.equipment
            && contains_ignore_case(&self.equipment_not_in, equipment)
        {
            return false;
        }

        !self.id_not_in.contains(&exercise.id)
    }

    /// Apply the query to an in-memory list of records
    pub fn run(&self, exercises: &[ExerciseRecord]) -> Vec<ExerciseRecord> {
        let mut found: Vec<ExerciseRecord> = exercises
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();

        found.sort_by_key(|e| (e.difficulty.rank(), e.id));

        if let Some(limit) = self.limit {
            found.truncate(limit);
        }
        found
    }
}

/// Case folding used for every name and equipment comparison, in memory and in SQL
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    let value = fold_case(value);
    list.iter().any(|item| fold_case(item) == value)
}

impl ExerciseCatalog for [ExerciseRecord] {
    fn query_exercises(&self, query: &ExerciseQuery) -> anyhow::Result<Vec<ExerciseRecord>> {
        Ok(query.run(self))
    }
}

/// Entry of the built-in starter catalog
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub primary_muscle: &'static str,
    pub secondary_muscle: Option<&'static str>,
    pub difficulty: Difficulty,
    pub equipment: Option<&'static str>,
    pub sets: u32,
    pub reps: u32,
    pub duration: Option<&'static str>,
}

impl CatalogEntry {
    pub fn to_new_exercise(&self) -> NewExercise {
        NewExercise {
            name: self.name.to_string(),
            category: self.category.to_string(),
            primary_muscle: self.primary_muscle.to_string(),
            secondary_muscle: self.secondary_muscle.map(str::to_string),
            difficulty: self.difficulty,
            equipment: self.equipment.map(str::to_string),
            base_sets: Some(self.sets),
            base_reps: Some(self.reps),
            base_duration: self.duration.map(str::to_string),
        }
    }
}

const fn entry(
    name: &'static str,
    category: &'static str,
    primary_muscle: &'static str,
    secondary_muscle: Option<&'static str>,
    difficulty: Difficulty,
    equipment: Option<&'static str>,
) -> CatalogEntry {
    CatalogEntry {
        name,
        category,
        primary_muscle,
        secondary_muscle,
        difficulty,
        equipment,
        sets: 3,
        reps: 10,
        duration: None,
    }
}

const fn timed(
    name: &'static str,
    category: &'static str,
    primary_muscle: &'static str,
    difficulty: Difficulty,
    equipment: Option<&'static str>,
    duration: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        name,
        category,
        primary_muscle,
        secondary_muscle: None,
        difficulty,
        equipment,
        sets: 1,
        reps: 1,
        duration: Some(duration),
    }
}

use Difficulty::{Advanced, Beginner, Intermediate};

/// Starter catalog covering every muscle the day structures ask for
pub const DEFAULT_CATALOG: &[CatalogEntry] = &[
    // Chest
    entry("Push-Ups", "Strength", "Chest", Some("Triceps"), Beginner, None),
    entry("Bench Press", "Strength", "Chest", Some("Triceps"), Intermediate, Some("Barbell")),
    entry("Dumbbell Flyes", "Strength", "Chest", None, Intermediate, Some("Dumbbells")),
    entry("Incline Bench Press", "Strength", "Chest", Some("Shoulders"), Advanced, Some("Barbell")),
    // Back
    entry("Seated Cable Rows", "Strength", "Back", Some("Biceps"), Beginner, Some("Cable")),
    entry("Lat Pulldowns", "Strength", "Back", Some("Biceps"), Beginner, Some("Cable")),
    entry("Pull-Ups", "Strength", "Back", Some("Biceps"), Intermediate, Some("Pull-Up Bar")),
    entry("Deadlifts", "Strength", "Back", Some("Hamstrings"), Advanced, Some("Barbell")),
    // Shoulders
    entry("Lateral Raises", "Strength", "Shoulders", None, Beginner, Some("Dumbbells")),
    entry("Overhead Press", "Strength", "Shoulders", Some("Triceps"), Intermediate, Some("Barbell")),
    entry("Face Pulls", "Strength", "Shoulders", Some("Back"), Intermediate, Some("Cable")),
    entry("Arnold Press", "Strength", "Shoulders", None, Advanced, Some("Dumbbells")),
    // Arms
    entry("Tricep Dips", "Strength", "Triceps", Some("Chest"), Beginner, None),
    entry("Tricep Pushdowns", "Strength", "Triceps", None, Beginner, Some("Cable")),
    entry("Skull Crushers", "Strength", "Triceps", None, Intermediate, Some("Barbell")),
    entry("Bicep Curls", "Strength", "Biceps", None, Beginner, Some("Dumbbells")),
    entry("Hammer Curls", "Strength", "Biceps", Some("Arms"), Beginner, Some("Dumbbells")),
    entry("Chin-Ups", "Strength", "Biceps", Some("Back"), Intermediate, Some("Pull-Up Bar")),
    entry("Close-Grip Push-Ups", "Strength", "Arms", Some("Triceps"), Beginner, None),
    // Legs
    entry("Squats", "Strength", "Legs", Some("Glutes"), Intermediate, Some("Barbell")),
    entry("Front Squats", "Strength", "Legs", None, Advanced, Some("Barbell")),
    entry("Leg Press", "Strength", "Legs", None, Beginner, Some("Machine")),
    entry("Leg Extensions", "Strength", "Legs", None, Beginner, Some("Machine")),
    entry("Hamstring Curls", "Strength", "Legs", None, Beginner, Some("Machine")),
    entry("Romanian Deadlifts", "Strength", "Legs", Some("Glutes"), Intermediate, Some("Barbell")),
    entry("Bulgarian Split Squats", "Strength", "Legs", Some("Glutes"), Intermediate, Some("Dumbbells")),
    entry("Lunges", "Strength", "Legs", Some("Glutes"), Beginner, None),
    entry("Step-Ups", "Strength", "Legs", Some("Glutes"), Beginner, None),
    entry("Calf Raises", "Strength", "Legs", None, Beginner, None),
    // Glutes
    entry("Glute Bridges", "Strength", "Glutes", None, Beginner, None),
    entry("Hip Thrusts", "Strength", "Glutes", Some("Legs"), Intermediate, Some("Barbell")),
    // Core
    timed("Plank", "Core", "Core", Beginner, None, "60 sec"),
    entry("Crunches", "Core", "Core", None, Beginner, None),
    entry("Hanging Leg Raises", "Core", "Core", None, Advanced, Some("Pull-Up Bar")),
    entry("Russian Twists", "Core", "Core", None, Intermediate, None),
    // Cardio
    timed("Jumping Jacks", "Cardio", "Cardio", Beginner, None, "5 min"),
    timed("Rowing", "Cardio", "Cardio", Beginner, Some("Machine"), "10 min"),
    timed("Burpees", "Cardio", "Cardio", Intermediate, None, "5 min"),
    timed("Jump Rope", "Cardio", "Cardio", Intermediate, Some("Jump Rope"), "10 min"),
];
