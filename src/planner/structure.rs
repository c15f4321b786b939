//! Day structures: archetype -> target muscles and exercise counts

use std::fmt;

use super::split::Archetype;
use crate::error::PlanError;

/// How many exercises a day asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseCount {
    /// Same count for every muscle of the day
    Uniform(u32),
    /// Count per muscle, or per leg sub-category on leg days
    PerMuscle(&'static [(&'static str, u32)]),
}

impl ExerciseCount {
    pub fn is_per_muscle(&self) -> bool {
        matches!(self, ExerciseCount::PerMuscle(_))
    }
}

/// Resolved plan for a single day, consumed right away by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpec {
    pub archetype: Archetype,
    pub muscles: &'static [&'static str],
    pub exercise_count: ExerciseCount,
}

impl DaySpec {
    /// Leg days pick by sub-category instead of by muscle
    pub fn is_leg_day(&self) -> bool {
        self.muscles == ["Legs"] && self.exercise_count.is_per_muscle()
    }
}

const DAY_STRUCTURES: &[DaySpec] = &[
    DaySpec {
        archetype: Archetype::FullBody,
        muscles: &["Chest", "Back", "Legs", "Shoulders", "Arms", "Core"],
        exercise_count: ExerciseCount::Uniform(1),
    },
    DaySpec {
        archetype: Archetype::UpperBody,
        muscles: &["Chest", "Back", "Shoulders", "Arms"],
        exercise_count: ExerciseCount::Uniform(1),
    },
    DaySpec {
        archetype: Archetype::LowerBody,
        muscles: &["Legs", "Glutes", "Core"],
        exercise_count: ExerciseCount::Uniform(1),
    },
    DaySpec {
        archetype: Archetype::Push,
        muscles: &["Chest", "Shoulders", "Triceps"],
        exercise_count: ExerciseCount::PerMuscle(&[("Chest", 2), ("Shoulders", 1), ("Triceps", 1)]),
    },
    DaySpec {
        archetype: Archetype::Pull,
        muscles: &["Back", "Biceps"],
        exercise_count: ExerciseCount::PerMuscle(&[("Back", 2), ("Biceps", 1)]),
    },
    DaySpec {
        archetype: Archetype::Legs,
        muscles: &["Legs"],
        exercise_count: ExerciseCount::PerMuscle(&[("Quads", 2), ("Hamstrings", 1), ("Glutes", 1)]),
    },
    DaySpec {
        archetype: Archetype::ChestTriceps,
        muscles: &["Chest", "Triceps"],
        exercise_count: ExerciseCount::PerMuscle(&[("Chest", 2), ("Triceps", 1)]),
    },
    DaySpec {
        archetype: Archetype::BackBiceps,
        muscles: &["Back", "Biceps"],
        exercise_count: ExerciseCount::PerMuscle(&[("Back", 2), ("Biceps", 1)]),
    },
    DaySpec {
        archetype: Archetype::Shoulders,
        muscles: &["Shoulders"],
        exercise_count: ExerciseCount::PerMuscle(&[("Shoulders", 3)]),
    },
    DaySpec {
        archetype: Archetype::CardioCore,
        muscles: &["Cardio", "Core"],
        exercise_count: ExerciseCount::PerMuscle(&[("Cardio", 2), ("Core", 2)]),
    },
];

/// Day structure for an archetype
pub fn resolve(archetype: Archetype) -> Result<DaySpec, PlanError> {
    DAY_STRUCTURES
        .iter()
        .find(|spec| spec.archetype == archetype)
        .copied()
        .ok_or_else(|| PlanError::UnknownArchetype(archetype.name().to_string()))
}

/// Day structure for an archetype given by display name
pub fn resolve_name(name: &str) -> Result<DaySpec, PlanError> {
    resolve(Archetype::from_name(name)?)
}

/// Finer partition of "Legs" used on leg days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegFocus {
    Quads,
    Hamstrings,
    Glutes,
    Calves,
}

const LEG_FOCUS_EXERCISES: &[(LegFocus, &[&str])] = &[
    (LegFocus::Quads, &["Squats", "Front Squats", "Leg Press", "Leg Extensions"]),
    (LegFocus::Hamstrings, &["Hamstring Curls", "Romanian Deadlifts"]),
    (LegFocus::Glutes, &["Bulgarian Split Squats", "Lunges", "Step-Ups"]),
    (LegFocus::Calves, &["Calf Raises"]),
];

impl LegFocus {
    pub fn name(&self) -> &'static str {
        match self {
            LegFocus::Quads => "Quads",
            LegFocus::Hamstrings => "Hamstrings",
            LegFocus::Glutes => "Glutes",
            LegFocus::Calves => "Calves",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        LEG_FOCUS_EXERCISES
            .iter()
            .map(|(focus, _)| *focus)
            .find(|focus| focus.name() == name)
    }

    /// Catalog exercise names that train this sub-category
    pub fn exercise_names(&self) -> &'static [&'static str] {
        LEG_FOCUS_EXERCISES
            .iter()
            .find(|(focus, _)| focus == self)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }
}

impl fmt::Display for LegFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
