//! Constrained exercise selection for a single plan day
//!
//! Every catalog query carries the running set of already selected ids, so
//! an exercise never appears twice in the same plan. A muscle whose demand
//! cannot be met is simply left short.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ExerciseCatalog;
use super::profile::{ExperienceLevel, FitnessGoal, Volume};
use super::structure::{ExerciseCount, LegFocus};
use crate::exercises::{Difficulty, ExerciseQuery, ExerciseRecord, MuscleMatch};

/// Per-request exclusions supplied by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExercisePreferences {
    #[serde(default, alias = "equipment")]
    pub excluded_equipment: BTreeSet<String>,
    #[serde(default, alias = "exercises")]
    pub excluded_exercise_names: BTreeSet<String>,
}

/// Exercise picked for a plan day with its prescription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedExercise {
    pub exercise_id: i64,
    pub name: String,
    pub primary_muscle: String,
    pub secondary_muscle: Option<String>,
    pub equipment: Option<String>,
    pub recommended_sets: u32,
    pub recommended_reps: u32,
    pub recommended_duration: Option<String>,
}

impl SelectedExercise {
    fn prescribe(exercise: ExerciseRecord, volume: Volume) -> Self {
        Self {
            exercise_id: exercise.id,
            secondary_muscle: exercise.secondary().map(str::to_string),
            name: exercise.name,
            primary_muscle: exercise.primary_muscle,
            equipment: exercise.equipment,
            recommended_sets: volume.sets,
            recommended_reps: volume.reps,
            recommended_duration: exercise.base_duration,
        }
    }
}

/// Filters shared by every query of one selection run
struct Constraints {
    difficulty_in: Vec<Difficulty>,
    name_not_in: Vec<String>,
    equipment_not_in: Vec<String>,
}

impl Constraints {
    fn query(&self, muscle: MuscleMatch, selected_ids: &BTreeSet<i64>, limit: usize) -> ExerciseQuery {
        ExerciseQuery {
            muscle: Some(muscle),
            name_in: Vec::new(),
            name_not_in: self.name_not_in.clone(),
            difficulty_in: self.difficulty_in.clone(),
            equipment_not_in: self.equipment_not_in.clone(),
            id_not_in: selected_ids.clone(),
            limit: Some(limit),
        }
    }
}

/// Pick exercises for the given muscles.
///
/// `selected_ids` is the plan-wide accumulator: ids already used are skipped
/// and every new pick is added to it.
pub fn select_exercises<C>(
    catalog: &C,
    muscles: &[&str],
    exercise_count: ExerciseCount,
    preferences: &ExercisePreferences,
    level: ExperienceLevel,
    goal: FitnessGoal,
    selected_ids: &mut BTreeSet<i64>,
) -> Result<Vec<SelectedExercise>>
where
    C: ExerciseCatalog + ?Sized,
{
    let constraints = Constraints {
        difficulty_in: level.allowed_difficulties(),
        name_not_in: preferences.excluded_exercise_names.iter().cloned().collect(),
        equipment_not_in: preferences.excluded_equipment.iter().cloned().collect(),
    };
    let volume = goal.base_volume();

    let mut remaining: HashMap<&str, u32> = match exercise_count {
        ExerciseCount::Uniform(n) => muscles.iter().map(|m| (*m, n)).collect(),
        ExerciseCount::PerMuscle(counts) => {
            let mut remaining: HashMap<&str, u32> = counts.iter().copied().collect();
            for muscle in muscles {
                remaining.entry(*muscle).or_insert(1);
            }
            remaining
        }
    };

    let mut picks = Vec::new();

    for muscle in muscles {
        if let ExerciseCount::PerMuscle(counts) = exercise_count
            && *muscle == "Legs"
        {
            select_leg_day(catalog, counts, &constraints, volume, selected_ids, &mut picks)?;
            continue;
        }

        while remaining.get(muscle).copied().unwrap_or(0) > 0 {
            let query = constraints.query(
                MuscleMatch::PrimaryOrSecondary(muscle.to_string()),
                selected_ids,
                1,
            );
            let Some(exercise) = catalog.query_exercises(&query)?.into_iter().next() else {
                debug!(muscle, "no candidate left, muscle stays short");
                remaining.insert(*muscle, 0);
                break;
            };

            // One pick may cover demand for both its muscles
            if let Some(count) = remaining.get_mut(exercise.primary_muscle.as_str()) {
                *count = count.saturating_sub(1);
            }
            if let Some(secondary) = exercise.secondary()
                && secondary != exercise.primary_muscle
                && let Some(count) = remaining.get_mut(secondary)
            {
                *count = count.saturating_sub(1);
            }

            debug!(muscle, exercise = %exercise.name, "selected");
            selected_ids.insert(exercise.id);
            picks.push(SelectedExercise::prescribe(exercise, volume));
        }
    }

    Ok(picks)
}

/// Leg days pick from fixed name lists per sub-category
fn select_leg_day<C>(
    catalog: &C,
    counts: &[(&str, u32)],
    constraints: &Constraints,
    volume: Volume,
    selected_ids: &mut BTreeSet<i64>,
    picks: &mut Vec<SelectedExercise>,
) -> Result<()>
where
    C: ExerciseCatalog + ?Sized,
{
    for (key, count) in counts {
        if *count == 0 {
            continue;
        }
        let Some(focus) = LegFocus::from_name(key) else {
            continue;
        };

        let mut query = constraints.query(
            MuscleMatch::Primary("Legs".to_string()),
            selected_ids,
            *count as usize,
        );
        query.name_in = focus.exercise_names().iter().map(|n| n.to_string()).collect();

        let found = catalog.query_exercises(&query)?;
        if found.len() < *count as usize {
            debug!(focus = %focus, wanted = count, found = found.len(), "leg sub-category short");
        }

        for exercise in found {
            debug!(focus = %focus, exercise = %exercise.name, "selected");
            selected_ids.insert(exercise.id);
            picks.push(SelectedExercise::prescribe(exercise, volume));
        }
    }
    Ok(())
}
