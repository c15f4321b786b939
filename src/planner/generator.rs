//! Plan assembly: profile + history + catalog -> persisted multi-day plan

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::selector::{ExercisePreferences, SelectedExercise, select_exercises};
use super::split::plan_split;
use super::structure::resolve;
use super::volume::{adjust_volume, volume_factor};
use super::{NewPlan, NewPlanDay, PlanBackend};
use crate::error::PlanError;

/// Length of the history window used for volume scaling
pub const HISTORY_WEEKS: i64 = 4;

/// Input of a generation call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub user_id: i64,
    pub days_per_week: u32,
    #[serde(default)]
    pub preferences: Option<ExercisePreferences>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPlanDay {
    pub day_number: u32,
    pub description: String,
    pub exercises: Vec<SelectedExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPlan {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub days_per_week: u32,
    pub is_active: bool,
    pub days: Vec<GeneratedPlanDay>,
}

impl GeneratedPlan {
    /// All exercise ids across days, in plan order
    pub fn exercise_ids(&self) -> Vec<i64> {
        self.days
            .iter()
            .flat_map(|d| d.exercises.iter().map(|e| e.exercise_id))
            .collect()
    }
}

/// Generate and persist a plan, using today's UTC date for the history window
pub fn generate_plan<B: PlanBackend>(backend: &B, request: &PlanRequest) -> Result<GeneratedPlan, PlanError> {
    generate_plan_on(backend, request, Utc::now().date_naive())
}

/// Generate and persist a plan with an explicit "today"
pub fn generate_plan_on<B: PlanBackend>(
    backend: &B,
    request: &PlanRequest,
    today: NaiveDate,
) -> Result<GeneratedPlan, PlanError> {
    let days_per_week = request.days_per_week;
    let split = plan_split(days_per_week)?;

    let profile = backend
        .user_profile(request.user_id)?
        .ok_or(PlanError::UserNotFound(request.user_id))?;

    let recent = backend.recent_logs(request.user_id, HISTORY_WEEKS as u32)?;
    let start = today - Duration::weeks(HISTORY_WEEKS);
    let weeks = backend.weekly_frequency(request.user_id, start, today)?;
    let factor = volume_factor(&weeks, days_per_week);
    info!(
        user_id = request.user_id,
        days_per_week,
        recent_logs = recent.len(),
        history_weeks = weeks.len(),
        factor,
        "generating plan"
    );

    let goal = profile.goal();
    let preferences = request.preferences.clone().unwrap_or_default();
    let mut selected_ids = BTreeSet::new();
    let mut days = Vec::with_capacity(split.len());

    for (index, archetype) in split.iter().enumerate() {
        let spec = resolve(*archetype)?;
        let mut exercises = select_exercises(
            backend,
            spec.muscles,
            spec.exercise_count,
            &preferences,
            profile.experience_level,
            goal,
            &mut selected_ids,
        )?;
        adjust_volume(&mut exercises, factor);

        debug!(day = index + 1, archetype = %archetype, exercises = exercises.len(), "day resolved");
        days.push(GeneratedPlanDay {
            day_number: index as u32 + 1,
            description: archetype.day_description(),
            exercises,
        });
    }

    let name = request
        .plan_name
        .clone()
        .unwrap_or_else(|| format!("AI-Generated {}-Day Plan", days_per_week));
    let description = request.description.clone().unwrap_or_else(|| {
        let goal = profile.fitness_goal.map(|g| g.as_str()).unwrap_or("general fitness");
        format!("AI-generated plan for {}", goal)
    });

    let new_plan = NewPlan {
        user_id: request.user_id,
        name: name.clone(),
        description: Some(description.clone()),
        days_per_week,
        preferred_days: None,
        is_active: false,
        days: days
            .iter()
            .map(|d| NewPlanDay {
                day_number: d.day_number,
                description: d.description.clone(),
                exercise_ids: d.exercises.iter().map(|e| e.exercise_id).collect(),
            })
            .collect(),
    };
    let plan_id = backend.commit_plan(&new_plan)?;
    info!(plan_id, exercises = selected_ids.len(), "plan committed");

    Ok(GeneratedPlan {
        id: plan_id,
        name,
        description,
        days_per_week,
        is_active: false,
        days,
    })
}
