//! Volume scaling from recent training frequency

use serde::{Deserialize, Serialize};

use super::selector::SelectedExercise;

/// Number of logged workouts in one calendar week
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyCount {
    pub year: i32,
    pub week: u32,
    pub count: u32,
}

/// Average logged workouts per week over the non-empty weeks
pub fn average_weekly_workouts(weeks: &[WeeklyCount]) -> f64 {
    if weeks.is_empty() {
        return 0.0;
    }
    let total: u32 = weeks.iter().map(|w| w.count).sum();
    f64::from(total) / weeks.len() as f64
}

/// Factor in [0, 1] applied to set counts.
///
/// Users who train less often than the plan asks get less volume; nobody
/// gets more. No history means no reduction.
pub fn volume_factor(weeks: &[WeeklyCount], days_per_week: u32) -> f64 {
    let average = average_weekly_workouts(weeks);
    if average <= 0.0 || days_per_week == 0 {
        return 1.0;
    }
    (average / f64::from(days_per_week)).min(1.0)
}

/// Scale recommended sets in place, truncating toward zero
pub fn adjust_volume(exercises: &mut [SelectedExercise], factor: f64) {
    let factor = factor.clamp(0.0, 1.0);
    for exercise in exercises {
        exercise.recommended_sets = (f64::from(exercise.recommended_sets) * factor).floor() as u32;
    }
}
