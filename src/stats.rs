//! Workout statistics over a date window

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::{Database, LogDetail};
use crate::error::StoreError;
use crate::planner::WeeklyCount;

/// Workouts logged on one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Everything `stats` reports, ready for JSON output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_workouts: usize,
    pub by_type: BTreeMap<String, u32>,
    pub by_muscle_group: BTreeMap<String, u32>,
    pub daily: Vec<DailyCount>,
    pub weekly: Vec<WeeklyCount>,
    pub current_streak: u32,
}

/// Workout statistics
pub struct Stats {
    start: NaiveDate,
    end: NaiveDate,
    logs: Vec<LogDetail>,
}

impl Stats {
    pub fn new(start: NaiveDate, end: NaiveDate, logs: Vec<LogDetail>) -> Result<Self> {
        if start > end {
            return Err(StoreError::Invalid(format!("start date {start} is after end date {end}")).into());
        }
        Ok(Self { start, end, logs })
    }

    /// Load a user's logs for the inclusive window `[start, end]`
    pub fn load(db: &Database, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StoreError::Invalid(format!("start date {start} is after end date {end}")).into());
        }
        let logs = db.log_details(user_id, start, end)?;
        Self::new(start, end, logs)
    }

    pub fn total_workouts(&self) -> usize {
        self.logs.len()
    }

    /// Workout count per exercise category
    pub fn by_type(&self) -> BTreeMap<String, u32> {
        count_by(&self.logs, |l| l.category.clone())
    }

    /// Workout count per primary muscle
    pub fn by_muscle_group(&self) -> BTreeMap<String, u32> {
        count_by(&self.logs, |l| l.primary_muscle.clone())
    }

    pub fn daily_frequency(&self) -> Vec<DailyCount> {
        count_by(&self.logs, |l| l.log.date.date_naive())
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }

    /// Counts per calendar week (Monday-based week of year), empty weeks omitted
    pub fn weekly_frequency(&self) -> Vec<WeeklyCount> {
        count_by(&self.logs, |l| {
            let date = l.log.date.date_naive();
            (date.year(), week_of_year(date))
        })
        .into_iter()
        .map(|((year, week), count)| WeeklyCount { year, week, count })
        .collect()
    }

    /// Consecutive days ending `today` with at least one workout
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let days = self.daily_frequency();
        let mut streak = 0;
        let mut day = today;
        while days.binary_search_by_key(&day, |d| d.date).is_ok() {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    pub fn summary(&self, today: NaiveDate) -> StatsSummary {
        StatsSummary {
            start: self.start,
            end: self.end,
            total_workouts: self.total_workouts(),
            by_type: self.by_type(),
            by_muscle_group: self.by_muscle_group(),
            daily: self.daily_frequency(),
            weekly: self.weekly_frequency(),
            current_streak: self.current_streak(today),
        }
    }
}

fn count_by<K: Ord>(logs: &[LogDetail], key: impl Fn(&LogDetail) -> K) -> BTreeMap<K, u32> {
    let mut counts = BTreeMap::new();
    for log in logs {
        *counts.entry(key(log)).or_insert(0) += 1;
    }
    counts
}

/// Week number with Monday as the first day; days before the first Monday are week 0
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_monday()) / 7
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WorkoutLog;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log_on(date: NaiveDate, category: &str, muscle: &str) -> LogDetail {
        LogDetail {
            log: WorkoutLog {
                id: None,
                user_id: 1,
                exercise_id: 1,
                plan_exercise_id: None,
                date: date.and_hms_opt(9, 30, 0).unwrap().and_utc(),
                sets: 3,
                reps: 10,
                duration_minutes: None,
                weight: None,
                notes: None,
            },
            exercise_name: "Squats".to_string(),
            category: category.to_string(),
            primary_muscle: muscle.to_string(),
        }
    }

    fn stats(logs: Vec<LogDetail>) -> Stats {
        Stats::new(day(2026, 10, 1), day(2026, 10, 19), logs).unwrap()
    }

    #[test]
    fn test_empty_stats() {
        let stats = stats(vec![]);
        assert_eq!(stats.total_workouts(), 0);
        assert!(stats.by_type().is_empty());
        assert!(stats.weekly_frequency().is_empty());
        assert_eq!(stats.current_streak(day(2026, 10, 19)), 0);
    }

    #[test]
    fn test_start_after_end_rejected() {
        let err = Stats::new(day(2026, 10, 19), day(2026, 10, 1), vec![]).err().unwrap();
        assert!(matches!(err.downcast::<StoreError>().unwrap(), StoreError::Invalid(_)));
    }

    #[test]
    fn test_distributions() {
        let stats = stats(vec![
            log_on(day(2026, 10, 5), "Strength", "Legs"),
            log_on(day(2026, 10, 5), "Strength", "Chest"),
            log_on(day(2026, 10, 6), "Cardio", "Cardio"),
        ]);
        assert_eq!(stats.by_type().get("Strength"), Some(&2));
        assert_eq!(stats.by_type().get("Cardio"), Some(&1));
        assert_eq!(stats.by_muscle_group().len(), 3);

        let daily = stats.daily_frequency();
        assert_eq!(daily, vec![
            DailyCount { date: day(2026, 10, 5), count: 2 },
            DailyCount { date: day(2026, 10, 6), count: 1 },
        ]);
    }

    #[test]
    fn test_weekly_frequency_monday_weeks() {
        let stats = stats(vec![
            log_on(day(2026, 10, 4), "Strength", "Legs"),
            log_on(day(2026, 10, 5), "Strength", "Legs"),
            log_on(day(2026, 10, 11), "Strength", "Legs"),
        ]);
        let weeks = stats.weekly_frequency();
        assert_eq!(weeks, vec![
            WeeklyCount { year: 2026, week: 39, count: 1 },
            WeeklyCount { year: 2026, week: 40, count: 2 },
        ]);
    }

    #[test]
    fn test_week_of_year_start() {
        // 2026-01-01 is a Thursday, the first Monday is 2026-01-05
        assert_eq!(week_of_year(day(2026, 1, 1)), 0);
        assert_eq!(week_of_year(day(2026, 1, 4)), 0);
        assert_eq!(week_of_year(day(2026, 1, 5)), 1);
    }

    #[test]
    fn test_current_streak() {
        let stats = stats(vec![
            log_on(day(2026, 10, 14), "Strength", "Legs"),
            log_on(day(2026, 10, 17), "Strength", "Legs"),
            log_on(day(2026, 10, 18), "Strength", "Legs"),
            log_on(day(2026, 10, 19), "Strength", "Legs"),
            log_on(day(2026, 10, 19), "Cardio", "Cardio"),
        ]);
        assert_eq!(stats.current_streak(day(2026, 10, 19)), 3);
        assert_eq!(stats.current_streak(day(2026, 10, 20)), 0);
    }

    #[test]
    fn test_load_from_database() {
        let db = Database::open(":memory:").unwrap();
        db.seed_default_catalog().unwrap();
        let user = db.create_user("testuser1", "test1@example.com").unwrap();
        let exercise = db.list_exercises().unwrap()[0].clone();
        db.log_workout(
            user,
            &crate::db::NewWorkoutLog {
                exercise_id: exercise.id,
                plan_exercise_id: None,
                date: day(2026, 10, 10).and_hms_opt(8, 0, 0).unwrap().and_utc(),
                sets: 3,
                reps: 10,
                duration_minutes: None,
                weight: None,
                notes: None,
            },
        )
        .unwrap();

        let stats = Stats::load(&db, user, day(2026, 10, 1), day(2026, 10, 19)).unwrap();
        let summary = stats.summary(day(2026, 10, 19));
        assert_eq!(summary.total_workouts, 1);
        assert_eq!(summary.by_muscle_group.get(&exercise.primary_muscle), Some(&1));
        assert_eq!(summary.current_streak, 0);
    }
}
