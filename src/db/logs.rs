//! Workout logs and training history

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Database, format_timestamp, parse_timestamp};
use crate::error::StoreError;
use crate::planner::{TrainingHistory, WeeklyCount};

/// Logged workout (one exercise performed on one occasion)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: Option<i64>,
    pub user_id: i64,
    pub exercise_id: i64,
    pub plan_exercise_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub sets: i32,
    pub reps: i32,
    pub duration_minutes: Option<f64>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

/// Log entry as submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutLog {
    pub exercise_id: i64,
    pub plan_exercise_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub sets: i32,
    pub reps: i32,
    pub duration_minutes: Option<f64>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

/// Fields to change on an existing log; `None` leaves a field as it is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutLogPatch {
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<f64>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

impl WorkoutLogPatch {
    pub fn is_empty(&self) -> bool {
        self.sets.is_none()
            && self.reps.is_none()
            && self.duration_minutes.is_none()
            && self.weight.is_none()
            && self.notes.is_none()
    }
}

/// Log joined with the catalog fields the stats need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogDetail {
    pub log: WorkoutLog,
    pub exercise_name: String,
    pub category: String,
    pub primary_muscle: String,
}

const LOG_COLUMNS: &str = "l.id, l.user_id, l.exercise_id, l.plan_exercise_id, l.date, l.sets, l.reps, \
                           l.duration_minutes, l.weight, l.notes";

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutLog> {
    let date: String = row.get(4)?;
    Ok(WorkoutLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        exercise_id: row.get(2)?,
        plan_exercise_id: row.get(3)?,
        date: parse_timestamp(&date),
        sets: row.get(5)?,
        reps: row.get(6)?,
        duration_minutes: row.get(7)?,
        weight: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn validate_amounts(sets: Option<i32>, reps: Option<i32>, duration: Option<f64>, weight: Option<f64>) -> Result<()> {
    if sets.is_some_and(|s| s < 0) || reps.is_some_and(|r| r < 0) {
        return Err(StoreError::Invalid("sets and reps must not be negative".to_string()).into());
    }
    if weight.is_some_and(|w| w < 0.0) {
        return Err(StoreError::Invalid("weight must not be negative".to_string()).into());
    }
    if duration.is_some_and(|d| d < 0.0) {
        return Err(StoreError::Invalid("duration must not be negative".to_string()).into());
    }
    Ok(())
}

fn validate_log(entry: &NewWorkoutLog) -> Result<()> {
    validate_amounts(Some(entry.sets), Some(entry.reps), entry.duration_minutes, entry.weight)
}

impl Database {
    /// Record a workout, returns the stored row
    pub fn log_workout(&self, user_id: i64, entry: &NewWorkoutLog) -> Result<WorkoutLog> {
        validate_log(entry)?;
        self.require_user(user_id)?;
        if self.get_exercise(entry.exercise_id)?.is_none() {
            return Err(StoreError::ExerciseNotFound(entry.exercise_id).into());
        }

        if let Some(plan_exercise_id) = entry.plan_exercise_id {
            if self.plan_exercise_owner(plan_exercise_id)? != Some(user_id) {
                return Err(StoreError::PlanExerciseNotFound(plan_exercise_id).into());
            }
            let scheduled = self
                .get_plan_exercise(plan_exercise_id)?
                .ok_or(StoreError::PlanExerciseNotFound(plan_exercise_id))?;
            if scheduled.exercise_id != entry.exercise_id {
                return Err(StoreError::Invalid(format!(
                    "exercise {} does not match plan exercise {plan_exercise_id} ({})",
                    entry.exercise_id, scheduled.name
                ))
                .into());
            }
        }

        self.conn.execute(
            "INSERT INTO workout_logs (user_id, exercise_id, plan_exercise_id, date, sets, reps,
                                       duration_minutes, weight, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                entry.exercise_id,
                entry.plan_exercise_id,
                format_timestamp(&entry.date),
                entry.sets,
                entry.reps,
                entry.duration_minutes,
                entry.weight,
                entry.notes,
            ],
        )?;

        Ok(WorkoutLog {
            id: Some(self.conn.last_insert_rowid()),
            user_id,
            exercise_id: entry.exercise_id,
            plan_exercise_id: entry.plan_exercise_id,
            date: entry.date,
            sets: entry.sets,
            reps: entry.reps,
            duration_minutes: entry.duration_minutes,
            weight: entry.weight,
            notes: entry.notes.clone(),
        })
    }

    /// All logs of a user, newest first
    pub fn list_logs(&self, user_id: i64) -> Result<Vec<WorkoutLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs l WHERE l.user_id = ?1 ORDER BY l.date DESC, l.id DESC"
        ))?;
        let logs = stmt
            .query_map(params![user_id], log_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    /// Log owned by `user_id`; other users' logs are reported as missing
    pub fn get_log(&self, user_id: i64, log_id: i64) -> Result<WorkoutLog> {
        self.conn
            .query_row(
                &format!("SELECT {LOG_COLUMNS} FROM workout_logs l WHERE l.id = ?1 AND l.user_id = ?2"),
                params![log_id, user_id],
                log_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::LogNotFound(log_id).into())
    }

    /// Change the given fields of a log, returns the updated row
    pub fn update_log(&self, user_id: i64, log_id: i64, patch: &WorkoutLogPatch) -> Result<WorkoutLog> {
        validate_amounts(patch.sets, patch.reps, patch.duration_minutes, patch.weight)?;
        if patch.is_empty() {
            return Err(StoreError::Invalid("no fields to update".to_string()).into());
        }
        self.get_log(user_id, log_id)?;

        self.conn.execute(
            "UPDATE workout_logs
             SET sets = COALESCE(?1, sets),
                 reps = COALESCE(?2, reps),
                 duration_minutes = COALESCE(?3, duration_minutes),
                 weight = COALESCE(?4, weight),
                 notes = COALESCE(?5, notes)
             WHERE id = ?6 AND user_id = ?7",
            params![
                patch.sets,
                patch.reps,
                patch.duration_minutes,
                patch.weight,
                patch.notes,
                log_id,
                user_id,
            ],
        )?;
        debug!(log_id, user_id, "updated workout log");
        self.get_log(user_id, log_id)
    }

    pub fn delete_log(&self, user_id: i64, log_id: i64) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM workout_logs WHERE id = ?1 AND user_id = ?2",
            params![log_id, user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::LogNotFound(log_id).into());
        }
        Ok(())
    }

    /// Logs dated within `[start, end]` joined with their catalog entry, oldest first
    pub fn log_details(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<LogDetail>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS}, e.name, e.category, e.primary_muscle
             FROM workout_logs l
             JOIN exercises e ON e.id = l.exercise_id
             WHERE l.user_id = ?1 AND date(l.date) BETWEEN ?2 AND ?3
             ORDER BY l.date, l.id"
        ))?;
        let details = stmt
            .query_map(params![user_id, start.to_string(), end.to_string()], |row| {
                Ok(LogDetail {
                    log: log_from_row(row)?,
                    exercise_name: row.get(10)?,
                    category: row.get(11)?,
                    primary_muscle: row.get(12)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(details)
    }
}

impl TrainingHistory for Database {
    fn recent_logs(&self, user_id: i64, weeks: u32) -> Result<Vec<WorkoutLog>> {
        let since = Utc::now() - Duration::weeks(i64::from(weeks));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs l
             WHERE l.user_id = ?1 AND l.date >= ?2
             ORDER BY l.date DESC, l.id DESC"
        ))?;
        let logs = stmt
            .query_map(params![user_id, format_timestamp(&since)], log_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    fn weekly_frequency(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeeklyCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(strftime('%Y', date) AS INTEGER) AS year,
                    CAST(strftime('%W', date) AS INTEGER) AS week,
                    COUNT(*)
             FROM workout_logs
             WHERE user_id = ?1 AND date(date) BETWEEN ?2 AND ?3
             GROUP BY year, week
             ORDER BY year, week",
        )?;
        let weeks = stmt
            .query_map(params![user_id, start.to_string(), end.to_string()], |row| {
                Ok(WeeklyCount {
                    year: row.get(0)?,
                    week: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(user_id, %start, %end, weeks = weeks.len(), "weekly frequency");
        Ok(weeks)
    }
}
