//! Plans, plan days and plan exercises

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Database, format_timestamp};
use crate::error::StoreError;
use crate::planner::{NewPlan, PlanStore};

/// Stored training plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub days_per_week: u32,
    pub preferred_days: Option<String>,
    pub is_active: bool,
}

/// Editable plan fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    pub description: Option<String>,
    pub days_per_week: u32,
    pub preferred_days: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDay {
    pub id: i64,
    pub plan_id: i64,
    pub day_number: u32,
    pub description: Option<String>,
}

/// Exercise scheduled on a plan day, joined with its catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanExercise {
    pub id: i64,
    pub plan_day_id: i64,
    pub exercise_id: i64,
    pub name: String,
    pub category: String,
    pub primary_muscle: String,
    pub base_sets: Option<u32>,
    pub base_reps: Option<u32>,
    pub base_duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDayDetail {
    pub day: PlanDay,
    pub exercises: Vec<PlanExercise>,
}

/// Plan with every day and exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDetail {
    pub plan: Plan,
    pub days: Vec<PlanDayDetail>,
}

const PLAN_COLUMNS: &str = "id, user_id, name, description, days_per_week, preferred_days, is_active";

const PLAN_EXERCISE_SELECT: &str = "SELECT pe.id, pe.plan_day_id, pe.exercise_id, e.name, e.category, e.primary_muscle,
                                           e.base_sets, e.base_reps, e.base_duration
                                    FROM plan_exercises pe
                                    JOIN exercises e ON e.id = pe.exercise_id";

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        days_per_week: row.get(4)?,
        preferred_days: row.get(5)?,
        is_active: row.get(6)?,
    })
}

fn day_from_row(row: &Row<'_>) -> rusqlite::Result<PlanDay> {
    Ok(PlanDay {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        day_number: row.get(2)?,
        description: row.get(3)?,
    })
}

fn plan_exercise_from_row(row: &Row<'_>) -> rusqlite::Result<PlanExercise> {
    Ok(PlanExercise {
        id: row.get(0)?,
        plan_day_id: row.get(1)?,
        exercise_id: row.get(2)?,
        name: row.get(3)?,
        category: row.get(4)?,
        primary_muscle: row.get(5)?,
        base_sets: row.get(6)?,
        base_reps: row.get(7)?,
        base_duration: row.get(8)?,
    })
}

fn validate_days_per_week(days: u32) -> Result<()> {
    if !(1..=7).contains(&days) {
        return Err(StoreError::Invalid(format!("days_per_week must be between 1 and 7, got {days}")).into());
    }
    Ok(())
}

fn validate_day_number(day_number: u32) -> Result<()> {
    if day_number < 1 {
        return Err(StoreError::Invalid("day_number must be at least 1".to_string()).into());
    }
    Ok(())
}

fn insert_plan(
    conn: &Connection,
    user_id: i64,
    draft: &PlanDraft,
    is_active: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO plans (user_id, name, description, days_per_week, preferred_days, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            draft.name,
            draft.description,
            draft.days_per_week,
            draft.preferred_days,
            is_active,
            format_timestamp(&Utc::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_plan_day(conn: &Connection, plan_id: i64, day_number: u32, description: Option<&str>) -> Result<i64> {
    conn.execute(
        "INSERT INTO plan_days (plan_id, day_number, description) VALUES (?1, ?2, ?3)",
        params![plan_id, day_number, description],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_plan_exercise(conn: &Connection, plan_day_id: i64, exercise_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO plan_exercises (plan_day_id, exercise_id) VALUES (?1, ?2)",
        params![plan_day_id, exercise_id],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Create an empty, inactive plan
    pub fn create_plan(&self, user_id: i64, draft: &PlanDraft) -> Result<Plan> {
        self.require_user(user_id)?;
        validate_days_per_week(draft.days_per_week)?;
        let id = insert_plan(&self.conn, user_id, draft, false)?;
        self.get_plan(user_id, id)
    }

    /// Plan owned by `user_id`; other users' plans are reported as missing
    pub fn get_plan(&self, user_id: i64, plan_id: i64) -> Result<Plan> {
        self.conn
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1 AND user_id = ?2"),
                params![plan_id, user_id],
                plan_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::PlanNotFound(plan_id).into())
    }

    pub fn list_plans(&self, user_id: i64) -> Result<Vec<Plan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PLAN_COLUMNS} FROM plans WHERE user_id = ?1 ORDER BY id"))?;
        let plans = stmt
            .query_map(params![user_id], plan_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }

    /// The user's active plan, if any
    pub fn active_plan(&self, user_id: i64) -> Result<Option<Plan>> {
        let plan = self
            .conn
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE user_id = ?1 AND is_active = 1"),
                params![user_id],
                plan_from_row,
            )
            .optional()?;
        Ok(plan)
    }

    pub fn update_plan(&self, user_id: i64, plan_id: i64, draft: &PlanDraft) -> Result<Plan> {
        self.get_plan(user_id, plan_id)?;
        validate_days_per_week(draft.days_per_week)?;
        self.conn.execute(
            "UPDATE plans SET name = ?1, description = ?2, days_per_week = ?3, preferred_days = ?4 WHERE id = ?5",
            params![draft.name, draft.description, draft.days_per_week, draft.preferred_days, plan_id],
        )?;
        self.get_plan(user_id, plan_id)
    }

    /// Delete a plan together with its days and scheduled exercises
    pub fn delete_plan(&self, user_id: i64, plan_id: i64) -> Result<()> {
        self.get_plan(user_id, plan_id)?;
        self.conn.execute("DELETE FROM plans WHERE id = ?1", params![plan_id])?;
        info!(plan_id, user_id, "deleted plan");
        Ok(())
    }

    /// Make one plan active, deactivating the user's others
    pub fn set_active_plan(&self, user_id: i64, plan_id: i64) -> Result<Plan> {
        self.get_plan(user_id, plan_id)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE plans SET is_active = 0 WHERE user_id = ?1", params![user_id])?;
        tx.execute("UPDATE plans SET is_active = 1 WHERE id = ?1", params![plan_id])?;
        tx.commit()?;
        info!(plan_id, user_id, "activated plan");
        self.get_plan(user_id, plan_id)
    }

    pub fn create_plan_day(
        &self,
        user_id: i64,
        plan_id: i64,
        day_number: u32,
        description: Option<&str>,
    ) -> Result<PlanDay> {
        self.get_plan(user_id, plan_id)?;
        validate_day_number(day_number)?;
        let id = insert_plan_day(&self.conn, plan_id, day_number, description)?;
        self.get_plan_day(user_id, plan_id, id)
    }

    pub fn get_plan_day(&self, user_id: i64, plan_id: i64, day_id: i64) -> Result<PlanDay> {
        self.get_plan(user_id, plan_id)?;
        self.conn
            .query_row(
                "SELECT id, plan_id, day_number, description FROM plan_days WHERE id = ?1 AND plan_id = ?2",
                params![day_id, plan_id],
                day_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::DayNotFound(day_id).into())
    }

    /// Days of a plan ordered by day number
    pub fn list_plan_days(&self, user_id: i64, plan_id: i64) -> Result<Vec<PlanDay>> {
        self.get_plan(user_id, plan_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, day_number, description FROM plan_days WHERE plan_id = ?1 ORDER BY day_number, id",
        )?;
        let days = stmt
            .query_map(params![plan_id], day_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(days)
    }

    pub fn update_plan_day(
        &self,
        user_id: i64,
        plan_id: i64,
        day_id: i64,
        day_number: u32,
        description: Option<&str>,
    ) -> Result<PlanDay> {
        self.get_plan_day(user_id, plan_id, day_id)?;
        validate_day_number(day_number)?;
        self.conn.execute(
            "UPDATE plan_days SET day_number = ?1, description = ?2 WHERE id = ?3",
            params![day_number, description, day_id],
        )?;
        self.get_plan_day(user_id, plan_id, day_id)
    }

    pub fn delete_plan_day(&self, user_id: i64, plan_id: i64, day_id: i64) -> Result<()> {
        self.get_plan_day(user_id, plan_id, day_id)?;
        self.conn.execute("DELETE FROM plan_days WHERE id = ?1", params![day_id])?;
        Ok(())
    }

    /// Schedule a catalog exercise on a plan day
    pub fn add_exercise_to_day(&self, user_id: i64, plan_id: i64, day_id: i64, exercise_id: i64) -> Result<PlanExercise> {
        self.get_plan_day(user_id, plan_id, day_id)?;
        if self.get_exercise(exercise_id)?.is_none() {
            return Err(StoreError::ExerciseNotFound(exercise_id).into());
        }
        let id = insert_plan_exercise(&self.conn, day_id, exercise_id)?;
        self.get_plan_exercise(id)?
            .ok_or_else(|| StoreError::PlanExerciseNotFound(id).into())
    }

    pub fn list_plan_exercises(&self, user_id: i64, plan_id: i64, day_id: i64) -> Result<Vec<PlanExercise>> {
        self.get_plan_day(user_id, plan_id, day_id)?;
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAN_EXERCISE_SELECT} WHERE pe.plan_day_id = ?1 ORDER BY pe.id"))?;
        let exercises = stmt
            .query_map(params![day_id], plan_exercise_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exercises)
    }

    pub fn remove_exercise_from_day(
        &self,
        user_id: i64,
        plan_id: i64,
        day_id: i64,
        plan_exercise_id: i64,
    ) -> Result<()> {
        self.get_plan_day(user_id, plan_id, day_id)?;
        let removed = self.conn.execute(
            "DELETE FROM plan_exercises WHERE id = ?1 AND plan_day_id = ?2",
            params![plan_exercise_id, day_id],
        )?;
        if removed == 0 {
            return Err(StoreError::PlanExerciseNotFound(plan_exercise_id).into());
        }
        Ok(())
    }

    /// Plan exercise by id regardless of owner
    pub fn get_plan_exercise(&self, plan_exercise_id: i64) -> Result<Option<PlanExercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("{PLAN_EXERCISE_SELECT} WHERE pe.id = ?1"),
                params![plan_exercise_id],
                plan_exercise_from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Owner of the plan a plan exercise belongs to
    pub(crate) fn plan_exercise_owner(&self, plan_exercise_id: i64) -> Result<Option<i64>> {
        let owner = self
            .conn
            .query_row(
                "SELECT p.user_id FROM plan_exercises pe
                 JOIN plan_days d ON d.id = pe.plan_day_id
                 JOIN plans p ON p.id = d.plan_id
                 WHERE pe.id = ?1",
                params![plan_exercise_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(owner)
    }

    /// Full plan tree for display
    pub fn plan_detail(&self, user_id: i64, plan_id: i64) -> Result<PlanDetail> {
        let plan = self.get_plan(user_id, plan_id)?;
        let mut days = Vec::new();
        for day in self.list_plan_days(user_id, plan_id)? {
            let exercises = self.list_plan_exercises(user_id, plan_id, day.id)?;
            days.push(PlanDayDetail { day, exercises });
        }
        Ok(PlanDetail { plan, days })
    }
}

impl PlanStore for Database {
    fn commit_plan(&self, plan: &NewPlan) -> Result<i64> {
        self.require_user(plan.user_id)?;
        validate_days_per_week(plan.days_per_week)?;

        let draft = PlanDraft {
            name: plan.name.clone(),
            description: plan.description.clone(),
            days_per_week: plan.days_per_week,
            preferred_days: plan.preferred_days.clone(),
        };

        let tx = self.conn.unchecked_transaction()?;
        let plan_id = insert_plan(&tx, plan.user_id, &draft, plan.is_active)?;
        for day in &plan.days {
            validate_day_number(day.day_number)?;
            let day_id = insert_plan_day(&tx, plan_id, day.day_number, Some(&day.description))?;
            for exercise_id in &day.exercise_ids {
                insert_plan_exercise(&tx, day_id, *exercise_id)?;
            }
        }
        tx.commit()?;

        info!(plan_id, user_id = plan.user_id, days = plan.days.len(), "committed plan");
        Ok(plan_id)
    }
}
