//! Body weight history

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Database, format_timestamp};
use crate::error::StoreError;

/// Average weight on one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

impl Database {
    /// Record a weight (now when `date` is `None`) and make it the user's current weight
    pub fn log_weight(&self, user_id: i64, weight_kg: f64, date: Option<DateTime<Utc>>) -> Result<WeightEntry> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(StoreError::Invalid(format!("weight must be positive, got {weight_kg}")).into());
        }
        self.require_user(user_id)?;
        let date = date.unwrap_or_else(Utc::now);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO weight_history (user_id, date_logged, weight_kg) VALUES (?1, ?2, ?3)",
            params![user_id, format_timestamp(&date), weight_kg],
        )?;
        tx.execute("UPDATE users SET weight_kg = ?1 WHERE id = ?2", params![weight_kg, user_id])?;
        tx.commit()?;

        info!(user_id, weight_kg, "logged weight");
        Ok(WeightEntry {
            date: date.date_naive(),
            weight: weight_kg,
        })
    }

    /// Daily average weight within `[start, end]`, oldest first
    pub fn weight_history(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeightEntry>> {
        if start > end {
            return Err(StoreError::Invalid(format!("start date {start} is after end date {end}")).into());
        }
        let mut stmt = self.conn.prepare(
            "SELECT date(date_logged) AS day, AVG(weight_kg)
             FROM weight_history
             WHERE user_id = ?1 AND date(date_logged) BETWEEN ?2 AND ?3
             GROUP BY day
             ORDER BY day",
        )?;
        let rows = stmt
            .query_map(params![user_id, start.to_string(), end.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(day, weight)| -> Result<WeightEntry> {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")?;
                Ok(WeightEntry { date, weight })
            })
            .collect()
    }
}
