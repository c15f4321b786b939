//! fittrack - Workout tracker with rule-based training plan generation

pub mod db;
pub mod error;
pub mod exercises;
pub mod planner;
pub mod stats;
pub mod tui;

pub use db::Database;
pub use error::{PlanError, StoreError};
pub use planner::{GeneratedPlan, PlanRequest, generate_plan};
