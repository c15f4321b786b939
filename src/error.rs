//! Error types for plan generation and the storage layer

use thiserror::Error;

/// Fatal outcomes of a plan generation call
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("days_per_week must be between 1 and 7, got {0}")]
    InvalidFrequency(u32),

    #[error("unknown day archetype: {0}")]
    UnknownArchetype(String),

    /// A collaborator (catalog, history, plan store) failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Validation and lookup failures of the CRUD layer
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("plan {0} not found")]
    PlanNotFound(i64),

    #[error("day {0} not found")]
    DayNotFound(i64),

    #[error("exercise {0} not found")]
    ExerciseNotFound(i64),

    #[error("plan exercise {0} not found")]
    PlanExerciseNotFound(i64),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("workout log {0} not found")]
    LogNotFound(i64),

    #[error("invalid input: {0}")]
    Invalid(String),
}
