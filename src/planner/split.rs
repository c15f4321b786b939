//! Weekly split selection: training frequency -> ordered day archetypes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Named day theme deciding which muscle groups get trained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Archetype {
    FullBody,
    UpperBody,
    LowerBody,
    Push,
    Pull,
    Legs,
    ChestTriceps,
    BackBiceps,
    Shoulders,
    CardioCore,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::FullBody => "Full-Body",
            Archetype::UpperBody => "Upper Body",
            Archetype::LowerBody => "Lower Body",
            Archetype::Push => "Push",
            Archetype::Pull => "Pull",
            Archetype::Legs => "Legs",
            Archetype::ChestTriceps => "Chest + Triceps",
            Archetype::BackBiceps => "Back + Biceps",
            Archetype::Shoulders => "Shoulders",
            Archetype::CardioCore => "Cardio/Core",
        }
    }

    pub fn all() -> &'static [Archetype] {
        &[
            Archetype::FullBody,
            Archetype::UpperBody,
            Archetype::LowerBody,
            Archetype::Push,
            Archetype::Pull,
            Archetype::Legs,
            Archetype::ChestTriceps,
            Archetype::BackBiceps,
            Archetype::Shoulders,
            Archetype::CardioCore,
        ]
    }

    /// Look up an archetype by its display name
    pub fn from_name(name: &str) -> Result<Self, PlanError> {
        Self::all()
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .ok_or_else(|| PlanError::UnknownArchetype(name.to_string()))
    }

    /// Description used for the plan day, e.g. "Pull Day"
    pub fn day_description(&self) -> String {
        format!("{} Day", self.name())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use Archetype::{BackBiceps, CardioCore, ChestTriceps, FullBody, Legs, LowerBody, Pull, Push, Shoulders, UpperBody};

/// Split per training frequency, index 0 = one day per week
const SPLITS: [&[Archetype]; 7] = [
    &[FullBody],
    &[UpperBody, LowerBody],
    &[Push, Pull, Legs],
    &[ChestTriceps, BackBiceps, Shoulders, Legs],
    &[Push, Pull, Legs, Push, Legs],
    &[Push, Pull, Legs, Push, Pull, Legs],
    &[Push, Pull, Legs, Push, Pull, Legs, CardioCore],
];

/// Ordered day archetypes for a weekly frequency of 1..=7
pub fn plan_split(days_per_week: u32) -> Result<&'static [Archetype], PlanError> {
    match days_per_week {
        1..=7 => Ok(SPLITS[days_per_week as usize - 1]),
        _ => Err(PlanError::InvalidFrequency(days_per_week)),
    }
}
