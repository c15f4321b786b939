//! User training profile: experience level and fitness goal

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exercises::Difficulty;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }

    /// Like `parse`, anything unknown maps to Intermediate
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// Hardest difficulty this level may be prescribed
    pub fn difficulty_ceiling(&self) -> Difficulty {
        match self {
            ExperienceLevel::Beginner => Difficulty::Beginner,
            ExperienceLevel::Intermediate => Difficulty::Intermediate,
            ExperienceLevel::Advanced => Difficulty::Advanced,
        }
    }

    /// Difficulties up to and including the ceiling, easiest first
    pub fn allowed_difficulties(&self) -> Vec<Difficulty> {
        let ceiling = self.difficulty_ceiling();
        Difficulty::all()
            .iter()
            .copied()
            .filter(|d| *d <= ceiling)
            .collect()
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitnessGoal {
    Strength,
    Hypertrophy,
    Endurance,
    #[default]
    General,
}

/// Prescribed sets and reps for a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    pub sets: u32,
    pub reps: u32,
}

const GOAL_VOLUME: &[(FitnessGoal, Volume)] = &[
    (FitnessGoal::Strength, Volume { sets: 4, reps: 6 }),
    (FitnessGoal::Hypertrophy, Volume { sets: 3, reps: 10 }),
    (FitnessGoal::Endurance, Volume { sets: 3, reps: 15 }),
    (FitnessGoal::General, Volume { sets: 3, reps: 8 }),
];

impl FitnessGoal {
    /// Case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Some(FitnessGoal::Strength),
            "hypertrophy" => Some(FitnessGoal::Hypertrophy),
            "endurance" => Some(FitnessGoal::Endurance),
            "general" => Some(FitnessGoal::General),
            _ => None,
        }
    }

    /// Like `parse`, anything unknown maps to General
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::Strength => "strength",
            FitnessGoal::Hypertrophy => "hypertrophy",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::General => "general",
        }
    }

    pub fn base_volume(&self) -> Volume {
        GOAL_VOLUME
            .iter()
            .find(|(goal, _)| goal == self)
            .map(|(_, volume)| *volume)
            .unwrap_or(Volume { sets: 3, reps: 8 })
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only input to plan generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub experience_level: ExperienceLevel,
    /// None when the user never set a goal
    pub fitness_goal: Option<FitnessGoal>,
}

impl UserProfile {
    pub fn goal(&self) -> FitnessGoal {
        self.fitness_goal.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ceiling_prefix() {
        assert_eq!(
            ExperienceLevel::Beginner.allowed_difficulties(),
            vec![Difficulty::Beginner]
        );
        assert_eq!(
            ExperienceLevel::Intermediate.allowed_difficulties(),
            vec![Difficulty::Beginner, Difficulty::Intermediate]
        );
        assert_eq!(ExperienceLevel::Advanced.allowed_difficulties().len(), 3);
    }

    #[test]
    fn test_unknown_level_defaults_to_intermediate() {
        assert_eq!(ExperienceLevel::parse_lossy("pro"), ExperienceLevel::Intermediate);
        assert_eq!(ExperienceLevel::parse_lossy(" BEGINNER "), ExperienceLevel::Beginner);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(ExperienceLevel::parse("Advanced"), Some(ExperienceLevel::Advanced));
        assert_eq!(ExperienceLevel::parse("pro"), None);
        assert_eq!(FitnessGoal::parse(" general "), Some(FitnessGoal::General));
        assert_eq!(FitnessGoal::parse("weight loss"), None);
    }

    #[test]
    fn test_goal_volume_table() {
        assert_eq!(FitnessGoal::parse_lossy("Strength").base_volume(), Volume { sets: 4, reps: 6 });
        assert_eq!(FitnessGoal::parse_lossy("hypertrophy").base_volume(), Volume { sets: 3, reps: 10 });
        assert_eq!(FitnessGoal::parse_lossy("ENDURANCE").base_volume(), Volume { sets: 3, reps: 15 });
        assert_eq!(FitnessGoal::parse_lossy("weight loss").base_volume(), Volume { sets: 3, reps: 8 });
    }
}
