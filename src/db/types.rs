use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Learner level stored on a profile. Only the progress rules move it upward;
/// a baseline assessment or reset may set it to any value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "skilllevel")]
pub(crate) enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Lenient parse for model output: exact names, any case.
    pub(crate) fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "difficultylevel")]
pub(crate) enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_level_serializes_as_title_case() {
        assert_eq!(serde_json::to_value(SkillLevel::Intermediate).unwrap(), "Intermediate");
        assert_eq!(serde_json::to_value(Difficulty::Advanced).unwrap(), "Advanced");
    }

    #[test]
    fn parse_loose_accepts_any_case_only() {
        assert_eq!(SkillLevel::parse_loose(" advanced "), Some(SkillLevel::Advanced));
        assert_eq!(SkillLevel::parse_loose("BEGINNER"), Some(SkillLevel::Beginner));
        assert_eq!(SkillLevel::parse_loose("Expert"), None);
        assert_eq!(SkillLevel::parse_loose(""), None);
    }
}
