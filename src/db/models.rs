use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{Difficulty, SkillLevel};

/// Topic name → strength in `[0, 1]`.
pub(crate) type TopicStrength = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub(crate) struct Profile {
    pub(crate) user_id: String,
    pub(crate) skill_level: SkillLevel,
    pub(crate) problems_solved: i32,
    pub(crate) topic_strength: Json<TopicStrength>,
    pub(crate) assessment_completed: bool,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Topic {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Problem {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) topic_id: Option<i64>,
    pub(crate) starter_code: String,
}

/// Problem joined with its topic name, which is the key used in
/// `Profile::topic_strength`.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProblemWithTopic {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) topic_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) problem_id: i64,
    pub(crate) code: String,
    pub(crate) ai_feedback: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) time_taken_seconds: Option<i32>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SubmissionHistoryRow {
    pub(crate) id: i64,
    pub(crate) problem_title: String,
    pub(crate) code: String,
    pub(crate) ai_feedback: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) created_at: PrimitiveDateTime,
}
