use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::SubmissionHistoryRow;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Code is required"))]
    pub(crate) code: String,
    #[serde(default, alias = "time_taken_seconds")]
    #[validate(range(min = 0, message = "time_taken must not be negative"))]
    pub(crate) time_taken: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) is_correct: bool,
    pub(crate) feedback: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AskRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question is required"))]
    pub(crate) question: String,
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) context: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AskResponse {
    pub(crate) answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetResponse {
    pub(crate) status: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryItem {
    pub(crate) id: i64,
    pub(crate) problem_title: String,
    pub(crate) code: String,
    pub(crate) ai_feedback: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) timestamp: String,
}

impl From<SubmissionHistoryRow> for HistoryItem {
    fn from(row: SubmissionHistoryRow) -> Self {
        Self {
            id: row.id,
            problem_title: row.problem_title,
            code: row.code,
            ai_feedback: row.ai_feedback,
            is_correct: row.is_correct,
            timestamp: format_primitive(row.created_at),
        }
    }
}
