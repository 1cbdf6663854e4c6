use sqlx::PgPool;

use crate::db::models::{Submission, SubmissionHistoryRow};

const COLUMNS: &str =
    "id, user_id, problem_id, code, ai_feedback, is_correct, time_taken_seconds, created_at";

pub(crate) struct CreateSubmission<'a> {
    pub user_id: &'a str,
    pub problem_id: i64,
    pub code: &'a str,
    pub ai_feedback: Option<&'a str>,
    pub is_correct: bool,
    pub time_taken_seconds: Option<i32>,
    pub created_at: time::PrimitiveDateTime,
}

/// Submissions are append-only; nothing here updates or deletes them.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            user_id, problem_id, code, ai_feedback, is_correct, time_taken_seconds, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}"
    ))
    .bind(params.user_id)
    .bind(params.problem_id)
    .bind(params.code)
    .bind(params.ai_feedback)
    .bind(params.is_correct)
    .bind(params.time_taken_seconds)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_history(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<SubmissionHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionHistoryRow>(
        "SELECT s.id, p.title AS problem_title, s.code, s.ai_feedback, s.is_correct, s.created_at
         FROM submissions s
         JOIN problems p ON p.id = s.problem_id
         WHERE s.user_id = $1
         ORDER BY s.created_at DESC, s.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
pub(crate) async fn count_by_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
