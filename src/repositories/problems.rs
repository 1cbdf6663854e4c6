use sqlx::PgPool;

use crate::db::models::{Problem, ProblemWithTopic};
use crate::db::types::Difficulty;

const COLUMNS: &str = "id, title, description, difficulty, topic_id, starter_code";

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Problem>, sqlx::Error> {
    sqlx::query_as::<_, Problem>(&format!("SELECT {COLUMNS} FROM problems ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn find_with_topic(
    pool: &PgPool,
    id: i64,
) -> Result<Option<ProblemWithTopic>, sqlx::Error> {
    sqlx::query_as::<_, ProblemWithTopic>(
        "SELECT p.id, p.title, p.description, t.name AS topic_name
         FROM problems p
         LEFT JOIN topics t ON t.id = p.topic_id
         WHERE p.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateProblem<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub difficulty: Difficulty,
    pub topic_id: Option<i64>,
    pub starter_code: Option<&'a str>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateProblem<'_>,
) -> Result<Problem, sqlx::Error> {
    sqlx::query_as::<_, Problem>(&format!(
        "INSERT INTO problems (title, description, difficulty, topic_id, starter_code)
         VALUES ($1, $2, $3, $4, COALESCE($5, E'# Write your code here\\n'))
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.difficulty)
    .bind(params.topic_id)
    .bind(params.starter_code)
    .fetch_one(executor)
    .await
}

pub(crate) async fn exists_by_title(
    executor: impl sqlx::PgExecutor<'_>,
    title: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM problems WHERE title = $1)")
        .bind(title)
        .fetch_one(executor)
        .await
}
