use sqlx::PgPool;

use crate::db::models::Topic;

const COLUMNS: &str = "id, name, slug, description, display_order";

pub(crate) async fn list_ordered(pool: &PgPool) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!(
        "SELECT {COLUMNS} FROM topics ORDER BY display_order, id"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct UpsertTopic<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub display_order: i32,
}

/// Returns the topic id for `slug`, creating it when missing. Existing
/// rows are left untouched.
pub(crate) async fn get_or_create(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertTopic<'_>,
) -> Result<(i64, bool), sqlx::Error> {
    sqlx::query_as::<_, (i64, bool)>(
        "WITH inserted AS (
            INSERT INTO topics (name, slug, description, display_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id
         )
         SELECT id, TRUE FROM inserted
         UNION ALL
         SELECT id, FALSE FROM topics WHERE slug = $2
         LIMIT 1",
    )
    .bind(params.name)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.display_order)
    .fetch_one(executor)
    .await
}
