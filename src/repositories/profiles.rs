use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::Profile;
use crate::db::types::SkillLevel;

const COLUMNS: &str =
    "user_id, skill_level, problems_solved, topic_strength, assessment_completed, updated_at";

/// Inserts an initial profile unless one exists.
pub(crate) async fn ensure(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (user_id, skill_level, problems_solved, topic_strength,
                               assessment_completed, updated_at)
         VALUES ($1, $2, 0, '{}'::jsonb, FALSE, $3)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(SkillLevel::Beginner)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn find_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Row-locks the profile for the rest of the enclosing transaction, which
/// serializes concurrent progress updates for the same user.
pub(crate) async fn lock_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Get-or-create followed by a row lock; call inside a transaction.
pub(crate) async fn lock_or_create(
    conn: &mut sqlx::PgConnection,
    user_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<Profile, sqlx::Error> {
    ensure(&mut *conn, user_id, now).await?;
    lock_for_update(&mut *conn, user_id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub(crate) async fn save(
    executor: impl sqlx::PgExecutor<'_>,
    profile: &Profile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE profiles SET
            skill_level = $1,
            problems_solved = $2,
            topic_strength = $3,
            assessment_completed = $4,
            updated_at = $5
         WHERE user_id = $6",
    )
    .bind(profile.skill_level)
    .bind(profile.problems_solved)
    .bind(Json(&profile.topic_strength.0))
    .bind(profile.assessment_completed)
    .bind(profile.updated_at)
    .bind(&profile.user_id)
    .execute(executor)
    .await?;
    Ok(())
}
