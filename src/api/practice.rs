use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::{state::AppState, time::primitive_now_utc};
use crate::repositories;
use crate::schemas::submission::{
    AskRequest, AskResponse, GradeResponse, HistoryItem, ResetResponse, SubmitCodeRequest,
};
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submit/:problem_id", post(submit))
        .route("/reset", post(reset))
        .route("/ask", post(ask))
        .route("/history", get(history))
}

async fn submit(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i64>,
    Json(payload): Json<SubmitCodeRequest>,
) -> Result<Json<GradeResponse>, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let problem = repositories::problems::find_with_topic(state.db(), problem_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch problem"))?
        .ok_or(ApiError::NotFound("Problem not found"))?;

    let verdict = state.grader().grade_submission(&problem.description, &payload.code).await;

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::submissions::create(
        &mut *tx,
        repositories::submissions::CreateSubmission {
            user_id: &user.id,
            problem_id: problem.id,
            code: &payload.code,
            ai_feedback: Some(&verdict.feedback),
            is_correct: verdict.is_correct,
            time_taken_seconds: payload.time_taken,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store submission"))?;

    if verdict.is_correct {
        let mut profile = repositories::profiles::lock_or_create(&mut *tx, &user.id, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to lock profile"))?;

        let outcome =
            progress::apply_grading(&mut profile, problem.topic_name.as_deref(), verdict.is_correct);
        profile.updated_at = now;

        repositories::profiles::save(&mut *tx, &profile)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to save profile"))?;

        if let Some(level) = outcome.promoted_to {
            tracing::info!(user_id = %user.id, skill_level = %level, "Learner promoted");
        }
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit submission"))?;

    let outcome_label = if verdict.is_correct { "correct" } else { "incorrect" };
    metrics::counter!("submissions_graded_total", "outcome" => outcome_label).increment(1);
    tracing::info!(
        user_id = %user.id,
        problem_id = problem.id,
        is_correct = verdict.is_correct,
        "Submission graded"
    );

    Ok(Json(GradeResponse { is_correct: verdict.is_correct, feedback: verdict.feedback }))
}

async fn reset(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ResetResponse>, ApiError> {
    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let mut profile = repositories::profiles::lock_or_create(&mut *tx, &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock profile"))?;

    progress::reset(&mut profile);
    profile.updated_at = now;

    repositories::profiles::save(&mut *tx, &profile)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save profile"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit reset"))?;

    tracing::info!(user_id = %user.id, "Profile reset");

    Ok(Json(ResetResponse { status: "reset" }))
}

async fn ask(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let answer = state
        .grader()
        .explain(
            payload.context.as_deref().unwrap_or_default(),
            payload.code.as_deref().unwrap_or_default(),
            &payload.question,
        )
        .await;

    Ok(Json(AskResponse { answer }))
}

async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    let rows = repositories::submissions::list_history(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load history"))?;

    Ok(Json(rows.into_iter().map(HistoryItem::from).collect()))
}
