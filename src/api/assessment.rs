use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::{state::AppState, time::primitive_now_utc};
use crate::repositories;
use crate::schemas::assessment::{
    AssessmentQuestion, AssessmentResultResponse, AssessmentSubmitRequest, DIAGNOSTIC_QUESTIONS,
};
use crate::services::ai_grading::BaselineSample;
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/questions", get(questions)).route("/submit", post(submit))
}

async fn questions(CurrentUser(_user): CurrentUser) -> Json<Vec<AssessmentQuestion>> {
    Json(DIAGNOSTIC_QUESTIONS.to_vec())
}

async fn submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AssessmentSubmitRequest>,
) -> Result<Json<AssessmentResultResponse>, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let samples: Vec<BaselineSample> = payload.submissions.into_iter().map(Into::into).collect();
    let result = state.grader().assess_baseline(&samples).await;

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let mut profile = repositories::profiles::lock_or_create(&mut *tx, &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock profile"))?;

    progress::apply_baseline(&mut profile, &result);
    profile.updated_at = now;

    repositories::profiles::save(&mut *tx, &profile)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save profile"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit assessment"))?;

    tracing::info!(
        user_id = %user.id,
        skill_level = %result.skill_level,
        answers = samples.len(),
        "Baseline assessment recorded"
    );

    Ok(Json(result.into()))
}
