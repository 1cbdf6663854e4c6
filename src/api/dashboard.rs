use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::{state::AppState, time::primitive_now_utc};
use crate::repositories;
use crate::schemas::dashboard::{build_learning_path, DashboardResponse, ProfileResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    repositories::profiles::ensure(state.db(), &user.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create profile"))?;
    let profile = repositories::profiles::find_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
        .ok_or_else(|| ApiError::internal("profile row missing", "Failed to load profile"))?;

    let topics = repositories::topics::list_ordered(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list topics"))?;
    let problems = repositories::problems::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list problems"))?;

    Ok(Json(DashboardResponse {
        profile: ProfileResponse::from_db(&user, profile),
        learning_path: build_learning_path(topics, problems),
    }))
}
