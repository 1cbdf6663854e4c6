use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::validation::validate_username;
use crate::core::{security, state::AppState, time::primitive_now_utc};
use crate::repositories;
use crate::schemas::auth::{LoginRequest, RegisterRequest, TokenResponse};

/// Max attempts per window for register/login.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/register", post(register)).route("/login", post(login))
}

async fn enforce_rate_limit(
    state: &AppState,
    action: &str,
    username: &str,
    message: &'static str,
) -> Result<(), ApiError> {
    let rate_key = format!("rl:{action}:{username}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests(message))
    }
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    validate_username(&payload.username)?;
    payload.validate().map_err(ApiError::validation)?;

    enforce_rate_limit(
        &state,
        "register",
        &payload.username,
        "Too many registration attempts, try again later",
    )
    .await?;

    let exists = repositories::users::exists_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if exists {
        return Err(ApiError::Conflict("Username already exists"));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username: &payload.username,
            hashed_password,
            is_active: true,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?
    .ok_or(ApiError::Conflict("Username already exists"))?;

    repositories::profiles::ensure(&mut *tx, &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create profile"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit registration"))?;

    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(TokenResponse { token, username: user.username })))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    enforce_rate_limit(
        &state,
        "login",
        &payload.username,
        "Too many login attempts, try again later",
    )
    .await?;

    let user = repositories::users::find_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials"))?;
    if !verified || !user.is_active {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(Json(TokenResponse { token, username: user.username }))
}
