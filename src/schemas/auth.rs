use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterRequest {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) token: String,
    pub(crate) username: String,
}
