// POST /api/v1/auth/login - credential verification and token minting
use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::password;
use crate::error::AppError;
use crate::extract::Json;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticate a user by email and password and return a bearer token.
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::invalid("email and password are required"));
    }

    let user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    // bcrypt verification is CPU-bound; keep it off the async workers
    let presented = body.password;
    let stored = user.password_hash.clone();
    let matched = tokio::task::spawn_blocking(move || password::verify_password(&presented, &stored))
        .await
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Internal, "verification task failed", e))??;

    if !matched {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let token = state.tokens.mint(&user)?;
    Ok(Json(json!({ "accessToken": token })))
}
