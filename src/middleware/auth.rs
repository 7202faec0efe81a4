// Bearer extraction and verification. Verified claims are the only source of
// identity downstream; nothing is ever taken from the request body.
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::app::AppState;
use crate::error::AppError;

/// Require `Authorization: Bearer <token>`, verify it and place the decoded
/// `Claims` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = state.tokens.parse(&token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid Authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Authorization header must use the Bearer scheme"))?;

    if token.trim().is_empty() {
        return Err(AppError::unauthorized("empty bearer token"));
    }
    Ok(token.to_string())
}
