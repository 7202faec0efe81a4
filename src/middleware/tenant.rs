// Tenant binding. Runs inside the auth layer: the tenant id is derived from
// verified claims, never from request input, and lives under its own typed
// extension so downstream code cannot alias it with other strings.
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::Claims;
use crate::error::AppError;

/// Tenant id extracted from verified claims
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantId(pub String);

pub async fn tenant_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::unauthorized("authentication required before tenant binding"))?;

    if claims.tenant_id.is_empty() {
        return Err(AppError::forbidden("user is not bound to a tenant"));
    }

    let tenant = TenantId(claims.tenant_id.clone());
    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}
