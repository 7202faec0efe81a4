use axum::extract::Extension;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::extract::Json;

/// GET /api/v1/auth/me - projection of the verified claims
pub async fn me(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "id": claims.sub,
        "email": claims.email,
        "name": claims.name,
        "tenantId": claims.tenant_id,
        "roleId": claims.role_id,
    }))
}
