use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::enterprise::Enterprise;
use crate::database::models::normalize_optional;
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::tenant::TenantId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POST /api/v1/enterprises
pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Json(body): Json<EnterpriseRequest>,
) -> Result<(StatusCode, Json<Enterprise>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }

    let now = Utc::now();
    let enterprise = Enterprise {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        email: normalize_optional(body.email),
        phone: normalize_optional(body.phone),
        tenant_id: tenant.0,
        created_at: now,
        updated_at: now,
    };

    state.enterprises.insert(&enterprise).await?;
    Ok((StatusCode::CREATED, Json(enterprise)))
}

/// GET /api/v1/enterprises
pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
) -> Result<Json<Vec<Enterprise>>, AppError> {
    let enterprises = state.enterprises.list(&tenant.0).await?;
    Ok(Json(enterprises))
}

/// GET /api/v1/enterprises/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Enterprise>, AppError> {
    let enterprise = state
        .enterprises
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("enterprise not found"))?;
    Ok(Json(enterprise))
}

/// PUT /api/v1/enterprises/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(body): Json<EnterpriseRequest>,
) -> Result<Json<Enterprise>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }

    let mut stored = state
        .enterprises
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("enterprise not found"))?;

    stored.name = body.name.trim().to_string();
    stored.email = normalize_optional(body.email);
    stored.phone = normalize_optional(body.phone);
    stored.updated_at = Utc::now();

    state.enterprises.update(&stored).await?;
    Ok(Json(stored))
}

/// DELETE /api/v1/enterprises/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.enterprises.delete(&tenant.0, id).await?;
    if !deleted {
        return Err(AppError::not_found("enterprise not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
