// Phyto analysis endpoints. Creation and update go through the aggregate
// writer; reads and delete use the pool-bound repository.
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::phyto_analysis::PhytoAnalysis;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::tenant::TenantId;
use crate::pagination;
use crate::services::analysis_service::{CreateAnalysisInput, UpdateAnalysisInput};

/// POST /api/v1/phyto-analyses
pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Json(body): Json<CreateAnalysisInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = state.analysis_service.create(&tenant.0, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub project_id: Uuid,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/phyto-analyses?projectId=<id>&limit=<n>&offset=<n>
pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PhytoAnalysis>>, AppError> {
    let limit = pagination::clamp_limit(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);
    let analyses = state
        .analyses
        .list_by_project(&tenant.0, query.project_id, limit, offset)
        .await?;
    Ok(Json(analyses))
}

/// GET /api/v1/phyto-analyses/:id - analysis together with its specimens
pub async fn get(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let analysis = state
        .analyses
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("phyto analysis not found"))?;

    let specimens = state.specimens.list_by_analysis(&tenant.0, id).await?;

    let mut body = serde_json::to_value(&analysis)
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Internal, "failed to serialize analysis", e))?;
    body["specimens"] = serde_json::to_value(&specimens)
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Internal, "failed to serialize specimens", e))?;
    Ok(Json(body))
}

/// GET /api/v1/phyto-analyses/project/:project_id
pub async fn list_by_project_path(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<PhytoAnalysis>>, AppError> {
    let analyses = state
        .analyses
        .list_by_project(&tenant.0, project_id, pagination::DEFAULT_LIMIT, 0)
        .await?;
    Ok(Json(analyses))
}

/// GET /api/v1/phyto-analyses/enterprise/:enterprise_id
pub async fn list_by_enterprise(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(enterprise_id): Path<Uuid>,
) -> Result<Json<Vec<PhytoAnalysis>>, AppError> {
    let analyses = state
        .analyses
        .list_by_enterprise(&tenant.0, enterprise_id)
        .await?;
    Ok(Json(analyses))
}

/// PUT /api/v1/phyto-analyses/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAnalysisInput>,
) -> Result<Json<PhytoAnalysis>, AppError> {
    let updated = state.analysis_service.update(&tenant.0, id, body).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/phyto-analyses/:id - cascades to specimens
pub async fn delete(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.analyses.delete(&tenant.0, id).await?;
    if !deleted {
        return Err(AppError::not_found("phyto analysis not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/phyto-analyses/:id/specimens
pub async fn specimens(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<crate::database::models::specimen::Specimen>>, AppError> {
    // 404 for an analysis the tenant does not own, even if the id exists
    state
        .analyses
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("phyto analysis not found"))?;

    let specimens = state.specimens.list_by_analysis(&tenant.0, id).await?;
    Ok(Json(specimens))
}
