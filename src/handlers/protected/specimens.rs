// Standalone specimen CRUD. Unlike the aggregate path, callers reference the
// species and analysis by id; ownership of the analysis is checked against
// the caller's tenant before any write.
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::specimen::Specimen;
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::tenant::TenantId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenRequest {
    pub portion: String,
    pub height: f64,
    pub cap1: f64,
    #[serde(default)]
    pub cap2: Option<f64>,
    #[serde(default)]
    pub cap3: Option<f64>,
    #[serde(default)]
    pub cap4: Option<f64>,
    #[serde(default)]
    pub cap5: Option<f64>,
    #[serde(default)]
    pub cap6: Option<f64>,
    pub register_date: NaiveDate,
    pub phyto_analysis_id: Uuid,
    pub species_id: Uuid,
}

fn validate(body: &SpecimenRequest) -> Result<(), AppError> {
    if body.portion.trim().is_empty() {
        return Err(AppError::invalid("portion must not be empty"));
    }
    if body.height <= 0.0 {
        return Err(AppError::invalid("height must be positive"));
    }
    if body.cap1 <= 0.0 {
        return Err(AppError::invalid("cap1 must be positive"));
    }
    Ok(())
}

/// POST /api/v1/specimens
pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Json(body): Json<SpecimenRequest>,
) -> Result<(StatusCode, Json<Specimen>), AppError> {
    validate(&body)?;

    state
        .analyses
        .find(&tenant.0, body.phyto_analysis_id)
        .await?
        .ok_or_else(|| AppError::not_found("phyto analysis not found"))?;

    state
        .species
        .find(body.species_id)
        .await?
        .ok_or_else(|| AppError::not_found("species not found"))?;

    let now = Utc::now();
    let specimen = Specimen {
        id: Uuid::new_v4(),
        portion: body.portion,
        height: body.height,
        cap1: body.cap1,
        cap2: body.cap2,
        cap3: body.cap3,
        cap4: body.cap4,
        cap5: body.cap5,
        cap6: body.cap6,
        register_date: body.register_date,
        phyto_analysis_id: body.phyto_analysis_id,
        species_id: body.species_id,
        tenant_id: tenant.0,
        created_at: now,
        updated_at: now,
    };

    state.specimens.insert(&specimen).await?;
    Ok((StatusCode::CREATED, Json(specimen)))
}

/// GET /api/v1/specimens/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Specimen>, AppError> {
    let specimen = state
        .specimens
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("specimen not found"))?;
    Ok(Json(specimen))
}

/// PUT /api/v1/specimens/:id - the owning analysis is immutable
pub async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(body): Json<SpecimenRequest>,
) -> Result<Json<Specimen>, AppError> {
    validate(&body)?;

    let mut stored = state
        .specimens
        .find(&tenant.0, id)
        .await?
        .ok_or_else(|| AppError::not_found("specimen not found"))?;

    state
        .species
        .find(body.species_id)
        .await?
        .ok_or_else(|| AppError::not_found("species not found"))?;

    stored.portion = body.portion;
    stored.height = body.height;
    stored.cap1 = body.cap1;
    stored.cap2 = body.cap2;
    stored.cap3 = body.cap3;
    stored.cap4 = body.cap4;
    stored.cap5 = body.cap5;
    stored.cap6 = body.cap6;
    stored.register_date = body.register_date;
    stored.species_id = body.species_id;
    stored.updated_at = Utc::now();

    state.specimens.update(&stored).await?;
    Ok(Json(stored))
}

/// DELETE /api/v1/specimens/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.specimens.delete(&tenant.0, id).await?;
    if !deleted {
        return Err(AppError::not_found("specimen not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
