use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An individual measured plant. Belongs to exactly one phyto analysis;
/// deleting the analysis cascades here at the storage level.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    pub id: Uuid,
    pub portion: String,
    pub height: f64,
    pub cap1: f64,
    pub cap2: Option<f64>,
    pub cap3: Option<f64>,
    pub cap4: Option<f64>,
    pub cap5: Option<f64>,
    pub cap6: Option<f64>,
    pub register_date: NaiveDate,
    pub phyto_analysis_id: Uuid,
    pub species_id: Uuid,
    #[serde(skip_serializing)]
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
