use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An ordered sampling campaign inside a project. Created through the
/// aggregate writer; `project_id` is immutable after creation.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PhytoAnalysis {
    pub id: Uuid,
    pub title: String,
    pub initial_date: NaiveDate,
    pub portion_quantity: i32,
    pub portion_area: f64,
    pub total_area: f64,
    pub sampled_area: f64,
    pub description: Option<String>,
    pub project_id: Uuid,
    #[serde(skip_serializing)]
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
