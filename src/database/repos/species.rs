use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::species::{
    Species, SpeciesLegislation, SpeciesLegislationRow, SpeciesRow,
};
use crate::error::AppError;

#[derive(Clone)]
pub struct SpeciesRepo {
    pool: PgPool,
}

impl SpeciesRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the global species catalog in scientific-name order
    pub async fn list(&self) -> Result<Vec<Species>, AppError> {
        let rows = sqlx::query_as::<_, SpeciesRow>(
            "SELECT id, scientific_name, family, popular_name, habit, created_at, updated_at
             FROM species ORDER BY scientific_name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Species::try_from).collect()
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Species>, AppError> {
        let row = sqlx::query_as::<_, SpeciesRow>(
            "SELECT id, scientific_name, family, popular_name, habit, created_at, updated_at
             FROM species WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Species::try_from).transpose()
    }

    /// Regulatory metadata for every listed species, for in-memory grouping
    pub async fn list_legislation(&self) -> Result<Vec<SpeciesLegislation>, AppError> {
        let rows = sqlx::query_as::<_, SpeciesLegislationRow>(
            "SELECT id, species_id, law_scope, threat_status, origin, successional_group,
                    form_factor, active
             FROM species_legislation WHERE active = true",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SpeciesLegislation::try_from).collect()
    }
}
