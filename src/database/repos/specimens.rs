use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::specimen::Specimen;
use crate::error::AppError;

#[derive(Clone)]
pub struct SpecimenRepo {
    pool: PgPool,
}

impl SpecimenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, tenant_id: &str, id: Uuid) -> Result<Option<Specimen>, AppError> {
        let specimen = sqlx::query_as::<_, Specimen>(
            "SELECT * FROM specimens WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(specimen)
    }

    pub async fn list_by_analysis(
        &self,
        tenant_id: &str,
        phyto_analysis_id: Uuid,
    ) -> Result<Vec<Specimen>, AppError> {
        let specimens = sqlx::query_as::<_, Specimen>(
            "SELECT * FROM specimens
             WHERE tenant_id = $1 AND phyto_analysis_id = $2
             ORDER BY portion, register_date, id",
        )
        .bind(tenant_id)
        .bind(phyto_analysis_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(specimens)
    }

    pub async fn insert(&self, specimen: &Specimen) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO specimens
               (id, portion, height, cap1, cap2, cap3, cap4, cap5, cap6, register_date,
                phyto_analysis_id, species_id, tenant_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(specimen.id)
        .bind(&specimen.portion)
        .bind(specimen.height)
        .bind(specimen.cap1)
        .bind(specimen.cap2)
        .bind(specimen.cap3)
        .bind(specimen.cap4)
        .bind(specimen.cap5)
        .bind(specimen.cap6)
        .bind(specimen.register_date)
        .bind(specimen.phyto_analysis_id)
        .bind(specimen.species_id)
        .bind(&specimen.tenant_id)
        .bind(specimen.created_at)
        .bind(specimen.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Measurements and register date are mutable; ownership columns are not
    pub async fn update(&self, specimen: &Specimen) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE specimens
             SET portion = $3, height = $4, cap1 = $5, cap2 = $6, cap3 = $7, cap4 = $8,
                 cap5 = $9, cap6 = $10, register_date = $11, species_id = $12, updated_at = $13
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(&specimen.tenant_id)
        .bind(specimen.id)
        .bind(&specimen.portion)
        .bind(specimen.height)
        .bind(specimen.cap1)
        .bind(specimen.cap2)
        .bind(specimen.cap3)
        .bind(specimen.cap4)
        .bind(specimen.cap5)
        .bind(specimen.cap6)
        .bind(specimen.register_date)
        .bind(specimen.species_id)
        .bind(specimen.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, tenant_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM specimens WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
