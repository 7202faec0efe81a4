use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::phyto_analysis::PhytoAnalysis;
use crate::error::AppError;

/// Read side of the phyto analysis records. Every query is parameterized by
/// the tenant id taken from the request context; writes go through the unit
/// of work instead.
#[derive(Clone)]
pub struct AnalysisRepo {
    pool: PgPool,
}

impl AnalysisRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, tenant_id: &str, id: Uuid) -> Result<Option<PhytoAnalysis>, AppError> {
        let analysis = sqlx::query_as::<_, PhytoAnalysis>(
            "SELECT * FROM phyto_analyses WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(analysis)
    }

    pub async fn list_by_project(
        &self,
        tenant_id: &str,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PhytoAnalysis>, AppError> {
        let analyses = sqlx::query_as::<_, PhytoAnalysis>(
            "SELECT * FROM phyto_analyses
             WHERE tenant_id = $1 AND project_id = $2
             ORDER BY initial_date DESC, id
             LIMIT $3 OFFSET $4",
        )
        .bind(tenant_id)
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(analyses)
    }

    pub async fn list_by_enterprise(
        &self,
        tenant_id: &str,
        enterprise_id: Uuid,
    ) -> Result<Vec<PhytoAnalysis>, AppError> {
        let analyses = sqlx::query_as::<_, PhytoAnalysis>(
            "SELECT a.* FROM phyto_analyses a
             JOIN projects p ON p.id = a.project_id
             WHERE a.tenant_id = $1 AND p.enterprise_id = $2
             ORDER BY a.initial_date DESC, a.id",
        )
        .bind(tenant_id)
        .bind(enterprise_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(analyses)
    }

    /// Delete an analysis; specimens go with it via the FK cascade
    pub async fn delete(&self, tenant_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM phyto_analyses WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
