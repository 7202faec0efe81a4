use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::enterprise::Enterprise;
use crate::error::AppError;

#[derive(Clone)]
pub struct EnterpriseRepo {
    pool: PgPool,
}

impl EnterpriseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, tenant_id: &str, id: Uuid) -> Result<Option<Enterprise>, AppError> {
        let enterprise = sqlx::query_as::<_, Enterprise>(
            "SELECT * FROM enterprises WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enterprise)
    }

    pub async fn list(&self, tenant_id: &str) -> Result<Vec<Enterprise>, AppError> {
        let enterprises = sqlx::query_as::<_, Enterprise>(
            "SELECT * FROM enterprises WHERE tenant_id = $1 ORDER BY name, id",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(enterprises)
    }

    pub async fn insert(&self, enterprise: &Enterprise) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO enterprises (id, name, email, phone, tenant_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(enterprise.id)
        .bind(&enterprise.name)
        .bind(&enterprise.email)
        .bind(&enterprise.phone)
        .bind(&enterprise.tenant_id)
        .bind(enterprise.created_at)
        .bind(enterprise.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, enterprise: &Enterprise) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE enterprises SET name = $3, email = $4, phone = $5, updated_at = $6
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(&enterprise.tenant_id)
        .bind(enterprise.id)
        .bind(&enterprise.name)
        .bind(&enterprise.email)
        .bind(&enterprise.phone)
        .bind(enterprise.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, tenant_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM enterprises WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
