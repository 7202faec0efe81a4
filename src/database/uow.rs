// Unit of work: the only place transactional semantics live. Repositories
// handed out by [`Repos`] share exactly one transaction; they cannot open
// another, and nesting is impossible by construction because the closure
// receives the bundle, not the factory.
use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::models::phyto_analysis::PhytoAnalysis;
use crate::database::models::species::{Species, SpeciesRow};
use crate::database::models::specimen::Specimen;
use crate::error::AppError;

#[derive(Clone)]
pub struct UnitOfWork {
    pool: PgPool,
}

impl UnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run `f` inside a single transaction. Commits on `Ok`, rolls back on
    /// `Err`; a rollback failure is logged and absorbed so the original error
    /// is what the caller sees. If the task is cancelled mid-flight the
    /// transaction is dropped, which rolls back.
    pub async fn run_in_tx<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: for<'t> FnOnce(Repos<'t>) -> BoxFuture<'t, Result<T, AppError>>,
    {
        let mut tx = self.pool.begin().await?;

        let result = f(Repos { conn: &mut tx }).await;

        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed after aborted unit of work");
                }
                Err(err)
            }
        }
    }
}

/// Per-entity repositories bound to one open transaction. Accessors reborrow
/// the connection, so repositories are used one at a time in handler order.
pub struct Repos<'t> {
    conn: &'t mut PgConnection,
}

impl<'t> Repos<'t> {
    pub fn species(&mut self) -> SpeciesTx<'_> {
        SpeciesTx { conn: &mut *self.conn }
    }

    pub fn analyses(&mut self) -> AnalysesTx<'_> {
        AnalysesTx { conn: &mut *self.conn }
    }

    pub fn specimens(&mut self) -> SpecimensTx<'_> {
        SpecimensTx { conn: &mut *self.conn }
    }
}

/// Species lookups inside the transaction
pub struct SpeciesTx<'c> {
    conn: &'c mut PgConnection,
}

impl SpeciesTx<'_> {
    pub async fn find_by_scientific_name(&mut self, name: &str) -> Result<Option<Species>, AppError> {
        let row = sqlx::query_as::<_, SpeciesRow>(
            "SELECT id, scientific_name, family, popular_name, habit, created_at, updated_at
             FROM species WHERE scientific_name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Species::try_from).transpose()
    }
}

/// Phyto analysis writes inside the transaction
pub struct AnalysesTx<'c> {
    conn: &'c mut PgConnection,
}

impl AnalysesTx<'_> {
    pub async fn insert(&mut self, analysis: &PhytoAnalysis) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO phyto_analyses
               (id, title, initial_date, portion_quantity, portion_area, total_area,
                sampled_area, description, project_id, tenant_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(analysis.id)
        .bind(&analysis.title)
        .bind(analysis.initial_date)
        .bind(analysis.portion_quantity)
        .bind(analysis.portion_area)
        .bind(analysis.total_area)
        .bind(analysis.sampled_area)
        .bind(&analysis.description)
        .bind(analysis.project_id)
        .bind(&analysis.tenant_id)
        .bind(analysis.created_at)
        .bind(analysis.updated_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    pub async fn find(&mut self, tenant_id: &str, id: Uuid) -> Result<Option<PhytoAnalysis>, AppError> {
        let row = sqlx::query_as::<_, PhytoAnalysis>(
            "SELECT * FROM phyto_analyses WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    /// Update the mutable subset only; `project_id` is never written here
    pub async fn update(&mut self, analysis: &PhytoAnalysis) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE phyto_analyses
             SET title = $3, initial_date = $4, portion_quantity = $5, portion_area = $6,
                 total_area = $7, sampled_area = $8, description = $9, updated_at = $10
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(&analysis.tenant_id)
        .bind(analysis.id)
        .bind(&analysis.title)
        .bind(analysis.initial_date)
        .bind(analysis.portion_quantity)
        .bind(analysis.portion_area)
        .bind(analysis.total_area)
        .bind(analysis.sampled_area)
        .bind(&analysis.description)
        .bind(analysis.updated_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }
}

/// Specimen writes inside the transaction
pub struct SpecimensTx<'c> {
    conn: &'c mut PgConnection,
}

impl SpecimensTx<'_> {
    pub async fn insert(&mut self, specimen: &Specimen) -> Result<(), AppError> {
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
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }
}
