// Aggregate writer for a phytosociological analysis. One analysis plus its
// specimens are written inside a single unit of work; species are resolved by
// scientific name against the same transaction, and an unresolvable name
// aborts the whole write. Partial success is impossible.
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::phyto_analysis::PhytoAnalysis;
use crate::database::models::specimen::Specimen;
use crate::database::models::normalize_optional;
use crate::database::uow::UnitOfWork;
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisInput {
    pub title: String,
    pub initial_date: NaiveDate,
    pub portion_quantity: i32,
    pub portion_area: f64,
    pub total_area: f64,
    pub sampled_area: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: Uuid,
    #[serde(default)]
    pub specimens: Vec<SpecimenInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenInput {
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
    pub scientific_name: String,
}

/// Mutable subset of an analysis; the project id is deliberately absent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnalysisInput {
    pub title: String,
    pub initial_date: NaiveDate,
    pub portion_quantity: i32,
    pub portion_area: f64,
    pub total_area: f64,
    pub sampled_area: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct AnalysisService {
    uow: UnitOfWork,
}

impl AnalysisService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            uow: UnitOfWork::new(pool),
        }
    }

    /// Create an analysis together with its specimens, atomically.
    /// Returns the id of the new analysis.
    pub async fn create(&self, tenant_id: &str, input: CreateAnalysisInput) -> Result<Uuid, AppError> {
        validate_create(&input)?;
        let tenant = tenant_id.to_string();

        self.uow
            .run_in_tx(move |mut repos| {
                Box::pin(async move {
                    let now = Utc::now();
                    let analysis = PhytoAnalysis {
                        id: Uuid::new_v4(),
                        title: input.title.clone(),
                        initial_date: input.initial_date,
                        portion_quantity: input.portion_quantity,
                        portion_area: input.portion_area,
                        total_area: input.total_area,
                        sampled_area: input.sampled_area,
                        description: normalize_optional(input.description.clone()),
                        project_id: input.project_id,
                        tenant_id: tenant.clone(),
                        created_at: now,
                        updated_at: now,
                    };
                    repos.analyses().insert(&analysis).await?;

                    for spec in &input.specimens {
                        let species = repos
                            .species()
                            .find_by_scientific_name(&spec.scientific_name)
                            .await?
                            .ok_or_else(|| {
                                AppError::not_found(format!(
                                    "species not found: {}",
                                    spec.scientific_name
                                ))
                            })?;

                        let specimen = Specimen {
                            id: Uuid::new_v4(),
                            portion: spec.portion.clone(),
                            height: spec.height,
                            cap1: spec.cap1,
                            cap2: spec.cap2,
                            cap3: spec.cap3,
                            cap4: spec.cap4,
                            cap5: spec.cap5,
                            cap6: spec.cap6,
                            register_date: spec.register_date,
                            phyto_analysis_id: analysis.id,
                            species_id: species.id,
                            tenant_id: tenant.clone(),
                            created_at: now,
                            updated_at: now,
                        };
                        repos.specimens().insert(&specimen).await?;
                    }

                    Ok(analysis.id)
                })
            })
            .await
    }

    /// Update the mutable subset of an analysis. The stored record is read
    /// first inside the transaction; the project id it carries is kept as-is.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdateAnalysisInput,
    ) -> Result<PhytoAnalysis, AppError> {
        validate_update(&input)?;
        let tenant = tenant_id.to_string();

        self.uow
            .run_in_tx(move |mut repos| {
                Box::pin(async move {
                    let mut stored = repos
                        .analyses()
                        .find(&tenant, id)
                        .await?
                        .ok_or_else(|| AppError::not_found("phyto analysis not found"))?;

                    stored.title = input.title.clone();
                    stored.initial_date = input.initial_date;
                    stored.portion_quantity = input.portion_quantity;
                    stored.portion_area = input.portion_area;
                    stored.total_area = input.total_area;
                    stored.sampled_area = input.sampled_area;
                    stored.description = normalize_optional(input.description.clone());
                    stored.updated_at = Utc::now();

                    repos.analyses().update(&stored).await?;
                    Ok(stored)
                })
            })
            .await
    }
}

fn validate_create(input: &CreateAnalysisInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::invalid("title must not be empty"));
    }
    if input.project_id.is_nil() {
        return Err(AppError::invalid("projectId must not be empty"));
    }
    validate_quantities(
        input.portion_quantity,
        input.portion_area,
        input.total_area,
        input.sampled_area,
    )?;
    for (index, spec) in input.specimens.iter().enumerate() {
        validate_specimen(index, spec)?;
    }
    Ok(())
}

fn validate_update(input: &UpdateAnalysisInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::invalid("title must not be empty"));
    }
    validate_quantities(
        input.portion_quantity,
        input.portion_area,
        input.total_area,
        input.sampled_area,
    )
}

fn validate_quantities(
    portion_quantity: i32,
    portion_area: f64,
    total_area: f64,
    sampled_area: f64,
) -> Result<(), AppError> {
    if portion_quantity <= 0 {
        return Err(AppError::invalid("portionQuantity must be positive"));
    }
    if portion_area <= 0.0 {
        return Err(AppError::invalid("portionArea must be positive"));
    }
    if total_area <= 0.0 {
        return Err(AppError::invalid("totalArea must be positive"));
    }
    if sampled_area <= 0.0 {
        return Err(AppError::invalid("sampledArea must be positive"));
    }
    Ok(())
}

fn validate_specimen(index: usize, spec: &SpecimenInput) -> Result<(), AppError> {
    if spec.portion.trim().is_empty() {
        return Err(AppError::invalid(format!("specimens[{index}].portion must not be empty")));
    }
    if spec.height <= 0.0 {
        return Err(AppError::invalid(format!("specimens[{index}].height must be positive")));
    }
    if spec.cap1 <= 0.0 {
        return Err(AppError::invalid(format!("specimens[{index}].cap1 must be positive")));
    }
    if spec.scientific_name.trim().is_empty() {
        return Err(AppError::invalid(format!(
            "specimens[{index}].scientificName must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn valid_input() -> CreateAnalysisInput {
        CreateAnalysisInput {
            title: "Campaign T".to_string(),
            initial_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            portion_quantity: 1,
            portion_area: 1.0,
            total_area: 10.0,
            sampled_area: 9.0,
            description: Some(String::new()),
            project_id: Uuid::new_v4(),
            specimens: vec![SpecimenInput {
                portion: "P1".to_string(),
                height: 3.5,
                cap1: 12.0,
                cap2: Some(8.0),
                cap3: None,
                cap4: None,
                cap5: None,
                cap6: None,
                register_date: NaiveDate::from_ymd_opt(2024, 3, 2).expect("date"),
                scientific_name: "Cedrela fissilis".to_string(),
            }],
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_create(&valid_input()).is_ok());
    }

    #[test]
    fn rejects_blank_title_and_nil_project() {
        let mut input = valid_input();
        input.title = "  ".to_string();
        assert_eq!(validate_create(&input).expect_err("title").kind(), ErrorKind::Invalid);

        let mut input = valid_input();
        input.project_id = Uuid::nil();
        assert_eq!(validate_create(&input).expect_err("project").kind(), ErrorKind::Invalid);
    }

    #[test]
    fn rejects_non_positive_quantities() {
        for mutate in [
            (|i: &mut CreateAnalysisInput| i.portion_quantity = 0) as fn(&mut CreateAnalysisInput),
            |i| i.portion_area = 0.0,
            |i| i.total_area = -1.0,
            |i| i.sampled_area = 0.0,
        ] {
            let mut input = valid_input();
            mutate(&mut input);
            assert_eq!(validate_create(&input).expect_err("quantity").kind(), ErrorKind::Invalid);
        }
    }

    #[test]
    fn rejects_bad_specimens() {
        let mut input = valid_input();
        input.specimens[0].portion = String::new();
        assert!(validate_create(&input).is_err());

        let mut input = valid_input();
        input.specimens[0].height = 0.0;
        assert!(validate_create(&input).is_err());

        let mut input = valid_input();
        input.specimens[0].cap1 = -2.0;
        assert!(validate_create(&input).is_err());

        let mut input = valid_input();
        input.specimens[0].scientific_name = " ".to_string();
        let err = validate_create(&input).expect_err("name");
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn update_validation_mirrors_create() {
        let input = UpdateAnalysisInput {
            title: "T".to_string(),
            initial_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            portion_quantity: 2,
            portion_area: 1.5,
            total_area: 20.0,
            sampled_area: 18.0,
            description: None,
        };
        assert!(validate_update(&input).is_ok());

        let mut bad = input;
        bad.portion_quantity = -1;
        assert!(validate_update(&bad).is_err());
    }
}
