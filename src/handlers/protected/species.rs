use axum::extract::State;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::species::{Species, SpeciesLegislation};
use crate::error::AppError;
use crate::extract::Json;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesView {
    #[serde(flatten)]
    pub species: Species,
    pub legislation: Vec<SpeciesLegislation>,
}

/// GET /api/v1/species - global catalog with active legislation attached
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<SpeciesView>>, AppError> {
    let species = state.species.list().await?;

    let mut by_species: HashMap<Uuid, Vec<SpeciesLegislation>> = HashMap::new();
    for item in state.species.list_legislation().await? {
        by_species.entry(item.species_id).or_default().push(item);
    }

    let views = species
        .into_iter()
        .map(|s| {
            let legislation = by_species.remove(&s.id).unwrap_or_default();
            SpeciesView {
                species: s,
                legislation,
            }
        })
        .collect();
    Ok(Json(views))
}
