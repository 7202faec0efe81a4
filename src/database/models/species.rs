// Species catalog. The scientific name is the global lookup key; habit and
// the legislation attributes come from closed vocabularies.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Growth habit of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Habit {
    #[serde(rename = "ARB")]
    Arb,
    #[serde(rename = "ANF")]
    Anf,
    #[serde(rename = "ARV")]
    Arv,
    #[serde(rename = "EME FIX")]
    EmeFix,
    #[serde(rename = "FLU FIX")]
    FluFix,
    #[serde(rename = "FLU LIV")]
    FluLiv,
    #[serde(rename = "HERB")]
    Herb,
    #[serde(rename = "PAL")]
    Pal,
    #[serde(rename = "TREP")]
    Trep,
}

impl Habit {
    pub fn as_str(self) -> &'static str {
        match self {
            Habit::Arb => "ARB",
            Habit::Anf => "ANF",
            Habit::Arv => "ARV",
            Habit::EmeFix => "EME FIX",
            Habit::FluFix => "FLU FIX",
            Habit::FluLiv => "FLU LIV",
            Habit::Herb => "HERB",
            Habit::Pal => "PAL",
            Habit::Trep => "TREP",
        }
    }
}

impl FromStr for Habit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ARB" => Ok(Habit::Arb),
            "ANF" => Ok(Habit::Anf),
            "ARV" => Ok(Habit::Arv),
            "EME FIX" => Ok(Habit::EmeFix),
            "FLU FIX" => Ok(Habit::FluFix),
            "FLU LIV" => Ok(Habit::FluLiv),
            "HERB" => Ok(Habit::Herb),
            "PAL" => Ok(Habit::Pal),
            "TREP" => Ok(Habit::Trep),
            other => Err(AppError::invalid(format!("unknown habit: {other}"))),
        }
    }
}

macro_rules! closed_set {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self { $(Self::$variant => $text),+ }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(AppError::invalid(format!(
                        concat!("unknown ", stringify!($name), ": {}"), other
                    ))),
                }
            }
        }
    };
}

closed_set! {
    /// Jurisdiction of the law attaching regulatory metadata
    LawScope { Federal => "FEDERAL", State => "STATE", Municipal => "MUNICIPAL" }
}

closed_set! {
    /// IUCN-style threat category
    ThreatStatus { Lc => "LC", Cr => "CR", Nt => "NT", En => "EN", Vu => "VU" }
}

closed_set! {
    /// Geographic origin: exotic, invasive exotic, native
    Origin { Ex => "EX", Exi => "EXI", N => "N" }
}

closed_set! {
    /// Successional ecology group
    SuccessionalGroup {
        P => "P", Is => "IS", S => "S", C => "C",
        Ls => "LS", Ms => "MS", As => "AS",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: Uuid,
    pub scientific_name: String,
    pub family: String,
    pub popular_name: Option<String>,
    pub habit: Option<Habit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape as stored; vocabulary columns are text and validated on the way
/// out so a bad row surfaces as an error instead of a silent skip.
#[derive(Debug, FromRow)]
pub struct SpeciesRow {
    pub id: Uuid,
    pub scientific_name: String,
    pub family: String,
    pub popular_name: Option<String>,
    pub habit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SpeciesRow> for Species {
    type Error = AppError;

    fn try_from(row: SpeciesRow) -> Result<Self, Self::Error> {
        let habit = row.habit.as_deref().map(Habit::from_str).transpose()?;
        Ok(Species {
            id: row.id,
            scientific_name: row.scientific_name,
            family: row.family,
            popular_name: row.popular_name,
            habit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Regulatory metadata attached to a species
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesLegislation {
    pub id: Uuid,
    pub species_id: Uuid,
    pub law_scope: LawScope,
    pub threat_status: ThreatStatus,
    pub origin: Origin,
    pub successional_group: SuccessionalGroup,
    pub form_factor: f64,
    pub active: bool,
}

#[derive(Debug, FromRow)]
pub struct SpeciesLegislationRow {
    pub id: Uuid,
    pub species_id: Uuid,
    pub law_scope: String,
    pub threat_status: String,
    pub origin: String,
    pub successional_group: String,
    pub form_factor: f64,
    pub active: bool,
}

impl TryFrom<SpeciesLegislationRow> for SpeciesLegislation {
    type Error = AppError;

    fn try_from(row: SpeciesLegislationRow) -> Result<Self, Self::Error> {
        Ok(SpeciesLegislation {
            id: row.id,
            species_id: row.species_id,
            law_scope: row.law_scope.parse()?,
            threat_status: row.threat_status.parse()?,
            origin: row.origin.parse()?,
            successional_group: row.successional_group.parse()?,
            form_factor: row.form_factor,
            active: row.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_round_trips_through_text() {
        for habit in [
            Habit::Arb,
            Habit::Anf,
            Habit::Arv,
            Habit::EmeFix,
            Habit::FluFix,
            Habit::FluLiv,
            Habit::Herb,
            Habit::Pal,
            Habit::Trep,
        ] {
            assert_eq!(habit.as_str().parse::<Habit>().expect("parse"), habit);
        }
        assert!("SHRUB".parse::<Habit>().is_err());
    }

    #[test]
    fn closed_sets_reject_unknown_values() {
        assert_eq!("FEDERAL".parse::<LawScope>().expect("parse"), LawScope::Federal);
        assert!("GLOBAL".parse::<LawScope>().is_err());
        assert_eq!("VU".parse::<ThreatStatus>().expect("parse"), ThreatStatus::Vu);
        assert!("XX".parse::<ThreatStatus>().is_err());
        assert_eq!("EXI".parse::<Origin>().expect("parse"), Origin::Exi);
        assert_eq!("MS".parse::<SuccessionalGroup>().expect("parse"), SuccessionalGroup::Ms);
    }

    #[test]
    fn species_row_with_bad_habit_is_rejected() {
        let row = SpeciesRow {
            id: Uuid::new_v4(),
            scientific_name: "Cedrela fissilis".to_string(),
            family: "Meliaceae".to_string(),
            popular_name: None,
            habit: Some("BOGUS".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(Species::try_from(row).is_err());
    }
}
