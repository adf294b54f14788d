use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{OccupancyEntry, Pot, Soil};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub species2: Option<String>,
    pub variation: Option<String>,
    pub size: PlantSize,
    pub status: PlantStatus,
    pub removed_reason: Option<String>,
    pub date_added: NaiveDate,
    pub notes: Option<String>,
}

impl Plant {
    pub fn is_active(&self) -> bool {
        self.status == PlantStatus::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlantSize {
    Seedling,
    Small,
    Medium,
    Large,
    Giant,
}

impl PlantSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seedling => "seedling",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Giant => "giant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "seedling" => Some(Self::Seedling),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "giant" => Some(Self::Giant),
            _ => None,
        }
    }
}

/// Lifecycle of a plant. `Removed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlantStatus {
    Active,
    Removed,
}

impl PlantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlantInput {
    pub name: String,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub species2: Option<String>,
    pub variation: Option<String>,
    pub size: PlantSize,
    pub date_added: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update. Status cannot change here; removal goes through the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlantInput {
    pub name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub species2: Option<String>,
    pub variation: Option<String>,
    pub size: Option<PlantSize>,
    pub date_added: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePlantInput {
    pub removed_reason: Option<String>,
}

/// A plant joined to its open occupancy record, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantWithLocation {
    #[serde(flatten)]
    pub plant: Plant,
    pub current_pot: Option<Pot>,
    pub current_soil: Option<Soil>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantDetail {
    #[serde(flatten)]
    pub plant: PlantWithLocation,
    pub history: Vec<OccupancyEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_flattened_into_plant_json() {
        let located = PlantWithLocation {
            plant: Plant {
                id: 3,
                name: "Pothos".into(),
                family: "Araceae".into(),
                genus: "Epipremnum".into(),
                species: "aureum".into(),
                species2: None,
                variation: None,
                size: PlantSize::Small,
                status: PlantStatus::Active,
                removed_reason: None,
                date_added: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                notes: None,
            },
            current_pot: None,
            current_soil: None,
        };

        let value = serde_json::to_value(&located).unwrap();
        assert_eq!(value["name"], "Pothos");
        assert_eq!(value["size"], "small");
        assert_eq!(value["date_added"], "2024-03-09");
        assert!(value["current_pot"].is_null());
    }

    #[test]
    fn test_unknown_size_is_rejected() {
        let err = serde_json::from_value::<CreatePlantInput>(serde_json::json!({
            "name": "Fig",
            "family": "Moraceae",
            "genus": "Ficus",
            "species": "lyrata",
            "size": "enormous"
        }));
        assert!(err.is_err());
        assert_eq!(PlantSize::from_str("giant"), Some(PlantSize::Giant));
        assert_eq!(PlantStatus::Removed.as_str(), "removed");
    }
}
