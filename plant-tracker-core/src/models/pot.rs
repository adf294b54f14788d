use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Plant, Soil};

pub const DEFAULT_QR_DOMAIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pot {
    pub id: i64,
    pub qr_code_id: String,
    pub room: String,
    pub size: String,
    pub notes: Option<String>,
    pub active: bool,
}

impl Pot {
    /// The URL a printed label for this pot encodes.
    pub fn qr_url(&self, domain: &str) -> String {
        format!("{}/pot/{}", domain.trim_end_matches('/'), self.qr_code_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePotInput {
    pub room: String,
    pub size: String,
    pub notes: Option<String>,
    pub domain: Option<String>,
}

/// Partial update. `active` can only be cleared through deactivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePotInput {
    pub room: Option<String>,
    pub size: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPot {
    #[serde(flatten)]
    pub pot: Pot,
    pub qr_url: String,
}

/// A plant currently sitting in a pot, with the soil and date it was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotOccupant {
    #[serde(flatten)]
    pub plant: Plant,
    pub soil: Soil,
    pub since: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotWithOccupants {
    #[serde(flatten)]
    pub pot: Pot,
    pub current_plants: Vec<PotOccupant>,
}

impl PotWithOccupants {
    pub fn is_occupied(&self) -> bool {
        !self.current_plants.is_empty()
    }
}
