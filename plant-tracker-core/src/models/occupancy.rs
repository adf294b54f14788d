use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Plant, Pot, Soil};

/// One interval during which a plant lived in a pot with a given soil.
/// `end_date == None` marks the plant's current location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccupancyRecord {
    pub id: i64,
    pub plant_id: i64,
    pub pot_id: i64,
    pub soil_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl OccupancyRecord {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// A history row joined to the entities it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyEntry {
    #[serde(flatten)]
    pub record: OccupancyRecord,
    pub plant: Plant,
    pub pot: Pot,
    pub soil: Soil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveInput {
    pub plant_id: i64,
    pub pot_id: i64,
    pub soil_id: i64,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
