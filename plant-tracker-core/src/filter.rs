//! Read-side narrowing of plant and pot listings.
//!
//! These are pure functions over already-joined views; they never touch the
//! database.

use serde::{Deserialize, Serialize};

use crate::models::*;

/// Which pots to show by their active flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActiveFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl ActiveFilter {
    /// Whether the listing must load inactive pots at all.
    pub fn needs_inactive(&self) -> bool {
        !matches!(self, Self::Active)
    }

    fn matches(&self, active: bool) -> bool {
        match self {
            Self::Active => active,
            Self::Inactive => !active,
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyFilter {
    #[default]
    All,
    Occupied,
    Empty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantFilter {
    /// Case-insensitive substring over name and taxonomy.
    pub q: Option<String>,
    pub status: Option<PlantStatus>,
    pub family: Option<String>,
    pub genus: Option<String>,
    /// Room of the plant's current pot.
    pub room: Option<String>,
    /// Soil the plant currently sits in.
    pub soil_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PotFilter {
    /// Case-insensitive substring over QR code, room, size and current plants.
    pub q: Option<String>,
    #[serde(default)]
    pub active: ActiveFilter,
    #[serde(default)]
    pub occupancy: OccupancyFilter,
    pub room: Option<String>,
}

/// Lowercased, trimmed search term; `None` when blank.
fn term(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// `right` is expected to be a `term`, i.e. already lowercased.
fn same(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right
}

fn plant_mentions(plant: &Plant, needle: &str) -> bool {
    [
        Some(plant.name.as_str()),
        Some(plant.family.as_str()),
        Some(plant.genus.as_str()),
        Some(plant.species.as_str()),
        plant.species2.as_deref(),
        plant.variation.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| contains(field, needle))
}

impl PlantFilter {
    pub fn matches(&self, entry: &PlantWithLocation) -> bool {
        let plant = &entry.plant;

        if let Some(needle) = term(&self.q) {
            if !plant_mentions(plant, &needle) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if plant.status != status {
                return false;
            }
        }
        if let Some(family) = term(&self.family) {
            if !same(&plant.family, &family) {
                return false;
            }
        }
        if let Some(genus) = term(&self.genus) {
            if !same(&plant.genus, &genus) {
                return false;
            }
        }
        if let Some(room) = term(&self.room) {
            match &entry.current_pot {
                Some(pot) if same(&pot.room, &room) => {}
                _ => return false,
            }
        }
        if let Some(soil_id) = self.soil_id {
            if entry.current_soil.as_ref().map(|s| s.id) != Some(soil_id) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, plants: Vec<PlantWithLocation>) -> Vec<PlantWithLocation> {
        plants.into_iter().filter(|p| self.matches(p)).collect()
    }
}

impl PotFilter {
    pub fn matches(&self, entry: &PotWithOccupants) -> bool {
        let pot = &entry.pot;

        if !self.active.matches(pot.active) {
            return false;
        }
        if let Some(needle) = term(&self.q) {
            let on_pot = [&pot.qr_code_id, &pot.room, &pot.size]
                .into_iter()
                .any(|field| contains(field, &needle));
            let on_plants = entry.current_plants.iter().any(|occupant| {
                let plant = &occupant.plant;
                [&plant.name, &plant.genus, &plant.species]
                    .into_iter()
                    .any(|field| contains(field, &needle))
            });
            if !on_pot && !on_plants {
                return false;
            }
        }
        match self.occupancy {
            OccupancyFilter::Occupied if !entry.is_occupied() => return false,
            OccupancyFilter::Empty if entry.is_occupied() => return false,
            _ => {}
        }
        if let Some(room) = term(&self.room) {
            if !same(&pot.room, &room) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, pots: Vec<PotWithOccupants>) -> Vec<PotWithOccupants> {
        pots.into_iter().filter(|p| self.matches(p)).collect()
    }
}
