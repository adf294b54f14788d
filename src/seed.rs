//! Sample data for trying the tracker out.

use std::fmt;

use chrono::{Duration, Local, NaiveDate};

use plant_tracker_core::models::*;
use plant_tracker_core::{Database, Error};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub soils: usize,
    pub pots: usize,
    pub plants: usize,
    pub history_records: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} soil mixes, {} pots, {} plants, {} history records",
            self.soils, self.pots, self.plants, self.history_records
        )
    }
}

const SOILS: &[(&str, &str)] = &[
    (
        "Aroid Mix",
        "40% orchid bark, 30% perlite, 20% peat moss, 10% charcoal",
    ),
    (
        "Succulent Mix",
        "50% potting soil, 30% coarse sand, 20% perlite",
    ),
    (
        "Standard Potting Mix",
        "60% peat moss, 30% perlite, 10% vermiculite",
    ),
    (
        "Cactus Mix",
        "40% potting soil, 40% coarse sand, 20% perlite",
    ),
];

const POTS: &[(&str, &str, &str)] = &[
    ("POT-001", "Living Room", "15 cm"),
    ("POT-002", "Bedroom", "20 cm"),
    ("POT-003", "Kitchen", "12 cm"),
    ("POT-004", "Balcony", "25 cm"),
    ("POT-005", "Office", "18 cm"),
];

struct SamplePlant {
    name: &'static str,
    family: &'static str,
    genus: &'static str,
    species: &'static str,
    variation: Option<&'static str>,
    size: PlantSize,
    days_ago: i64,
    notes: Option<&'static str>,
}

const PLANTS: &[SamplePlant] = &[
    SamplePlant {
        name: "Monstera Deliciosa",
        family: "Araceae",
        genus: "Monstera",
        species: "deliciosa",
        variation: None,
        size: PlantSize::Medium,
        days_ago: 365,
        notes: Some("Beautiful fenestrations!"),
    },
    SamplePlant {
        name: "Snake Plant",
        family: "Asparagaceae",
        genus: "Sansevieria",
        species: "trifasciata",
        variation: Some("Laurentii"),
        size: PlantSize::Small,
        days_ago: 180,
        notes: Some("Very low maintenance"),
    },
    SamplePlant {
        name: "Pothos",
        family: "Araceae",
        genus: "Epipremnum",
        species: "aureum",
        variation: None,
        size: PlantSize::Small,
        days_ago: 90,
        notes: Some("Fast grower"),
    },
    SamplePlant {
        name: "Fiddle Leaf Fig",
        family: "Moraceae",
        genus: "Ficus",
        species: "lyrata",
        variation: None,
        size: PlantSize::Large,
        days_ago: 200,
        notes: Some("Needs bright indirect light"),
    },
    SamplePlant {
        name: "Jade Plant",
        family: "Crassulaceae",
        genus: "Crassula",
        species: "ovata",
        variation: None,
        size: PlantSize::Small,
        days_ago: 300,
        notes: None,
    },
];

/// Placements as (plant, pot, soil, days ago, notes), oldest first per plant.
/// The Jade Plant is left unpotted.
const PLACEMENTS: &[(usize, usize, usize, i64, &str)] = &[
    (0, 0, 0, 365, "Initial potting"),
    (1, 1, 2, 180, "First pot"),
    (2, 2, 0, 90, "Propagated from cutting"),
    (3, 3, 2, 200, "First pot - outgrew it"),
    (3, 4, 2, 50, "Repotted to larger pot"),
];

/// Seed relative to today.
pub fn seed(db: &Database) -> Result<SeedSummary, Error> {
    seed_as_of(db, Local::now().date_naive())
}

/// Populate an empty database. Existing data is never touched: seeding a
/// database that already holds records is a conflict.
pub fn seed_as_of(db: &Database, today: NaiveDate) -> Result<SeedSummary, Error> {
    if !db.is_empty()? {
        return Err(Error::Conflict(
            "Database already contains data; seed only into an empty database".into(),
        ));
    }
    let days_ago = |days: i64| today - Duration::days(days);

    let soils = SOILS
        .iter()
        .map(|(name, composition)| {
            db.create_soil(CreateSoilInput {
                name: name.to_string(),
                composition: composition.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pots = POTS
        .iter()
        .map(|(qr, room, size)| db.create_pot_with_code(qr, room, size, None))
        .collect::<Result<Vec<_>, _>>()?;

    let plants = PLANTS
        .iter()
        .map(|sample| {
            db.create_plant(CreatePlantInput {
                name: sample.name.to_string(),
                family: sample.family.to_string(),
                genus: sample.genus.to_string(),
                species: sample.species.to_string(),
                species2: None,
                variation: sample.variation.map(str::to_string),
                size: sample.size,
                date_added: Some(days_ago(sample.days_ago)),
                notes: sample.notes.map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for &(plant, pot, soil, days, notes) in PLACEMENTS {
        db.move_plant(MoveInput {
            plant_id: plants[plant].id,
            pot_id: pots[pot].id,
            soil_id: soils[soil].id,
            start_date: Some(days_ago(days)),
            notes: Some(notes.to_string()),
        })?;
    }

    let summary = SeedSummary {
        soils: soils.len(),
        pots: pots.len(),
        plants: plants.len(),
        history_records: PLACEMENTS.len(),
    };
    tracing::info!(%summary, "seeded database");
    Ok(summary)
}
