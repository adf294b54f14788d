use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    location_at, plant_at, Database, PLANT_COLUMNS, PLANT_WIDTH, POT_COLUMNS, SOIL_COLUMNS,
};
use crate::error::{require, Error, Result};
use crate::models::*;

fn located_plants_sql(filter: &str) -> String {
    format!(
        "SELECT {PLANT_COLUMNS}, {POT_COLUMNS}, {SOIL_COLUMNS}
         FROM plants p
         LEFT JOIN occupancy o ON o.plant_id = p.id AND o.end_date IS NULL
         LEFT JOIN pots t ON t.id = o.pot_id
         LEFT JOIN soils s ON s.id = o.soil_id
         {filter}
         ORDER BY p.id"
    )
}

fn located_plant(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlantWithLocation> {
    let plant = plant_at(row, 0)?;
    let (current_pot, current_soil) = location_at(row, PLANT_WIDTH)?;
    Ok(PlantWithLocation {
        plant,
        current_pot,
        current_soil,
    })
}

pub(super) fn fetch_plant(conn: &Connection, id: i64) -> Result<Option<Plant>> {
    let plant = conn
        .query_row(
            &format!("SELECT {PLANT_COLUMNS} FROM plants p WHERE p.id = ?1"),
            [id],
            |row| plant_at(row, 0),
        )
        .optional()?;
    Ok(plant)
}

/// Empty optional text is stored as NULL.
pub(super) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Database {
    pub fn get_plant(&self, id: i64) -> Result<Option<Plant>> {
        fetch_plant(&self.lock(), id)
    }

    pub fn get_plant_with_location(&self, id: i64) -> Result<Option<PlantWithLocation>> {
        let conn = self.lock();
        let plant = conn
            .query_row(&located_plants_sql("WHERE p.id = ?1"), [id], located_plant)
            .optional()?;
        Ok(plant)
    }

    /// Plant with its current location and full occupancy history.
    pub fn get_plant_detail(&self, id: i64) -> Result<Option<PlantDetail>> {
        let Some(plant) = self.get_plant_with_location(id)? else {
            return Ok(None);
        };
        let history = self.get_plant_history(id)?;
        Ok(Some(PlantDetail { plant, history }))
    }

    pub fn list_plants(&self) -> Result<Vec<PlantWithLocation>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&located_plants_sql(""))?;
        let plants = stmt
            .query_map([], located_plant)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(count = plants.len(), "listed plants");
        Ok(plants)
    }

    /// New plants always start active; removal goes through [`Database::archive_plant`].
    pub fn create_plant(&self, input: CreatePlantInput) -> Result<Plant> {
        let name = require("name", &input.name)?;
        let family = require("family", &input.family)?;
        let genus = require("genus", &input.genus)?;
        let species = require("species", &input.species)?;
        let date_added = input
            .date_added
            .unwrap_or_else(|| Local::now().date_naive());

        let conn = self.lock();
        conn.execute(
            "INSERT INTO plants (name, family, genus, species, species2, variation, size,
                                 status, removed_reason, date_added, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10)",
            params![
                name,
                family,
                genus,
                species,
                optional_text(input.species2),
                optional_text(input.variation),
                input.size.as_str(),
                PlantStatus::Active.as_str(),
                date_added,
                optional_text(input.notes),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(plant_id = id, name = %name, "created plant");

        fetch_plant(&conn, id)?.ok_or_else(|| Error::not_found("Plant"))
    }

    /// Apply a partial update. Absent or `null` fields are left unchanged;
    /// an empty string clears `species2`, `variation` or `notes`.
    pub fn update_plant(&self, id: i64, input: UpdatePlantInput) -> Result<Option<Plant>> {
        let conn = self.lock();
        let Some(mut plant) = fetch_plant(&conn, id)? else {
            return Ok(None);
        };

        if let Some(name) = input.name {
            plant.name = require("name", &name)?;
        }
        if let Some(family) = input.family {
            plant.family = require("family", &family)?;
        }
        if let Some(genus) = input.genus {
            plant.genus = require("genus", &genus)?;
        }
        if let Some(species) = input.species {
            plant.species = require("species", &species)?;
        }
        if input.species2.is_some() {
            plant.species2 = optional_text(input.species2);
        }
        if input.variation.is_some() {
            plant.variation = optional_text(input.variation);
        }
        if let Some(size) = input.size {
            plant.size = size;
        }
        if let Some(date_added) = input.date_added {
            plant.date_added = date_added;
        }
        if input.notes.is_some() {
            plant.notes = optional_text(input.notes);
        }

        conn.execute(
            "UPDATE plants
             SET name = ?2, family = ?3, genus = ?4, species = ?5, species2 = ?6,
                 variation = ?7, size = ?8, date_added = ?9, notes = ?10
             WHERE id = ?1",
            params![
                id,
                plant.name,
                plant.family,
                plant.genus,
                plant.species,
                plant.species2,
                plant.variation,
                plant.size.as_str(),
                plant.date_added,
                plant.notes,
            ],
        )?;
        tracing::info!(plant_id = id, "updated plant");
        Ok(Some(plant))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_update_clears_only_on_empty_string() {
        let db = setup();
        let plant = db
            .create_plant(CreatePlantInput {
                name: "Snake Plant".into(),
                family: "Asparagaceae".into(),
                genus: "Sansevieria".into(),
                species: "trifasciata".into(),
                species2: None,
                variation: Some("Laurentii".into()),
                size: PlantSize::Small,
                date_added: None,
                notes: Some("Very low maintenance".into()),
            })
            .unwrap();

        let input: UpdatePlantInput =
            serde_json::from_value(serde_json::json!({ "variation": null, "notes": "" }))
                .unwrap();
        let updated = db.update_plant(plant.id, input).unwrap().unwrap();
        assert_eq!(updated.variation.as_deref(), Some("Laurentii"));
        assert_eq!(updated.notes, None);
        assert_eq!(db.get_plant(plant.id).unwrap(), Some(updated));
    }
}
