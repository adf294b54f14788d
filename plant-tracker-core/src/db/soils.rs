use rusqlite::{params, Connection, OptionalExtension};

use super::{soil_at, Database, SOIL_COLUMNS};
use crate::error::{require, Error, Result};
use crate::models::*;

pub(super) fn fetch_soil(conn: &Connection, id: i64) -> Result<Option<Soil>> {
    let soil = conn
        .query_row(
            &format!("SELECT {SOIL_COLUMNS} FROM soils s WHERE s.id = ?1"),
            [id],
            |row| soil_at(row, 0),
        )
        .optional()?;
    Ok(soil)
}

impl Database {
    pub fn get_soil(&self, id: i64) -> Result<Option<Soil>> {
        fetch_soil(&self.lock(), id)
    }

    pub fn list_soils(&self, include_inactive: bool) -> Result<Vec<Soil>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SOIL_COLUMNS} FROM soils s
             WHERE ?1 OR s.active = 1
             ORDER BY s.name COLLATE NOCASE, s.id"
        ))?;
        let soils = stmt
            .query_map([include_inactive], |row| soil_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(soils)
    }

    pub fn create_soil(&self, input: CreateSoilInput) -> Result<Soil> {
        let name = require("name", &input.name)?;
        let composition = require("composition", &input.composition)?;

        let conn = self.lock();
        conn.execute(
            "INSERT INTO soils (name, composition, active) VALUES (?1, ?2, 1)",
            params![name, composition],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(soil_id = id, name = %name, "created soil");

        Ok(Soil {
            id,
            name,
            composition,
            active: true,
        })
    }

    /// Partial update; `active: true` restores a soft-deleted soil.
    pub fn update_soil(&self, id: i64, input: UpdateSoilInput) -> Result<Option<Soil>> {
        let conn = self.lock();
        let Some(mut soil) = fetch_soil(&conn, id)? else {
            return Ok(None);
        };

        if let Some(name) = input.name {
            soil.name = require("name", &name)?;
        }
        if let Some(composition) = input.composition {
            soil.composition = require("composition", &composition)?;
        }
        if let Some(active) = input.active {
            if active && !soil.active {
                tracing::info!(soil_id = id, "restoring soil");
            }
            soil.active = active;
        }

        conn.execute(
            "UPDATE soils SET name = ?2, composition = ?3, active = ?4 WHERE id = ?1",
            params![id, soil.name, soil.composition, soil.active],
        )?;
        Ok(Some(soil))
    }

    /// Soft-delete. Past occupancy records keep pointing at the soil.
    pub fn delete_soil(&self, id: i64) -> Result<Soil> {
        let conn = self.lock();
        let mut soil = fetch_soil(&conn, id)?.ok_or_else(|| Error::not_found("Soil"))?;
        if soil.active {
            conn.execute("UPDATE soils SET active = 0 WHERE id = ?1", [id])?;
            soil.active = false;
            tracing::info!(soil_id = id, "deleted soil");
        }
        Ok(soil)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::error::Error;
    use crate::models::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn aroid_mix(db: &Database) -> Soil {
        db.create_soil(CreateSoilInput {
            name: "Aroid Mix".into(),
            composition: "40% orchid bark, 30% perlite, 20% peat moss, 10% charcoal".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_delete_hides_soil_until_restored() {
        let db = setup();
        let soil = aroid_mix(&db);

        let deleted = db.delete_soil(soil.id).unwrap();
        assert!(!deleted.active);
        assert!(db.list_soils(false).unwrap().is_empty());
        assert_eq!(db.list_soils(true).unwrap().len(), 1);

        let restored = db
            .update_soil(
                soil.id,
                UpdateSoilInput {
                    active: Some(true),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(restored.active);
        assert_eq!(db.list_soils(false).unwrap(), vec![restored]);
    }

    #[test]
    fn test_delete_twice_is_harmless() {
        let db = setup();
        let soil = aroid_mix(&db);
        db.delete_soil(soil.id).unwrap();
        assert!(!db.delete_soil(soil.id).unwrap().active);
    }

    #[test]
    fn test_delete_unknown_soil() {
        let db = setup();
        assert!(matches!(db.delete_soil(42), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_create_requires_composition() {
        let db = setup();
        let err = db
            .create_soil(CreateSoilInput {
                name: "Mystery".into(),
                composition: "   ".into(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_update_keeps_unspecified_fields() {
        let db = setup();
        let soil = aroid_mix(&db);
        let updated = db
            .update_soil(
                soil.id,
                UpdateSoilInput {
                    name: Some("Chunky Aroid".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Chunky Aroid");
        assert_eq!(updated.composition, soil.composition);
        assert_eq!(db.get_soil(soil.id).unwrap(), Some(updated));
        assert!(db.update_soil(999, UpdateSoilInput::default()).unwrap().is_none());
    }
}
