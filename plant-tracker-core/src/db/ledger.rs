//! The occupancy ledger: which plant lived in which pot, with which soil, when.
//!
//! Records are only ever appended or closed. Every transition runs inside an
//! immediate transaction so the close of the previous record and the opening
//! of the next one are observed together or not at all.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::plants::{fetch_plant, optional_text};
use super::pots::fetch_pot;
use super::soils::fetch_soil;
use super::{
    plant_at, pot_at, record_at, soil_at, Database, PLANT_COLUMNS, PLANT_WIDTH, POT_COLUMNS,
    POT_WIDTH, RECORD_COLUMNS, SOIL_COLUMNS,
};
use crate::error::{require, Error, Result};
use crate::models::*;

const RECORD_WIDTH: usize = 7;

fn open_record(conn: &Connection, plant_id: i64) -> Result<Option<OccupancyRecord>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM occupancy o
                 WHERE o.plant_id = ?1 AND o.end_date IS NULL"
            ),
            [plant_id],
            |row| record_at(row, 0),
        )
        .optional()?;
    Ok(record)
}

fn close_record(conn: &Connection, record: &OccupancyRecord, end_date: NaiveDate) -> Result<()> {
    let closed = conn.execute(
        "UPDATE occupancy SET end_date = ?2 WHERE id = ?1 AND end_date IS NULL",
        params![record.id, end_date],
    )?;
    if closed != 1 {
        return Err(Error::Conflict(format!(
            "Occupancy record {} was closed concurrently",
            record.id
        )));
    }
    tracing::debug!(
        record_id = record.id,
        plant_id = record.plant_id,
        pot_id = record.pot_id,
        %end_date,
        "closed occupancy record"
    );
    Ok(())
}

fn history(conn: &Connection, column: &str, id: i64) -> Result<Vec<OccupancyEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS}, {PLANT_COLUMNS}, {POT_COLUMNS}, {SOIL_COLUMNS}
         FROM occupancy o
         JOIN plants p ON p.id = o.plant_id
         JOIN pots t ON t.id = o.pot_id
         JOIN soils s ON s.id = o.soil_id
         WHERE o.{column} = ?1
         ORDER BY o.start_date DESC, o.id DESC"
    ))?;
    let entries = stmt
        .query_map([id], |row| {
            let plant_at_col = RECORD_WIDTH;
            let pot_at_col = plant_at_col + PLANT_WIDTH;
            Ok(OccupancyEntry {
                record: record_at(row, 0)?,
                plant: plant_at(row, plant_at_col)?,
                pot: pot_at(row, pot_at_col)?,
                soil: soil_at(row, pot_at_col + POT_WIDTH)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Database {
    /// Move a plant into a pot with a given soil.
    ///
    /// The plant's current record, if any, is closed on the new start date and
    /// a new open record is appended. Each call is a distinct event: repeating
    /// it logs another repotting. Other plants already in the pot are left in
    /// place.
    pub fn move_plant(&self, input: MoveInput) -> Result<PlantWithLocation> {
        let start_date = input.start_date.unwrap_or_else(today);

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let plant = fetch_plant(&tx, input.plant_id)?.ok_or_else(|| Error::not_found("Plant"))?;
        if !plant.is_active() {
            return Err(Error::Conflict(format!(
                "Plant {} has been removed and cannot be moved",
                plant.name
            )));
        }
        let pot = fetch_pot(&tx, input.pot_id)?.ok_or_else(|| Error::not_found("Pot"))?;
        if !pot.active {
            return Err(Error::Conflict(format!(
                "Pot {} is inactive",
                pot.qr_code_id
            )));
        }
        let soil = fetch_soil(&tx, input.soil_id)?.ok_or_else(|| Error::not_found("Soil"))?;

        if let Some(current) = open_record(&tx, plant.id)? {
            if current.start_date > start_date {
                return Err(Error::Validation(format!(
                    "start_date {start_date} is before the current placement began on {}",
                    current.start_date
                )));
            }
            close_record(&tx, &current, start_date)?;
        }

        tx.execute(
            "INSERT INTO occupancy (plant_id, pot_id, soil_id, start_date, end_date, notes)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                plant.id,
                pot.id,
                soil.id,
                start_date,
                optional_text(input.notes)
            ],
        )?;
        let record_id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            record_id,
            plant_id = plant.id,
            pot_id = pot.id,
            soil_id = soil.id,
            %start_date,
            "moved plant"
        );

        Ok(PlantWithLocation {
            plant,
            current_pot: Some(pot),
            current_soil: Some(soil),
        })
    }

    /// Remove a plant from the collection, closing its current placement today.
    pub fn archive_plant(&self, plant_id: i64, reason: &str) -> Result<Plant> {
        self.archive_plant_on(plant_id, reason, today())
    }

    /// Remove a plant, closing its current placement on `on`. A placement
    /// that starts after `on` is closed on its own start date instead.
    pub fn archive_plant_on(&self, plant_id: i64, reason: &str, on: NaiveDate) -> Result<Plant> {
        let reason = require("removed_reason", reason)?;

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut plant = fetch_plant(&tx, plant_id)?.ok_or_else(|| Error::not_found("Plant"))?;
        if !plant.is_active() {
            return Err(Error::Conflict(format!(
                "Plant {} is already removed",
                plant.name
            )));
        }

        if let Some(current) = open_record(&tx, plant_id)? {
            close_record(&tx, &current, on.max(current.start_date))?;
        }

        tx.execute(
            "UPDATE plants SET status = ?2, removed_reason = ?3 WHERE id = ?1",
            params![plant_id, PlantStatus::Removed.as_str(), reason],
        )?;
        tx.commit()?;

        plant.status = PlantStatus::Removed;
        plant.removed_reason = Some(reason);
        tracing::info!(plant_id, reason = ?plant.removed_reason, "archived plant");
        Ok(plant)
    }

    /// The plant's open occupancy record, if it is currently potted.
    pub fn get_open_record(&self, plant_id: i64) -> Result<Option<OccupancyRecord>> {
        open_record(&self.lock(), plant_id)
    }

    /// Every placement of a plant, newest first.
    pub fn get_plant_history(&self, plant_id: i64) -> Result<Vec<OccupancyEntry>> {
        history(&self.lock(), "plant_id", plant_id)
    }

    /// Every placement recorded in a pot, newest first, looked up by QR code.
    /// Inactive pots keep their history.
    pub fn get_pot_history(&self, qr_code_id: &str) -> Result<Option<Vec<OccupancyEntry>>> {
        let Some(pot) = self.get_pot_by_qr(qr_code_id)? else {
            return Ok(None);
        };
        history(&self.lock(), "pot_id", pot.pot.id).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        db: Database,
        soil: Soil,
        pot_a: Pot,
        pot_b: Pot,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let soil = db
            .create_soil(CreateSoilInput {
                name: "Aroid Mix".into(),
                composition: "bark, perlite, peat".into(),
            })
            .unwrap();
        let pot_a = db
            .create_pot_with_code("POT-A", "Living Room", "15 cm", None)
            .unwrap();
        let pot_b = db
            .create_pot_with_code("POT-B", "Bedroom", "20 cm", None)
            .unwrap();
        Fixture {
            db,
            soil,
            pot_a,
            pot_b,
        }
    }

    fn plant(db: &Database, name: &str) -> Plant {
        db.create_plant(CreatePlantInput {
            name: name.into(),
            family: "Araceae".into(),
            genus: "Monstera".into(),
            species: "deliciosa".into(),
            species2: None,
            variation: None,
            size: PlantSize::Medium,
            date_added: Some(date("2023-12-01")),
            notes: None,
        })
        .unwrap()
    }

    fn move_to(f: &Fixture, plant: &Plant, pot: &Pot, on: &str) -> Result<PlantWithLocation> {
        f.db.move_plant(MoveInput {
            plant_id: plant.id,
            pot_id: pot.id,
            soil_id: f.soil.id,
            start_date: Some(date(on)),
            notes: None,
        })
    }

    fn open_count(db: &Database, plant_id: i64) -> usize {
        db.get_plant_history(plant_id)
            .unwrap()
            .iter()
            .filter(|entry| entry.record.is_open())
            .count()
    }

    #[test]
    fn test_move_between_pots_closes_previous_record() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");

        let moved = move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();
        assert_eq!(moved.current_pot.as_ref().map(|p| p.id), Some(f.pot_a.id));

        let moved = move_to(&f, &p1, &f.pot_b, "2024-02-01").unwrap();
        assert_eq!(moved.current_pot.map(|p| p.id), Some(f.pot_b.id));

        let located = f.db.get_plant_with_location(p1.id).unwrap().unwrap();
        assert_eq!(located.current_pot.map(|p| p.id), Some(f.pot_b.id));
        assert_eq!(located.current_soil.map(|s| s.id), Some(f.soil.id));

        // Newest first.
        let history = f.db.get_plant_history(p1.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].pot.id, f.pot_b.id);
        assert_eq!(history[0].record.end_date, None);
        assert_eq!(history[1].pot.id, f.pot_a.id);
        assert_eq!(history[1].record.start_date, date("2024-01-01"));
        assert_eq!(history[1].record.end_date, Some(date("2024-02-01")));
        assert_eq!(open_count(&f.db, p1.id), 1);
    }

    #[test]
    fn test_repeated_move_logs_each_event() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2024-03-01").unwrap();
        move_to(&f, &p1, &f.pot_a, "2024-03-01").unwrap();

        let history = f.db.get_plant_history(p1.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(open_count(&f.db, p1.id), 1);
        let open = f.db.get_open_record(p1.id).unwrap().unwrap();
        assert_eq!(open.id, history[0].record.id);
    }

    #[test]
    fn test_pot_holds_several_plants() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        let p2 = plant(&f.db, "Pothos");
        move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();
        move_to(&f, &p2, &f.pot_a, "2024-01-05").unwrap();

        let pot = f.db.get_pot_by_qr("POT-A").unwrap().unwrap();
        let ids: Vec<i64> = pot.current_plants.iter().map(|o| o.plant.id).collect();
        assert_eq!(ids, vec![p1.id, p2.id]);
        assert_eq!(pot.current_plants[1].since, date("2024-01-05"));
    }

    #[test]
    fn test_move_rejects_unknown_or_retired_targets() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");

        let missing_plant = f.db.move_plant(MoveInput {
            plant_id: 999,
            pot_id: f.pot_a.id,
            soil_id: f.soil.id,
            start_date: None,
            notes: None,
        });
        assert!(matches!(missing_plant, Err(Error::NotFound(_))));

        let missing_soil = f.db.move_plant(MoveInput {
            plant_id: p1.id,
            pot_id: f.pot_a.id,
            soil_id: 999,
            start_date: None,
            notes: None,
        });
        assert!(matches!(missing_soil, Err(Error::NotFound(_))));

        f.db.deactivate_pot(f.pot_b.id).unwrap();
        assert!(matches!(
            move_to(&f, &p1, &f.pot_b, "2024-01-01"),
            Err(Error::Conflict(_))
        ));

        f.db.archive_plant(p1.id, "Gave away").unwrap();
        assert!(matches!(
            move_to(&f, &p1, &f.pot_a, "2024-01-01"),
            Err(Error::Conflict(_))
        ));
        assert!(f.db.get_plant_history(p1.id).unwrap().is_empty());
    }

    #[test]
    fn test_move_into_inactive_soil_is_allowed() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        f.db.delete_soil(f.soil.id).unwrap();
        let moved = move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();
        assert_eq!(moved.current_soil.map(|s| s.active), Some(false));
    }

    #[test]
    fn test_move_backdated_before_current_placement_is_rejected() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2024-05-01").unwrap();

        let err = move_to(&f, &p1, &f.pot_b, "2024-04-01").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Nothing changed: still one open record in pot A.
        let open = f.db.get_open_record(p1.id).unwrap().unwrap();
        assert_eq!(open.pot_id, f.pot_a.id);
        assert_eq!(f.db.get_plant_history(p1.id).unwrap().len(), 1);
    }

    #[test]
    fn test_archive_closes_placement_and_is_terminal() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();

        let archived = f
            .db
            .archive_plant_on(p1.id, "Died", date("2024-06-01"))
            .unwrap();
        assert_eq!(archived.status, PlantStatus::Removed);
        assert_eq!(archived.removed_reason.as_deref(), Some("Died"));
        assert_eq!(f.db.get_plant(p1.id).unwrap(), Some(archived));

        assert!(f.db.get_open_record(p1.id).unwrap().is_none());
        let history = f.db.get_plant_history(p1.id).unwrap();
        assert_eq!(history[0].record.end_date, Some(date("2024-06-01")));

        let pot = f.db.get_pot_by_qr("POT-A").unwrap().unwrap();
        assert!(pot.current_plants.is_empty());

        let again = f.db.archive_plant(p1.id, "Died");
        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[test]
    fn test_archive_requires_reason() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        assert!(matches!(
            f.db.archive_plant(p1.id, "  "),
            Err(Error::Validation(_))
        ));
        assert!(f.db.get_plant(p1.id).unwrap().unwrap().is_active());
        assert!(matches!(
            f.db.archive_plant(404, "Died"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_archive_of_future_placement_keeps_interval_ordered() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2030-01-01").unwrap();
        f.db.archive_plant_on(p1.id, "Sold", date("2029-12-01"))
            .unwrap();
        let history = f.db.get_plant_history(p1.id).unwrap();
        assert_eq!(history[0].record.end_date, Some(date("2030-01-01")));
    }

    #[test]
    fn test_archive_unpotted_plant() {
        let f = setup();
        let p1 = plant(&f.db, "Jade");
        let archived = f.db.archive_plant(p1.id, "Composted").unwrap();
        assert!(!archived.is_active());
        assert!(f.db.get_plant_history(p1.id).unwrap().is_empty());
    }

    #[test]
    fn test_deactivate_requires_empty_pot() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();

        assert!(matches!(
            f.db.deactivate_pot(f.pot_a.id),
            Err(Error::Conflict(_))
        ));
        assert!(f.db.get_pot(f.pot_a.id).unwrap().unwrap().active);

        move_to(&f, &p1, &f.pot_b, "2024-02-01").unwrap();
        let pot = f.db.deactivate_pot(f.pot_a.id).unwrap();
        assert!(!pot.active);
        assert!(matches!(
            f.db.deactivate_pot(f.pot_a.id),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(f.db.deactivate_pot(999), Err(Error::NotFound(_))));

        // History survives deactivation and is reachable by QR code.
        let history = f.db.get_pot_history("POT-A").unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].plant.id, p1.id);
        assert_eq!(history[0].record.end_date, Some(date("2024-02-01")));
        assert!(f.db.get_pot_history("NOPE").unwrap().is_none());
    }

    #[test]
    fn test_storage_rejects_second_open_record() {
        let f = setup();
        let p1 = plant(&f.db, "Monstera");
        move_to(&f, &p1, &f.pot_a, "2024-01-01").unwrap();

        let conn = f.db.lock();
        let result = conn.execute(
            "INSERT INTO occupancy (plant_id, pot_id, soil_id, start_date) VALUES (?1, ?2, ?3, ?4)",
            params![p1.id, f.pot_b.id, f.soil.id, date("2024-02-01")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_at_most_one_open_record_through_a_sequence() {
        let f = setup();
        let plants: Vec<Plant> = ["Monstera", "Pothos", "Snake Plant"]
            .iter()
            .map(|name| plant(&f.db, name))
            .collect();
        let pots = [&f.pot_a, &f.pot_b];

        for (step, day) in (1..=9).enumerate() {
            let p = &plants[step % plants.len()];
            let pot = pots[step % pots.len()];
            move_to(&f, p, pot, &format!("2024-01-{day:02}")).unwrap();
            for p in &plants {
                assert!(open_count(&f.db, p.id) <= 1);
            }
        }
        f.db.archive_plant(plants[0].id, "Pests").unwrap();
        for p in &plants {
            assert!(open_count(&f.db, p.id) <= 1);
        }
        assert_eq!(open_count(&f.db, plants[0].id), 0);
    }
}
