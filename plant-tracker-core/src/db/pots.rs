use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use super::plants::optional_text;
use super::{
    plant_at, pot_at, soil_at, Database, PLANT_COLUMNS, PLANT_WIDTH, POT_COLUMNS, SOIL_COLUMNS,
};
use crate::error::{require, Error, Result};
use crate::models::*;

const QR_CODE_LEN: usize = 8;

pub(super) fn fetch_pot(conn: &Connection, id: i64) -> Result<Option<Pot>> {
    let pot = conn
        .query_row(
            &format!("SELECT {POT_COLUMNS} FROM pots t WHERE t.id = ?1"),
            [id],
            |row| pot_at(row, 0),
        )
        .optional()?;
    Ok(pot)
}

fn fetch_pot_by_qr(conn: &Connection, qr_code_id: &str) -> Result<Option<Pot>> {
    let pot = conn
        .query_row(
            &format!("SELECT {POT_COLUMNS} FROM pots t WHERE t.qr_code_id = ?1"),
            [qr_code_id],
            |row| pot_at(row, 0),
        )
        .optional()?;
    Ok(pot)
}

/// Open occupancy records, optionally restricted to one pot, keyed by pot id.
fn current_occupants(
    conn: &Connection,
    pot_id: Option<i64>,
) -> Result<HashMap<i64, Vec<PotOccupant>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT o.pot_id, o.start_date, {PLANT_COLUMNS}, {SOIL_COLUMNS}
         FROM occupancy o
         JOIN plants p ON p.id = o.plant_id
         JOIN soils s ON s.id = o.soil_id
         WHERE o.end_date IS NULL AND (?1 IS NULL OR o.pot_id = ?1)
         ORDER BY o.start_date, o.id"
    ))?;
    let rows = stmt.query_map([pot_id], |row| {
        let pot_id: i64 = row.get(0)?;
        Ok((
            pot_id,
            PotOccupant {
                since: row.get(1)?,
                plant: plant_at(row, 2)?,
                soil: soil_at(row, 2 + PLANT_WIDTH)?,
            },
        ))
    })?;

    let mut by_pot: HashMap<i64, Vec<PotOccupant>> = HashMap::new();
    for row in rows {
        let (pot_id, occupant) = row?;
        by_pot.entry(pot_id).or_default().push(occupant);
    }
    Ok(by_pot)
}

fn count_open_records(conn: &Connection, pot_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM occupancy WHERE pot_id = ?1 AND end_date IS NULL",
        [pot_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn generate_qr_code_id() -> String {
    Uuid::new_v4().simple().to_string()[..QR_CODE_LEN].to_string()
}

impl Database {
    pub fn get_pot(&self, id: i64) -> Result<Option<Pot>> {
        fetch_pot(&self.lock(), id)
    }

    /// Look up a pot by the code on its label, with every plant currently in it.
    pub fn get_pot_by_qr(&self, qr_code_id: &str) -> Result<Option<PotWithOccupants>> {
        let conn = self.lock();
        let Some(pot) = fetch_pot_by_qr(&conn, qr_code_id.trim())? else {
            return Ok(None);
        };
        let current_plants = current_occupants(&conn, Some(pot.id))?
            .remove(&pot.id)
            .unwrap_or_default();
        Ok(Some(PotWithOccupants {
            pot,
            current_plants,
        }))
    }

    pub fn list_pots(&self, include_inactive: bool) -> Result<Vec<PotWithOccupants>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {POT_COLUMNS} FROM pots t
             WHERE ?1 OR t.active = 1
             ORDER BY t.id"
        ))?;
        let pots = stmt
            .query_map([include_inactive], |row| pot_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut occupants = current_occupants(&conn, None)?;
        let pots: Vec<_> = pots
            .into_iter()
            .map(|pot| PotWithOccupants {
                current_plants: occupants.remove(&pot.id).unwrap_or_default(),
                pot,
            })
            .collect();
        tracing::debug!(count = pots.len(), include_inactive, "listed pots");
        Ok(pots)
    }

    /// Create a pot under a freshly generated QR code id.
    pub fn create_pot(&self, input: CreatePotInput) -> Result<CreatedPot> {
        let room = require("room", &input.room)?;
        let size = require("size", &input.size)?;
        let domain = input
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_QR_DOMAIN)
            .to_string();

        let conn = self.lock();
        let mut qr_code_id = generate_qr_code_id();
        while fetch_pot_by_qr(&conn, &qr_code_id)?.is_some() {
            qr_code_id = generate_qr_code_id();
        }

        let pot = insert_pot(&conn, &qr_code_id, &room, &size, optional_text(input.notes))?;
        let qr_url = pot.qr_url(&domain);
        Ok(CreatedPot { pot, qr_url })
    }

    /// Create a pot under a caller-chosen QR code id, e.g. for pre-printed labels.
    pub fn create_pot_with_code(
        &self,
        qr_code_id: &str,
        room: &str,
        size: &str,
        notes: Option<String>,
    ) -> Result<Pot> {
        let qr_code_id = require("qr_code_id", qr_code_id)?;
        let room = require("room", room)?;
        let size = require("size", size)?;

        let conn = self.lock();
        if fetch_pot_by_qr(&conn, &qr_code_id)?.is_some() {
            return Err(Error::Conflict(format!(
                "QR code {qr_code_id} is already assigned"
            )));
        }
        insert_pot(&conn, &qr_code_id, &room, &size, optional_text(notes))
    }

    pub fn update_pot(&self, id: i64, input: UpdatePotInput) -> Result<Option<Pot>> {
        let conn = self.lock();
        let Some(mut pot) = fetch_pot(&conn, id)? else {
            return Ok(None);
        };

        if let Some(room) = input.room {
            pot.room = require("room", &room)?;
        }
        if let Some(size) = input.size {
            pot.size = require("size", &size)?;
        }
        if input.notes.is_some() {
            pot.notes = optional_text(input.notes);
        }

        conn.execute(
            "UPDATE pots SET room = ?2, size = ?3, notes = ?4 WHERE id = ?1",
            params![id, pot.room, pot.size, pot.notes],
        )?;
        tracing::info!(pot_id = id, "updated pot");
        Ok(Some(pot))
    }

    /// Retire an empty pot. Its history stays reachable through its QR code.
    pub fn deactivate_pot(&self, id: i64) -> Result<Pot> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut pot = fetch_pot(&tx, id)?.ok_or_else(|| Error::not_found("Pot"))?;
        if !pot.active {
            return Err(Error::Conflict(format!(
                "Pot {} is already inactive",
                pot.qr_code_id
            )));
        }
        let occupants = count_open_records(&tx, id)?;
        if occupants > 0 {
            return Err(Error::Conflict(format!(
                "Pot {} still holds {occupants} plant(s); move or archive them first",
                pot.qr_code_id
            )));
        }

        tx.execute("UPDATE pots SET active = 0 WHERE id = ?1", [id])?;
        tx.commit()?;

        pot.active = false;
        tracing::info!(pot_id = id, qr_code_id = %pot.qr_code_id, "deactivated pot");
        Ok(pot)
    }
}

fn insert_pot(
    conn: &Connection,
    qr_code_id: &str,
    room: &str,
    size: &str,
    notes: Option<String>,
) -> Result<Pot> {
    conn.execute(
        "INSERT INTO pots (qr_code_id, room, size, notes, active) VALUES (?1, ?2, ?3, ?4, 1)",
        params![qr_code_id, room, size, notes],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(pot_id = id, qr_code_id, room, "created pot");
    Ok(Pot {
        id,
        qr_code_id: qr_code_id.to_string(),
        room: room.to_string(),
        size: size.to_string(),
        notes,
        active: true,
    })
}
