//! SQLite persistence for the registries and the occupancy ledger.

mod ledger;
mod plants;
mod pots;
mod schema;
mod soils;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{Connection, Row};

use crate::error::{Error, Result};
use crate::models::*;

pub use schema::SCHEMA;

const PLANT_COLUMNS: &str = "p.id, p.name, p.family, p.genus, p.species, p.species2, \
     p.variation, p.size, p.status, p.removed_reason, p.date_added, p.notes";
const PLANT_WIDTH: usize = 12;

const POT_COLUMNS: &str = "t.id, t.qr_code_id, t.room, t.size, t.notes, t.active";
const POT_WIDTH: usize = 6;

const SOIL_COLUMNS: &str = "s.id, s.name, s.composition, s.active";

const RECORD_COLUMNS: &str =
    "o.id, o.plant_id, o.pot_id, o.soil_id, o.start_date, o.end_date, o.notes";

/// Shared handle to the tracker database. Cloning is cheap; all clones share
/// one connection, so writes are serialised.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "plant-tracker").ok_or_else(|| {
            Error::Validation("could not determine a home directory for the database".into())
        })?;
        Ok(dirs.data_dir().join("plants.db"))
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create missing tables and indexes, then add columns introduced after
    /// the original schema.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(SCHEMA)?;

        for (table, column, ddl) in schema::ADDITIVE_COLUMNS {
            if !has_column(&conn, table, column)? {
                tracing::info!(table, column, "adding missing column");
                conn.execute_batch(ddl)?;
            }
        }
        Ok(())
    }

    /// True when no plant, pot or soil has been recorded yet.
    pub fn is_empty(&self) -> Result<bool> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM plants) + (SELECT COUNT(*) FROM pots) \
             + (SELECT COUNT(*) FROM soils)",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Poisoning is ignored: the connection itself is still valid.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|name| name == column))
}

fn invalid(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(Error::InvalidData(message)))
}

fn plant_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Plant> {
    let size: String = row.get(at + 7)?;
    let status: String = row.get(at + 8)?;
    Ok(Plant {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        family: row.get(at + 2)?,
        genus: row.get(at + 3)?,
        species: row.get(at + 4)?,
        species2: row.get(at + 5)?,
        variation: row.get(at + 6)?,
        size: PlantSize::from_str(&size)
            .ok_or_else(|| invalid(at + 7, format!("unknown plant size '{size}'")))?,
        status: PlantStatus::from_str(&status)
            .ok_or_else(|| invalid(at + 8, format!("unknown plant status '{status}'")))?,
        removed_reason: row.get(at + 9)?,
        date_added: row.get(at + 10)?,
        notes: row.get(at + 11)?,
    })
}

fn pot_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Pot> {
    Ok(Pot {
        id: row.get(at)?,
        qr_code_id: row.get(at + 1)?,
        room: row.get(at + 2)?,
        size: row.get(at + 3)?,
        notes: row.get(at + 4)?,
        active: row.get(at + 5)?,
    })
}

fn soil_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Soil> {
    Ok(Soil {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        composition: row.get(at + 2)?,
        active: row.get(at + 3)?,
    })
}

fn record_at(row: &Row<'_>, at: usize) -> rusqlite::Result<OccupancyRecord> {
    Ok(OccupancyRecord {
        id: row.get(at)?,
        plant_id: row.get(at + 1)?,
        pot_id: row.get(at + 2)?,
        soil_id: row.get(at + 3)?,
        start_date: row.get(at + 4)?,
        end_date: row.get(at + 5)?,
        notes: row.get(at + 6)?,
    })
}

/// Reads a pot followed by a soil from a LEFT JOIN, where both are absent
/// when the plant has no open record.
fn location_at(row: &Row<'_>, at: usize) -> rusqlite::Result<(Option<Pot>, Option<Soil>)> {
    let pot_id: Option<i64> = row.get(at)?;
    if pot_id.is_none() {
        return Ok((None, None));
    }
    Ok((Some(pot_at(row, at)?), Some(soil_at(row, at + POT_WIDTH)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db.migrate().unwrap();
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn test_migrate_adds_soil_active_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE soils (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    composition TEXT NOT NULL
                );
                INSERT INTO soils (name, composition) VALUES ('Aroid Mix', 'bark, perlite');",
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();

        let soils = db.list_soils(true).unwrap();
        assert_eq!(soils.len(), 1);
        assert!(soils[0].active);
        assert_eq!(db.path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plants.db");
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unknown_size_is_reported_as_invalid_data() {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.lock();
            conn.execute_batch(
                "CREATE TABLE plants (
                    id INTEGER PRIMARY KEY, name TEXT, family TEXT, genus TEXT,
                    species TEXT, species2 TEXT, variation TEXT, size TEXT,
                    status TEXT, removed_reason TEXT, date_added TEXT, notes TEXT
                );
                INSERT INTO plants VALUES
                    (1, 'x', 'f', 'g', 's', NULL, NULL, 'huge', 'active', NULL, '2024-01-01', NULL);",
            )
            .unwrap();
        }
        let err = db.get_plant(1).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)), "got {err:?}");
    }
}
