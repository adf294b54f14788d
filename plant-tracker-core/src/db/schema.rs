pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS plants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    family TEXT NOT NULL,
    genus TEXT NOT NULL,
    species TEXT NOT NULL,
    species2 TEXT,
    variation TEXT,
    size TEXT NOT NULL CHECK (size IN ('seedling', 'small', 'medium', 'large', 'giant')),
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'removed')),
    removed_reason TEXT,
    date_added TEXT NOT NULL,
    notes TEXT,
    CHECK ((status = 'removed') = (removed_reason IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS pots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    qr_code_id TEXT NOT NULL UNIQUE,
    room TEXT NOT NULL,
    size TEXT NOT NULL,
    notes TEXT,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS soils (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    composition TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS occupancy (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_id INTEGER NOT NULL REFERENCES plants(id),
    pot_id INTEGER NOT NULL REFERENCES pots(id),
    soil_id INTEGER NOT NULL REFERENCES soils(id),
    start_date TEXT NOT NULL,
    end_date TEXT,
    notes TEXT,
    CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE INDEX IF NOT EXISTS idx_occupancy_plant ON occupancy(plant_id);
CREATE INDEX IF NOT EXISTS idx_occupancy_pot ON occupancy(pot_id);

-- Only one open occupancy record per plant at a time
CREATE UNIQUE INDEX IF NOT EXISTS idx_one_open_occupancy
    ON occupancy(plant_id) WHERE end_date IS NULL;
"#;

/// Columns added after the first release, applied to databases that predate them.
pub const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[(
    "soils",
    "active",
    "ALTER TABLE soils ADD COLUMN active INTEGER NOT NULL DEFAULT 1",
)];
