//! Core library for Plant Tracker.
//!
//! This crate provides the domain models, the plant/pot/soil registries and
//! the occupancy ledger, independent of any transport layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use plant_tracker_core::db::Database;
//! use plant_tracker_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let moved = db.move_plant(MoveInput {
//!     plant_id: 1,
//!     pot_id: 2,
//!     soil_id: 1,
//!     start_date: None,
//!     notes: Some("Repotted".into()),
//! })?;
//! println!("{} now lives in {:?}", moved.plant.name, moved.current_pot);
//! # Ok::<(), plant_tracker_core::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod filter;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{Error, Result};
