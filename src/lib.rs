//! Plant Tracker server: HTTP API, MCP server and CLI support on top of
//! [`plant_tracker_core`].

pub mod api;
pub mod config;
pub mod mcp;
pub mod seed;

pub use plant_tracker_core::{db, filter, models, Database, Error};
