//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - people(id, url, created, edited, name, height, mass, ...)
//! - vehicles(id, name), starships(id, name)
//! - people_vehicles(people, vehicles), people_starships(people, starships)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, value_to_string};
