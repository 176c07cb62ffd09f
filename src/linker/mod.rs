//! Membership relations between characters and conveyances
//!
//! A character relates to conveyances through two junction tables:
//! - `people_vehicles`: character → vehicle
//! - `people_starships`: character → starship
//!
//! Both are driven by one [`RelationLinker`], selected by a [`RelationKind`]
//! whose descriptor carries the fixed statement templates for that relation.

pub mod relation_linker;

pub use relation_linker::{Reconciliation, RelationLinker};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two conveyance relations a character participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Vehicles,
    Starships,
}

/// Table names and statement templates for one relation.
///
/// Membership statements bind the character id as `?1` and the conveyance id
/// as `?2`; the conveyance statements bind the conveyance id as `?1`.
#[derive(Debug)]
pub struct RelationDescriptor {
    pub junction_table: &'static str,
    pub foreign_table: &'static str,
    pub select_members: &'static str,
    pub conveyance_exists: &'static str,
    pub insert_member: &'static str,
    pub delete_member: &'static str,
    pub delete_all: &'static str,
    pub insert_conveyance: &'static str,
}

const VEHICLES: RelationDescriptor = RelationDescriptor {
    junction_table: "people_vehicles",
    foreign_table: "vehicles",
    select_members: "SELECT vehicles FROM people_vehicles WHERE people = ?1",
    conveyance_exists: "SELECT id FROM vehicles WHERE id = ?1",
    insert_member: "INSERT INTO people_vehicles (people, vehicles) SELECT ?1, ?2 \
        WHERE NOT EXISTS (SELECT 1 FROM people_vehicles WHERE people = ?1 AND vehicles = ?2)",
    delete_member: "DELETE FROM people_vehicles WHERE people = ?1 AND vehicles = ?2",
    delete_all: "DELETE FROM people_vehicles WHERE people = ?1",
    insert_conveyance: "INSERT INTO vehicles (id, name) VALUES (?1, ?2)",
};

const STARSHIPS: RelationDescriptor = RelationDescriptor {
    junction_table: "people_starships",
    foreign_table: "starships",
    select_members: "SELECT starships FROM people_starships WHERE people = ?1",
    conveyance_exists: "SELECT id FROM starships WHERE id = ?1",
    insert_member: "INSERT INTO people_starships (people, starships) SELECT ?1, ?2 \
        WHERE NOT EXISTS (SELECT 1 FROM people_starships WHERE people = ?1 AND starships = ?2)",
    delete_member: "DELETE FROM people_starships WHERE people = ?1 AND starships = ?2",
    delete_all: "DELETE FROM people_starships WHERE people = ?1",
    insert_conveyance: "INSERT INTO starships (id, name) VALUES (?1, ?2)",
};

impl RelationKind {
    /// Get the string representation of the relation kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Vehicles => "vehicles",
            RelationKind::Starships => "starships",
        }
    }

    /// Get all relation kinds
    pub fn all() -> &'static [RelationKind] {
        &[RelationKind::Vehicles, RelationKind::Starships]
    }

    /// Statement templates for this relation
    pub fn descriptor(&self) -> &'static RelationDescriptor {
        match self {
            RelationKind::Vehicles => &VEHICLES,
            RelationKind::Starships => &STARSHIPS,
        }
    }

    /// Payload key carrying the desired membership list
    pub fn payload_key(&self) -> &'static str {
        match self {
            RelationKind::Vehicles => "vehicles_id",
            RelationKind::Starships => "starships_id",
        }
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vehicles" | "vehicle" => Ok(RelationKind::Vehicles),
            "starships" | "starship" => Ok(RelationKind::Starships),
            _ => Err(format!("Unknown relation kind: {}", s)),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
