//! Character Store - scalar CRUD orchestrating the two relation linkers
//!
//! Every operation takes the caller's [`SqliteStore`] handle. Multi-step
//! operations commit at each stage: the scalar row first, then each
//! relation. A failure in a later stage leaves earlier stages committed.

use chrono::{SecondsFormat, Utc};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use crate::linker::{RelationKind, RelationLinker};
use crate::storage::{SqliteStore, value_to_string};
use crate::{Error, Result};
use super::merge::{CharacterRow, merge_rows};
use super::model::{Character, CharacterPayload, ScalarField};

/// Both relation shapes of the read path; `$filter` is spliced into each half
macro_rules! flattened_select {
    ($filter:literal) => {
        concat!(
            "SELECT people.id, people.url, people.created, people.edited, people.name, ",
            "people.height, people.mass, people.hair_color, people.skin_color, people.eye_color, ",
            "people.birth_year, people.gender, people.homeworld, ",
            "people_vehicles.vehicles, vehicles.name, NULL, NULL ",
            "FROM people ",
            "LEFT JOIN people_vehicles ON people.id = people_vehicles.people ",
            "LEFT JOIN vehicles ON vehicles.id = people_vehicles.vehicles ",
            $filter,
            " UNION ",
            "SELECT people.id, people.url, people.created, people.edited, people.name, ",
            "people.height, people.mass, people.hair_color, people.skin_color, people.eye_color, ",
            "people.birth_year, people.gender, people.homeworld, ",
            "NULL, NULL, people_starships.starships, starships.name ",
            "FROM people ",
            "LEFT JOIN people_starships ON people.id = people_starships.people ",
            "LEFT JOIN starships ON starships.id = people_starships.starships ",
            $filter
        )
    };
}

const SELECT_ALL: &str = flattened_select!("");
const SELECT_BY_ID: &str = flattened_select!("WHERE people.id = ?1");
/// Largest id made only of decimal digits, compared by magnitude without casting
const SELECT_MAX_ID: &str = "SELECT id FROM people \
    WHERE id GLOB '[0-9]*' AND id NOT GLOB '*[^0-9]*' \
    ORDER BY length(ltrim(id, '0')) DESC, ltrim(id, '0') DESC LIMIT 1";
const DELETE_CHARACTER: &str = "DELETE FROM people WHERE id = ?1";

/// Identifier given to the first character of an empty store
pub const FIRST_ID: &str = "1";

/// Entry point for character reads and writes
#[derive(Debug, Clone, Copy)]
pub struct CharacterStore {
    vehicles: RelationLinker,
    starships: RelationLinker,
}

impl Default for CharacterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterStore {
    pub fn new() -> Self {
        Self {
            vehicles: RelationLinker::new(RelationKind::Vehicles),
            starships: RelationLinker::new(RelationKind::Starships),
        }
    }

    /// The linker managing one relation
    pub fn linker(&self, kind: RelationKind) -> &RelationLinker {
        match kind {
            RelationKind::Vehicles => &self.vehicles,
            RelationKind::Starships => &self.starships,
        }
    }

    /// Get every character, or the one matching `id`.
    ///
    /// Fails with `NotFound` when nothing matches.
    pub fn get(&self, store: &SqliteStore, id: Option<&str>) -> Result<Vec<Character>> {
        let rows = match id {
            Some(id) => store.query_map(SELECT_BY_ID, [id], row_to_character)?,
            None => store.query_map(SELECT_ALL, [], row_to_character)?,
        };

        let characters = merge_rows(rows);
        if characters.is_empty() {
            return Err(Error::NotFound(id.map(str::to_string)));
        }
        Ok(characters)
    }

    /// Get exactly one character by id
    pub fn get_one(&self, store: &SqliteStore, id: &str) -> Result<Character> {
        self.get(store, Some(id))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(Some(id.to_string())))
    }

    /// Create a character and link the conveyances listed in the payload
    pub fn add(&self, store: &SqliteStore, payload: &CharacterPayload) -> Result<Character> {
        let id = next_id(store)?;
        let url = id.clone();
        let created = now_timestamp();

        let mut columns: Vec<&str> = ScalarField::all().iter().map(ScalarField::column).collect();
        columns.extend(["id", "url", "created"]);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT INTO people ({}) VALUES ({})", columns.join(", "), placeholders);

        let mut values: Vec<Option<&str>> = ScalarField::all()
            .iter()
            .map(|&field| payload.scalar(field).flatten())
            .collect();
        values.extend([Some(id.as_str()), Some(url.as_str()), Some(created.as_str())]);

        store.execute(&sql, params_from_iter(values))?;
        store.commit()?;
        tracing::info!("Created character {}", id);

        for kind in RelationKind::all() {
            if let Some(ids) = payload.relation_ids(*kind).filter(|ids| !ids.is_empty()) {
                self.linker(*kind).add(store, &id, ids)?;
            }
        }

        self.get_one(store, &id)
    }

    /// Update supplied scalars and reconcile both memberships.
    ///
    /// `edited` is written together with the scalar columns; a payload with
    /// no recognized scalars leaves both untouched.
    pub fn update(
        &self,
        store: &SqliteStore,
        id: &str,
        payload: &CharacterPayload,
    ) -> Result<Character> {
        let existing = self.get_one(store, id)?;
        let edited = now_timestamp();

        let supplied = payload.supplied_scalars();
        if !supplied.is_empty() {
            let assignments: Vec<String> = supplied
                .iter()
                .map(|(field, _)| format!("{} = ?", field.column()))
                .collect();
            let sql = format!(
                "UPDATE people SET {}, edited = ? WHERE id = ?",
                assignments.join(", ")
            );

            let mut values: Vec<Option<&str>> = supplied.iter().map(|(_, value)| *value).collect();
            values.extend([Some(edited.as_str()), Some(id)]);

            store.execute(&sql, params_from_iter(values))?;
            store.commit()?;
        }

        for kind in RelationKind::all() {
            self.linker(*kind).update(
                store,
                id,
                existing.relation_ids(*kind),
                payload.relation_ids(*kind),
            )?;
        }
        tracing::info!("Updated character {}", id);

        self.get_one(store, id)
    }

    /// Delete a character and its memberships; returns the deleted id
    pub fn delete(&self, store: &SqliteStore, id: &str) -> Result<String> {
        let existing = self.get_one(store, id)?;

        store.execute(DELETE_CHARACTER, [id])?;
        store.commit()?;

        for kind in RelationKind::all() {
            if !existing.relation_ids(*kind).is_empty() {
                self.linker(*kind).delete(store, id, None)?;
            }
        }
        tracing::info!("Deleted character {}", id);

        Ok(existing.id)
    }
}

/// One greater than the largest id that reads as an integer.
///
/// Ids with any non-digit character are ignored. The increment works on the
/// decimal text, so ids beyond the `i64` range keep counting up.
fn next_id(store: &SqliteStore) -> Result<String> {
    let max = store
        .query_optional(SELECT_MAX_ID, [], |row| row.get::<_, Value>(0))?
        .and_then(value_to_string);
    Ok(max.map_or_else(|| FIRST_ID.to_string(), |max| increment_decimal(&max)))
}

/// Add one to a string of ASCII digits
fn increment_decimal(digits: &str) -> String {
    let mut bytes: Vec<u8> = digits.trim_start_matches('0').bytes().collect();
    let mut carry = true;
    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            carry = false;
            break;
        }
    }
    if carry {
        bytes.insert(0, b'1');
    }
    bytes.into_iter().map(char::from).collect()
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn text(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(value_to_string(row.get::<_, Value>(idx)?))
}

/// Helper to convert a row of the flattened query
fn row_to_character(row: &rusqlite::Row) -> rusqlite::Result<CharacterRow> {
    let mut character = Character {
        id: text(row, 0)?.unwrap_or_default(),
        url: text(row, 1)?,
        created: text(row, 2)?.unwrap_or_default(),
        edited: text(row, 3)?,
        ..Character::default()
    };
    for (offset, field) in ScalarField::all().iter().enumerate() {
        *character.scalar_mut(*field) = text(row, 4 + offset)?;
    }

    Ok(CharacterRow {
        character,
        vehicle_id: text(row, 13)?,
        vehicle_name: text(row, 14)?,
        starship_id: text(row, 15)?,
        starship_name: text(row, 16)?,
    })
}
