//! # swapi-people - Character records with conveyance memberships
//!
//! A character owns two independent many-to-many memberships: vehicles and
//! starships. This crate provides:
//! - `SqliteStore`: the caller-owned connection handle
//! - `RelationLinker`: membership reads, validation and set-difference reconciliation
//! - `CharacterStore`: scalar CRUD plus the denormalized, merged character view

pub mod character;
pub mod config;
pub mod linker;
pub mod storage;

// Re-exports for convenient access
pub use character::{Character, CharacterPayload, CharacterStore, ScalarField};
pub use linker::{Reconciliation, RelationKind, RelationLinker};
pub use storage::SqliteStore;

/// Result type alias for swapi-people operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for swapi-people operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No character found: {}", .0.as_deref().unwrap_or("<any>"))]
    NotFound(Option<String>),

    #[error("The specified {relation} does not exist: ID: {id}")]
    InvalidReference { relation: RelationKind, id: String },

    #[error("Storage error while running `{statement}`: {source}")]
    Storage {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl Error {
    /// Build a closure wrapping a rusqlite error with the statement that caused it
    pub(crate) fn storage(statement: &str) -> impl FnOnce(rusqlite::Error) -> Error + '_ {
        move |source| Error::Storage {
            statement: statement.trim().to_string(),
            source,
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
