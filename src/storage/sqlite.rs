//! SQLite storage implementation

use std::path::Path;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use crate::linker::RelationKind;
use crate::{Error, Result};
use super::schema;

/// Caller-owned connection handle.
///
/// Writes go through [`SqliteStore::execute`], which opens a transaction on
/// first use; nothing is durable until [`SqliteStore::commit`] runs. Dropping
/// the handle with an open transaction discards the pending writes.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::storage("open"))?;
        tracing::debug!("Opened database {}", path.display());
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::storage("open"))?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, []).map_err(Error::storage(stmt))?;
        }
        Ok(())
    }

    // ========== Statement Primitives ==========

    /// Run a write statement, opening a transaction if none is active
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN").map_err(Error::storage("BEGIN"))?;
        }
        self.conn.execute(sql, params).map_err(Error::storage(sql))
    }

    /// Commit the open transaction, if any
    pub fn commit(&self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT").map_err(Error::storage("COMMIT"))?;
        }
        Ok(())
    }

    /// Whether uncommitted writes are pending
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Run a read statement and map every row
    pub fn query_map<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql).map_err(Error::storage(sql))?;
        let rows = stmt
            .query_map(params, f)
            .map_err(Error::storage(sql))?
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(Error::storage(sql))?;
        Ok(rows)
    }

    /// Run a read statement expected to return at most one row
    pub fn query_optional<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn
            .query_row(sql, params, f)
            .optional()
            .map_err(Error::storage(sql))
    }

    // ========== Conveyance Operations ==========

    /// Register a vehicle or starship so memberships can reference it
    pub fn insert_conveyance(
        &self,
        kind: RelationKind,
        id: &str,
        name: Option<&str>,
    ) -> Result<()> {
        self.execute(kind.descriptor().insert_conveyance, params![id, name])?;
        self.commit()
    }
}

/// Render any SQLite value as the string form used for identifiers.
///
/// Integer and text ids compare equal once rendered; NULL maps to `None`.
pub fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}
