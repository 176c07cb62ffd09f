//! Relation Linker - reconciles one junction table against a desired membership set
//!
//! Writes are not atomic across a call: `add` validates and inserts one id at
//! a time and commits once at the end, and `update` runs its add phase and its
//! remove phase as two separate commits. A failure midway leaves the rows
//! written so far in place.

use std::collections::BTreeSet;
use rusqlite::params;
use rusqlite::types::Value;
use crate::storage::{SqliteStore, value_to_string};
use crate::{Error, Result};
use super::RelationKind;

/// Outcome of a reconciliation: the ids actually inserted and removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl Reconciliation {
    /// True when the call issued no writes
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Manages the membership rows of one relation kind
#[derive(Debug, Clone, Copy)]
pub struct RelationLinker {
    kind: RelationKind,
}

impl RelationLinker {
    pub fn new(kind: RelationKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Get the conveyance ids currently linked to a character
    pub fn get_by_character(&self, store: &SqliteStore, character_id: &str) -> Result<Vec<String>> {
        let ids = store
            .query_map(self.kind.descriptor().select_members, [character_id], |row| {
                row.get::<_, Value>(0)
            })?
            .into_iter()
            .filter_map(value_to_string)
            .collect();
        Ok(ids)
    }

    /// Link a character to each of the given conveyances.
    ///
    /// The input is deduplicated, then each id is checked against the
    /// conveyance table and inserted. An unknown id aborts the loop with
    /// `InvalidReference`; ids inserted before it are committed and stay.
    pub fn add<I>(&self, store: &SqliteStore, character_id: &str, conveyance_ids: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let unique: BTreeSet<String> = conveyance_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let outcome = unique
            .iter()
            .try_for_each(|id| self.insert_checked(store, character_id, id));
        self.finish_batch(store, character_id, outcome)
    }

    /// Converge a character's membership from `old_ids` to `new_ids`.
    ///
    /// `None` for `new_ids` means no list was supplied and nothing is written.
    /// An empty list removes every id in `old_ids`.
    pub fn update<O, N>(
        &self,
        store: &SqliteStore,
        character_id: &str,
        old_ids: O,
        new_ids: Option<N>,
    ) -> Result<Reconciliation>
    where
        O: IntoIterator,
        O::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let Some(new_ids) = new_ids else {
            tracing::debug!(
                "No {} supplied for character {}",
                self.kind.payload_key(),
                character_id
            );
            return Ok(Reconciliation::default());
        };

        let old: BTreeSet<String> =
            old_ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let new: BTreeSet<String> =
            new_ids.into_iter().map(|id| id.as_ref().to_string()).collect();

        let reconciliation = Reconciliation {
            added: new.difference(&old).cloned().collect(),
            removed: old.difference(&new).cloned().collect(),
        };

        if !reconciliation.added.is_empty() {
            self.add(store, character_id, &reconciliation.added)?;
        }
        if !reconciliation.removed.is_empty() {
            self.delete(store, character_id, Some(reconciliation.removed.as_slice()))?;
        }

        tracing::debug!(
            "Reconciled {} for character {}: +{:?} -{:?}",
            self.kind, character_id, reconciliation.added, reconciliation.removed
        );
        Ok(reconciliation)
    }

    /// Unlink conveyances from a character: all of them, or only `conveyance_ids`.
    ///
    /// A failing delete stops the loop; rows removed before it are committed.
    pub fn delete(
        &self,
        store: &SqliteStore,
        character_id: &str,
        conveyance_ids: Option<&[String]>,
    ) -> Result<usize> {
        let descriptor = self.kind.descriptor();
        let outcome = match conveyance_ids {
            None => store.execute(descriptor.delete_all, [character_id]),
            Some(ids) => {
                let unique: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
                unique.into_iter().try_fold(0, |removed, id| {
                    let count = store.execute(descriptor.delete_member, params![character_id, id])?;
                    Ok::<_, Error>(removed + count)
                })
            }
        };
        self.finish_batch(store, character_id, outcome)
    }

    /// Commit a batch of junction writes, including the part that ran before a failure
    fn finish_batch<T>(
        &self,
        store: &SqliteStore,
        character_id: &str,
        outcome: Result<T>,
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                store.commit()?;
                Ok(value)
            }
            Err(err) => {
                if store.in_transaction() {
                    tracing::warn!(
                        "Committing partial {} batch for character {} after failure: {}",
                        self.kind,
                        character_id,
                        err
                    );
                    if let Err(commit_err) = store.commit() {
                        tracing::error!("Failed to commit partial batch: {}", commit_err);
                    }
                }
                Err(err)
            }
        }
    }

    fn insert_checked(
        &self,
        store: &SqliteStore,
        character_id: &str,
        conveyance_id: &str,
    ) -> Result<()> {
        let descriptor = self.kind.descriptor();
        let exists = store
            .query_optional(descriptor.conveyance_exists, [conveyance_id], |_| Ok(()))?
            .is_some();
        if !exists {
            return Err(Error::InvalidReference {
                relation: self.kind,
                id: conveyance_id.to_string(),
            });
        }
        store.execute(descriptor.insert_member, params![character_id, conveyance_id])?;
        Ok(())
    }
}
