//! The replicated item store: a grow-only map from [`ItemId`] to
//! [`ItemRecord`].
//!
//! Records are added and never taken out. Deleting an item is a write of
//! [`State::Removed`](crate::model::State::Removed) to its state register; the
//! tombstone stays in the map.
//!
//! # Merge Semantics
//!
//! `merge(a, b)` is a union over ids. Where both sides hold the same id the
//! records merge field by field (see [`ItemRecord`]'s `Merge` impl). The
//! union of semilattices keyed by id is itself a semilattice, so replicas
//! converge no matter how often or in which order they exchange state.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::crdt::Merge;
use crate::error::SiftError;
use crate::model::{ItemId, ItemRecord};
use crate::order::OrderKey;
use crate::projection;

/// Grow-only set of item records keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStore<K> {
    records: BTreeMap<ItemId, ItemRecord<K>>,
}

impl<K> Default for ItemStore<K> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<K: OrderKey> ItemStore<K> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, tombstones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemRecord<K>> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.records.contains_key(id)
    }

    /// All records in id order, tombstones included.
    pub fn records(&self) -> impl Iterator<Item = &ItemRecord<K>> {
        self.records.values()
    }

    /// Add a record, merging it into an existing record with the same id.
    pub fn insert(&mut self, record: ItemRecord<K>) {
        match self.records.entry(record.id) {
            Entry::Occupied(mut existing) => existing.get_mut().merge(&record),
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    pub(crate) fn get_mut(&mut self, id: &ItemId) -> Option<&mut ItemRecord<K>> {
        self.records.get_mut(id)
    }

    /// Compute the order key for an item inserted directly after `after`.
    ///
    /// `None` inserts before every existing record. Neighbors are looked up
    /// in the full order, tombstones included, so a removed item is still a
    /// valid anchor. Records tied with the anchor's key are skipped.
    ///
    /// # Errors
    ///
    /// - [`SiftError::NotFound`] if `after` names an unknown id.
    /// - [`SiftError::Order`] if the key domain rejects the neighbors.
    pub fn key_after(&self, after: Option<&ItemId>) -> Result<K, SiftError> {
        let sorted = projection::sorted_records(self);
        let Some(after) = after else {
            return K::mid(None, sorted.first().map(|r| &r.order));
        };

        let anchor = self.get(after).ok_or(SiftError::NotFound(*after))?;
        let successor = sorted
            .iter()
            .map(|r| &r.order)
            .find(|order| **order > anchor.order);
        K::mid(Some(&anchor.order), successor)
    }

    /// Ids whose text starts with `prefix` (hyphens and case ignored).
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<ItemId> {
        self.records
            .keys()
            .filter(|id| id.matches_prefix(prefix))
            .copied()
            .collect()
    }

    /// `merge(a, b)` as a new store.
    pub fn merged(a: &Self, b: &Self) -> Self {
        let mut out = a.clone();
        out.merge(b);
        out
    }
}

impl<K: OrderKey> Merge for ItemStore<K> {
    fn merge(&mut self, other: &Self) {
        let before = self.records.len();
        for record in other.records.values() {
            self.insert(record.clone());
        }
        tracing::debug!(
            added = self.records.len() - before,
            incoming = other.records.len(),
            "merged item store"
        );
    }
}
