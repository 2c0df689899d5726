//! A replica: one writer's handle on an [`ItemStore`].
//!
//! The store itself is plain mergeable data. A `Replica` adds what a writer
//! needs to produce new LWW writes: its replica id and a [`Clock`]. Callers
//! own the replica exclusively; nothing here locks.

use crate::clock::{Clock, SystemClock};
use crate::crdt::{LwwRegister, Merge};
use crate::error::SiftError;
use crate::model::{Item, ItemId, ItemRecord, State};
use crate::order::OrderKey;
use crate::projection;
use crate::store::ItemStore;

/// Local, writable copy of the replicated list.
#[derive(Debug, Clone)]
pub struct Replica<K, C = SystemClock> {
    id: String,
    clock: C,
    store: ItemStore<K>,
}

impl<K: OrderKey, C: Clock> Replica<K, C> {
    /// Start a replica with an empty store.
    pub fn new(id: impl Into<String>, clock: C) -> Self {
        Self::with_store(id, clock, ItemStore::new())
    }

    /// Resume a replica from a previously loaded store.
    pub fn with_store(id: impl Into<String>, clock: C, store: ItemStore<K>) -> Self {
        Self {
            id: id.into(),
            clock,
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn store(&self) -> &ItemStore<K> {
        &self.store
    }

    pub fn into_store(self) -> ItemStore<K> {
        self.store
    }

    /// Live items in list order.
    pub fn visible_items(&self) -> Vec<Item> {
        projection::visible_items(&self.store)
    }

    /// Create an item directly after `after` (or first, when `None`).
    ///
    /// The order key is computed before anything is written, so a failure
    /// leaves the store untouched.
    ///
    /// # Errors
    ///
    /// - [`SiftError::NotFound`] if `after` is unknown.
    /// - [`SiftError::Order`] if no key fits between the neighbors.
    pub fn new_item(
        &mut self,
        title: impl Into<String>,
        after: Option<&ItemId>,
    ) -> Result<ItemRecord<K>, SiftError> {
        let order = self.store.key_after(after)?;
        let wall_ts = self.clock.now_us();
        let record = ItemRecord {
            id: ItemId::generate(),
            order,
            title: LwwRegister::new(title.into(), wall_ts, self.id.clone()),
            state: LwwRegister::new(State::Unchecked, wall_ts, self.id.clone()),
        };
        tracing::debug!(id = %record.id, order = %record.order, "created item");
        self.store.insert(record.clone());
        Ok(record)
    }

    /// Flip an item between unchecked and checked. Returns the new state.
    ///
    /// # Errors
    ///
    /// - [`SiftError::NotFound`] if `id` is unknown.
    /// - [`SiftError::ItemRemoved`] if the item is a tombstone.
    pub fn toggle(&mut self, id: &ItemId) -> Result<State, SiftError> {
        let current = self.live_record(id)?;
        let floor = current.state.wall_ts;
        let next = current
            .state
            .value
            .toggled()
            .ok_or(SiftError::ItemRemoved(*id))?;
        let write = self.write(next, floor);
        self.record_mut(id)?.state = write;
        tracing::debug!(%id, state = %next, "toggled item");
        Ok(next)
    }

    /// Replace an item's title.
    ///
    /// # Errors
    ///
    /// - [`SiftError::NotFound`] if `id` is unknown.
    /// - [`SiftError::ItemRemoved`] if the item is a tombstone.
    pub fn set_title(&mut self, id: &ItemId, title: impl Into<String>) -> Result<(), SiftError> {
        let floor = self.live_record(id)?.title.wall_ts;
        let write = self.write(title.into(), floor);
        self.record_mut(id)?.title = write;
        tracing::debug!(%id, "retitled item");
        Ok(())
    }

    /// Tombstone an item. Removing a removed item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::NotFound`] if `id` is unknown.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), SiftError> {
        let record = self.store.get(id).ok_or(SiftError::NotFound(*id))?;
        if record.is_removed() {
            return Ok(());
        }
        let floor = record.state.wall_ts;
        let write = self.write(State::Removed, floor);
        self.record_mut(id)?.state = write;
        tracing::debug!(%id, "removed item");
        Ok(())
    }

    /// Fold another replica's state into this one.
    pub fn merge(&mut self, other: &ItemStore<K>) {
        self.store.merge(other);
    }

    /// A fresh register stamped strictly after `floor`.
    ///
    /// Bumping past the register being replaced keeps a local write from
    /// losing to the value it overwrote when that value came from a replica
    /// whose clock runs ahead.
    fn write<T>(&mut self, value: T, floor: u64) -> LwwRegister<T> {
        let wall_ts = self.clock.now_us().max(floor.saturating_add(1));
        LwwRegister::new(value, wall_ts, self.id.clone())
    }

    fn live_record(&self, id: &ItemId) -> Result<&ItemRecord<K>, SiftError> {
        let record = self.store.get(id).ok_or(SiftError::NotFound(*id))?;
        if record.is_removed() {
            return Err(SiftError::ItemRemoved(*id));
        }
        Ok(record)
    }

    fn record_mut(&mut self, id: &ItemId) -> Result<&mut ItemRecord<K>, SiftError> {
        self.store.get_mut(id).ok_or(SiftError::NotFound(*id))
    }
}
