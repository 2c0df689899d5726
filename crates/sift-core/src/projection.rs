//! Sorted projection of an item store.
//!
//! The visible list is recomputed from scratch on every call: tombstones are
//! dropped and the rest sorted by `(order key, id)`. Nothing is cached or
//! maintained incrementally.

use crate::model::{Item, ItemRecord};
use crate::order::OrderKey;
use crate::store::ItemStore;

/// Every record, tombstones included, in list order.
pub fn sorted_records<K: OrderKey>(store: &ItemStore<K>) -> Vec<&ItemRecord<K>> {
    let mut records: Vec<&ItemRecord<K>> = store.records().collect();
    records.sort_by(|a, b| a.list_order(b));
    records
}

/// The list as presented to users: live items in list order.
pub fn visible_items<K: OrderKey>(store: &ItemStore<K>) -> Vec<Item> {
    sorted_records(store)
        .into_iter()
        .filter(|record| !record.is_removed())
        .map(ItemRecord::view)
        .collect()
}

/// Every item in list order, tombstones included.
pub fn all_items<K: OrderKey>(store: &ItemStore<K>) -> Vec<Item> {
    sorted_records(store)
        .into_iter()
        .map(ItemRecord::view)
        .collect()
}
