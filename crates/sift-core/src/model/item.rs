use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

use crate::crdt::{LwwRegister, Merge};
use crate::model::item_id::ItemId;
use crate::order::OrderKey;

/// Check state of a list item.
///
/// `Removed` is a terminal tombstone: once an item is removed no operation
/// brings it back, and a removed state wins every merge against a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Unchecked,
    Checked,
    Removed,
}

impl State {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Checked => "checked",
            Self::Removed => "removed",
        }
    }

    /// The state a toggle moves to, or `None` for a tombstone.
    pub const fn toggled(self) -> Option<Self> {
        match self {
            Self::Unchecked => Some(Self::Checked),
            Self::Checked => Some(Self::Unchecked),
            Self::Removed => None,
        }
    }

    pub const fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchecked" => Ok(Self::Unchecked),
            "checked" => Ok(Self::Checked),
            "removed" => Ok(Self::Removed),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`State`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state: '{0}' (expected unchecked, checked or removed)")]
pub struct ParseStateError(pub String);

/// Merge two state registers with tombstone dominance.
///
/// A removed register beats a live one regardless of timestamps; otherwise
/// the plain LWW chain decides. This is a max over the total order
/// `(is_removed, LWW precedence)`, so it stays a semilattice.
pub fn merge_state(current: &mut LwwRegister<State>, other: &LwwRegister<State>) {
    match (current.value.is_removed(), other.value.is_removed()) {
        (false, true) => current.clone_from(other),
        (true, false) => {}
        _ => current.merge(other),
    }
}

/// One item of the replicated list.
///
/// `id` and `order` are fixed at creation. `title` and `state` change only
/// through new LWW writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: OrderKey"))]
pub struct ItemRecord<K> {
    pub id: ItemId,
    pub order: K,
    pub title: LwwRegister<String>,
    pub state: LwwRegister<State>,
}

impl<K: OrderKey> ItemRecord<K> {
    /// Position in the list: order key first, id as tie-break.
    pub fn list_order(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// The externally visible fields.
    pub fn view(&self) -> Item {
        Item {
            id: self.id,
            title: self.title.value.clone(),
            state: self.state.value,
        }
    }

    pub const fn is_removed(&self) -> bool {
        self.state.value.is_removed()
    }
}

impl<K: OrderKey> Merge for ItemRecord<K> {
    fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.id, other.id);
        if self.order != other.order {
            // One id is created exactly once, so this only happens with a
            // hand-edited or corrupted snapshot. Keep the lesser key so the
            // outcome is still independent of merge order.
            tracing::warn!(
                id = %self.id,
                ours = %self.order,
                theirs = %other.order,
                "order key differs for the same item"
            );
            if other.order < self.order {
                self.order = other.order.clone();
            }
        }
        self.title.merge(&other.title);
        merge_state(&mut self.state, &other.state);
    }
}

/// A row of the sorted projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub state: State,
}
