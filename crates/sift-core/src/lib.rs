//! sift-core: a conflict-free replicated ordered list.
//!
//! Replicas edit their own copy of the list and later exchange whole stores.
//! Merging is a union of item records with last-writer-wins fields, so any
//! number of replicas converge regardless of merge order or repetition.
//!
//! - [`order`]: dense order keys (string and rational realizations).
//! - [`crdt`]: the LWW register and the [`crdt::Merge`] trait.
//! - [`model`]: item ids, states and records.
//! - [`store`]: the grow-only item map and its merge.
//! - [`projection`]: the sorted, tombstone-free list view.
//! - [`replica`]: a writer's handle (replica id + clock) over a store.
//! - [`snapshot`]: the versioned JSON encoding.
//!
//! # Conventions
//!
//! - **Errors**: core operations return [`error::SiftError`]; config loading
//!   uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`debug!`, `warn!`, `trace!`).

pub mod clock;
pub mod config;
pub mod crdt;
pub mod error;
pub mod lock;
pub mod model;
pub mod order;
pub mod projection;
pub mod replica;
pub mod snapshot;
pub mod store;

pub use error::{ErrorCode, SiftError};
pub use model::{Item, ItemId, ItemRecord, State};
pub use order::{AlphaKey, KeyKind, OrderKey, RationalKey};
pub use replica::Replica;
pub use store::ItemStore;
