//! Last-Writer-Wins (LWW) Register CRDT.
//!
//! Item titles and check states are LWW registers. A write never edits a
//! register in place: it replaces the whole `(value, stamp)` pair with a
//! fresh one, and merge keeps whichever pair wins.
//!
//! # Tie-Breaking Chain
//!
//! Given two `LwwRegister<T>` values `a` and `b`:
//!
//! 1. **Wall-clock timestamp**: higher `wall_ts` wins.
//! 2. **Replica ID**: if wall clocks are equal, the lexicographically greater
//!    `replica` wins.
//! 3. **Value**: if both were written by the same replica at the same
//!    microsecond (which a well-behaved clock never does), the greater value
//!    wins.
//!
//! The chain is a total order over registers, so merge is a max and forms a
//! semilattice.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::crdt::Merge;

/// A Last-Writer-Wins register holding a value of type `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LwwRegister<T> {
    /// The current value of the register.
    pub value: T,
    /// Wall-clock timestamp in microseconds since Unix epoch.
    pub wall_ts: u64,
    /// Replica that performed the write.
    pub replica: String,
}

impl<T> LwwRegister<T> {
    /// Create a new LWW register with the given value and metadata.
    pub fn new(value: T, wall_ts: u64, replica: impl Into<String>) -> Self {
        Self {
            value,
            wall_ts,
            replica: replica.into(),
        }
    }
}

impl<T: Ord> LwwRegister<T> {
    /// Position of `self` relative to `other` in the tie-breaking chain.
    pub fn precedence(&self, other: &Self) -> Ordering {
        self.wall_ts
            .cmp(&other.wall_ts)
            .then_with(|| self.replica.cmp(&other.replica))
            .then_with(|| self.value.cmp(&other.value))
    }

    /// Returns `true` if `self` wins over (or is identical to) `other`.
    pub fn wins_over(&self, other: &Self) -> bool {
        self.precedence(other) != Ordering::Less
    }
}

impl<T: Ord + Clone> Merge for LwwRegister<T> {
    fn merge(&mut self, other: &Self) {
        if !self.wins_over(other) {
            self.clone_from(other);
        }
    }
}

impl<T: fmt::Display> fmt::Display for LwwRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
