pub mod lww;

pub use lww::LwwRegister;

/// A join-semilattice merge.
///
/// Implementations must be commutative, associative and idempotent, so
/// replicas that exchange state in any order, any number of times, converge.
pub trait Merge {
    fn merge(&mut self, other: &Self);
}
