//! Dense order keys used to position list items.
//!
//! An order key is assigned once when an item is created and never changes.
//! Inserting between two neighbors asks the key domain for a value strictly
//! between their keys, so no neighbor is ever renumbered.
//!
//! Two interchangeable realizations are provided:
//!
//! - [`AlphaKey`]: canonical base-26 fractions spelled with `'a'..='z'`.
//! - [`RationalKey`]: arbitrary-precision rationals in the open interval (0, 1).
//!
//! A store is generic over one [`OrderKey`] type, so the two can never be
//! mixed inside one store. The realization is chosen at the snapshot boundary
//! (see [`crate::snapshot`]).

pub mod alpha;
pub mod rational;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SiftError;

pub use alpha::AlphaKey;
pub use rational::RationalKey;

/// The order key realizations a snapshot can be written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    #[default]
    Alpha,
    Rational,
}

impl KeyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Rational => "rational",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpha" | "string" => Ok(Self::Alpha),
            "rational" => Ok(Self::Rational),
            other => Err(format!("unknown key kind '{other}' (expected alpha or rational)")),
        }
    }
}

/// A densely generatable, totally ordered key.
///
/// `Ord` is the comparison; [`OrderKey::mid`] generates a key strictly
/// between two bounds, where `None` means "no neighbor on that side".
pub trait OrderKey:
    Clone + Ord + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The realization tag written into snapshots.
    const KIND: KeyKind;

    /// Returns a key strictly greater than `left` and strictly less than
    /// `right`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Order`] when both bounds are present and
    /// `left >= right`.
    fn mid(left: Option<&Self>, right: Option<&Self>) -> Result<Self, SiftError>;
}
