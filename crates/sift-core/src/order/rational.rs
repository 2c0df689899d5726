//! Arbitrary-precision rational keys in the open interval (0, 1).
//!
//! The midpoint of two keys is their arithmetic mean, with a missing left
//! bound read as 0 and a missing right bound read as 1. Repeatedly inserting
//! at the same relative position halves the gap each time, so denominators
//! grow as powers of two. That growth is unbounded and expected.
//!
//! Keys serialize as an exact `{ "num": "...", "den": "..." }` pair of
//! decimal strings in lowest terms, so no precision is ever lost.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, SiftError, ValidationError};
use crate::order::{KeyKind, OrderKey};

/// A rational key strictly between 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RationalRepr", into = "RationalRepr")]
pub struct RationalKey(BigRational);

/// Wire shape of a [`RationalKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RationalRepr {
    num: String,
    den: String,
}

impl RationalKey {
    /// Wrap a rational, rejecting values outside (0, 1).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] for values `<= 0` or `>= 1`.
    pub fn new(value: BigRational) -> Result<Self, ValidationError> {
        if value <= BigRational::zero() || value >= BigRational::one() {
            return Err(ValidationError::OutOfRange {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Build a key from a numerator/denominator pair, reducing to lowest terms.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDenominator`] or
    /// [`ValidationError::OutOfRange`].
    pub fn from_parts(
        numer: impl Into<BigInt>,
        denom: impl Into<BigInt>,
    ) -> Result<Self, ValidationError> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(ValidationError::ZeroDenominator);
        }
        Self::new(BigRational::new(numer.into(), denom))
    }

    #[must_use]
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    #[must_use]
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    #[must_use]
    pub const fn as_ratio(&self) -> &BigRational {
        &self.0
    }
}

impl fmt::Display for RationalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.numer(), self.0.denom())
    }
}

impl TryFrom<RationalRepr> for RationalKey {
    type Error = ValidationError;

    fn try_from(repr: RationalRepr) -> Result<Self, Self::Error> {
        let numer = parse_integer(&repr.num)?;
        let denom = parse_integer(&repr.den)?;
        Self::from_parts(numer, denom)
    }
}

impl From<RationalKey> for RationalRepr {
    fn from(key: RationalKey) -> Self {
        Self {
            num: key.0.numer().to_string(),
            den: key.0.denom().to_string(),
        }
    }
}

fn parse_integer(value: &str) -> Result<BigInt, ValidationError> {
    value
        .parse::<BigInt>()
        .map_err(|_| ValidationError::NotAnInteger {
            value: value.to_string(),
        })
}

impl OrderKey for RationalKey {
    const KIND: KeyKind = KeyKind::Rational;

    fn mid(left: Option<&Self>, right: Option<&Self>) -> Result<Self, SiftError> {
        if let (Some(l), Some(r)) = (left, right) {
            match l.cmp(r) {
                Ordering::Less => {}
                Ordering::Equal => {
                    return Err(OrderError::Equal { key: l.to_string() }.into());
                }
                Ordering::Greater => {
                    return Err(OrderError::Inverted {
                        left: l.to_string(),
                        right: r.to_string(),
                    }
                    .into());
                }
            }
        }

        let low = left.map_or_else(BigRational::zero, |k| k.0.clone());
        let high = right.map_or_else(BigRational::one, |k| k.0.clone());
        let two = BigRational::from_integer(BigInt::from(2));
        Self::new((low + high) / two).map_err(SiftError::from)
    }
}
