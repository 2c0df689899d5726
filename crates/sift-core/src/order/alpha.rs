//! Bounded-alphabet string keys.
//!
//! A key is a base-26 fraction written with the digits `'a'` (0) through
//! `'z'` (25), followed by infinitely many implicit zero digits. Because the
//! alphabet is contiguous ASCII, plain byte-wise lexicographic order is the
//! numeric order of the fractions.
//!
//! # Canonical form
//!
//! A key is non-empty, every byte is in `'a'..='z'`, and the last byte is not
//! `'a'`: a trailing zero digit would give the same fraction two spellings.
//!
//! # Midpoint
//!
//! [`mid`] walks digit positions left to right. At each position the left
//! digit (`low`, zero past the end of `left`) and the right digit (`high`)
//! produce a candidate midpoint digit. A candidate strictly above `low`
//! finishes the key. Otherwise `low` is copied and the walk continues. Once a
//! copied digit is strictly below the right digit at that position, the right
//! bound stops constraining deeper positions and is treated as unbounded.
//!
//! An unbounded right side rounds the midpoint up, a concrete right digit
//! rounds it down. This gives `mid("", "") == "n"`, `mid("b", "") == "o"` and
//! `mid("", "b") == "an"`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, SiftError, ValidationError};
use crate::order::{KeyKind, OrderKey};

/// Number of digits in the alphabet.
pub const RADIX: u8 = 26;

/// Digit value standing in for "no right bound" at a position.
const UNBOUNDED: u8 = RADIX;

/// A canonical base-26 fractional key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlphaKey(String);

impl AlphaKey {
    /// Parse and validate a key.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the key is empty, contains a byte
    /// outside `'a'..='z'`, or ends in `'a'`.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        validate(key.as_bytes())?;
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digit positions in the key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; canonical keys are non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AlphaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AlphaKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AlphaKey> for String {
    fn from(key: AlphaKey) -> Self {
        key.0
    }
}

impl OrderKey for AlphaKey {
    const KIND: KeyKind = KeyKind::Alpha;

    fn mid(left: Option<&Self>, right: Option<&Self>) -> Result<Self, SiftError> {
        let left = left.map_or(&b""[..], |k| k.0.as_bytes());
        let right = right.map_or(&b""[..], |k| k.0.as_bytes());
        mid(left, right).map(Self)
    }
}

/// Check that `key` is a canonical, non-empty key.
///
/// # Errors
///
/// Returns the first problem found with the key.
pub fn validate(key: &[u8]) -> Result<(), ValidationError> {
    let Some(&last) = key.last() else {
        return Err(ValidationError::Empty);
    };
    if let Some(position) = key.iter().position(|b| !b.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidDigit {
            byte: key[position],
            position,
        });
    }
    if last == b'a' {
        return Err(ValidationError::TrailingZeroDigit {
            key: String::from_utf8_lossy(key).into_owned(),
        });
    }
    Ok(())
}

/// Compute a key strictly between `left` and `right`.
///
/// An empty `left` is the start of the order; an empty `right` is the end.
///
/// # Errors
///
/// - [`SiftError::Validation`] if a non-empty bound is not canonical.
/// - [`SiftError::Order`] if both bounds are non-empty and `left >= right`.
pub fn mid(left: &[u8], right: &[u8]) -> Result<String, SiftError> {
    if !left.is_empty() {
        validate(left)?;
    }
    if !right.is_empty() {
        validate(right)?;
    }
    if !left.is_empty() && !right.is_empty() {
        match left.cmp(right) {
            Ordering::Less => {}
            Ordering::Equal => {
                return Err(OrderError::Equal {
                    key: String::from_utf8_lossy(left).into_owned(),
                }
                .into());
            }
            Ordering::Greater => {
                return Err(OrderError::Inverted {
                    left: String::from_utf8_lossy(left).into_owned(),
                    right: String::from_utf8_lossy(right).into_owned(),
                }
                .into());
            }
        }
    }

    let mut out = String::with_capacity(left.len().max(right.len()) + 1);
    let mut bounded = !right.is_empty();
    let mut position = 0;
    loop {
        let low = left.get(position).map_or(0, |b| b - b'a');
        let high = if bounded {
            right.get(position).map_or(UNBOUNDED, |b| b - b'a')
        } else {
            UNBOUNDED
        };
        let candidate = if high == UNBOUNDED {
            (low + high).div_ceil(2)
        } else {
            (low + high) / 2
        };

        if candidate > low && candidate < RADIX {
            out.push(char::from(b'a' + candidate));
            return Ok(out);
        }

        out.push(char::from(b'a' + low));
        if low < high {
            bounded = false;
        }
        position += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid_str(left: &str, right: &str) -> String {
        mid(left.as_bytes(), right.as_bytes()).unwrap()
    }

    #[test]
    fn midpoints_match_reference_table() {
        let cases = [
            ("", "", "n"),
            ("b", "", "o"),
            ("", "b", "an"),
            ("n", "", "u"),
            ("", "n", "g"),
            ("z", "", "zn"),
            ("", "z", "m"),
            ("kilroy", "", "s"),
            ("b", "d", "c"),
            ("b", "z", "n"),
            ("bc", "c", "bo"),
            ("ab", "b", "ao"),
            ("", "ab", "aan"),
            ("az", "b", "azn"),
        ];
        for (left, right, expected) in cases {
            assert_eq!(
                mid_str(left, right),
                expected,
                "mid({left:?}, {right:?})"
            );
        }
    }

    #[test]
    fn adjacent_digits_descend_one_level() {
        assert_eq!(mid_str("b", "c"), "bn");
        assert_eq!(mid_str("y", "z"), "yn");
    }

    #[test]
    fn equal_bounds_are_an_order_error() {
        let err = mid(b"b", b"b").unwrap_err();
        assert!(matches!(err, SiftError::Order(OrderError::Equal { .. })));
    }

    #[test]
    fn inverted_bounds_are_an_order_error() {
        for (left, right) in [("n", "m"), ("hb", "h")] {
            let err = mid(left.as_bytes(), right.as_bytes()).unwrap_err();
            assert!(
                matches!(err, SiftError::Order(OrderError::Inverted { .. })),
                "mid({left:?}, {right:?}) -> {err:?}"
            );
        }
    }

    #[test]
    fn malformed_bounds_are_validation_errors() {
        let cases: [(&[u8], &[u8]); 7] = [
            (b"", b"\x00"),
            (b"a\xff", b"b"),
            (b"a", b"b"),
            (b"b", b"baa"),
            (b"c", b"ca0"),
            (b"", b"a"),
            (b"a", b""),
        ];
        for (left, right) in cases {
            let err = mid(left, right).unwrap_err();
            assert!(
                matches!(err, SiftError::Validation(_)),
                "mid({left:?}, {right:?}) -> {err:?}"
            );
        }
    }

    #[test]
    fn trailing_zero_digit_is_rejected() {
        assert_eq!(
            AlphaKey::new("ba"),
            Err(ValidationError::TrailingZeroDigit {
                key: "ba".to_string()
            })
        );
    }

    #[test]
    fn empty_and_uppercase_keys_are_rejected() {
        assert_eq!(AlphaKey::new(""), Err(ValidationError::Empty));
        assert_eq!(
            AlphaKey::new("bC"),
            Err(ValidationError::InvalidDigit {
                byte: b'C',
                position: 1
            })
        );
    }

    #[test]
    fn typed_mid_uses_absent_bounds_as_ends() {
        let first = AlphaKey::mid(None, None).unwrap();
        assert_eq!(first.as_str(), "n");
        let after = AlphaKey::mid(Some(&first), None).unwrap();
        let before = AlphaKey::mid(None, Some(&first)).unwrap();
        assert!(before < first && first < after);
    }

    #[test]
    fn serde_rejects_non_canonical_keys() {
        let key: AlphaKey = serde_json::from_str("\"bn\"").unwrap();
        assert_eq!(key.as_str(), "bn");
        assert!(serde_json::from_str::<AlphaKey>("\"bna\"").is_err());
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"bn\"");
    }
}
