use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::item_id::ItemId;
use crate::order::KeyKind;

/// Machine-readable error codes for scripts and the CLI's JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidOrderKey,
    InvalidKeyBounds,
    ItemNotFound,
    ItemRemoved,
    AmbiguousId,
    CorruptSnapshot,
    KeyKindMismatch,
    ConfigParseError,
    SnapshotWriteFailed,
    LockContention,
    SnapshotReadFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidOrderKey => "E1001",
            Self::InvalidKeyBounds => "E1002",
            Self::ItemNotFound => "E2001",
            Self::ItemRemoved => "E2002",
            Self::AmbiguousId => "E2003",
            Self::CorruptSnapshot => "E3001",
            Self::KeyKindMismatch => "E3002",
            Self::ConfigParseError => "E4001",
            Self::SnapshotWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::SnapshotReadFailed => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidOrderKey => "Invalid order key",
            Self::InvalidKeyBounds => "Order key bounds are equal or inverted",
            Self::ItemNotFound => "Item not found",
            Self::ItemRemoved => "Item has been removed",
            Self::AmbiguousId => "Ambiguous item ID",
            Self::CorruptSnapshot => "Snapshot could not be decoded",
            Self::KeyKindMismatch => "Snapshot uses a different order key realization",
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotWriteFailed => "Snapshot write failed",
            Self::LockContention => "Lock contention",
            Self::SnapshotReadFailed => "Snapshot read failed",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidOrderKey | Self::InvalidKeyBounds | Self::ItemNotFound => None,
            Self::ItemRemoved => Some("Removed items are tombstones and cannot be edited."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::CorruptSnapshot => {
                Some("Restore the snapshot from a replica or start over with `sift init`.")
            }
            Self::KeyKindMismatch => {
                Some("Merge only snapshots created with the same `--keys` realization.")
            }
            Self::ConfigParseError => Some("Fix syntax in sift/config.toml and retry."),
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `sift` process releases its lock."),
            Self::SnapshotReadFailed => Some("Check that the file exists and is readable."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A malformed order key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("order key is empty")]
    Empty,

    #[error("byte {byte:#04x} at position {position} is outside 'a'..='z'")]
    InvalidDigit { byte: u8, position: usize },

    #[error("order key '{key}' ends in the zero digit 'a'")]
    TrailingZeroDigit { key: String },

    #[error("rational key {value} is outside the open interval (0, 1)")]
    OutOfRange { value: String },

    #[error("rational key has a zero denominator")]
    ZeroDenominator,

    #[error("'{value}' is not an integer")]
    NotAnInteger { value: String },
}

/// Bounds passed to a midpoint computation that leave no room between them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("bounds are equal: {key}")]
    Equal { key: String },

    #[error("left bound {left} is not below right bound {right}")]
    Inverted { left: String, right: String },
}

/// Errors returned by every fallible operation of the core.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("item not found: {0}")]
    NotFound(ItemId),

    #[error("item {0} has been removed")]
    ItemRemoved(ItemId),

    #[error("snapshot decode failed: {0}")]
    Serialization(String),

    #[error("snapshot uses {found} keys, expected {expected}")]
    KeyKindMismatch { expected: KeyKind, found: KeyKind },

    #[error("cannot read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write snapshot {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SiftError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::InvalidOrderKey,
            Self::Order(_) => ErrorCode::InvalidKeyBounds,
            Self::NotFound(_) => ErrorCode::ItemNotFound,
            Self::ItemRemoved(_) => ErrorCode::ItemRemoved,
            Self::Serialization(_) => ErrorCode::CorruptSnapshot,
            Self::KeyKindMismatch { .. } => ErrorCode::KeyKindMismatch,
            Self::Read { .. } => ErrorCode::SnapshotReadFailed,
            Self::Write { .. } => ErrorCode::SnapshotWriteFailed,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::InvalidOrderKey,
            ErrorCode::InvalidKeyBounds,
            ErrorCode::ItemNotFound,
            ErrorCode::ItemRemoved,
            ErrorCode::AmbiguousId,
            ErrorCode::CorruptSnapshot,
            ErrorCode::KeyKindMismatch,
            ErrorCode::ConfigParseError,
            ErrorCode::SnapshotWriteFailed,
            ErrorCode::LockContention,
            ErrorCode::SnapshotReadFailed,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::KeyKindMismatch.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn validation_errors_map_to_invalid_key_code() {
        let err = SiftError::from(ValidationError::TrailingZeroDigit {
            key: "ba".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::InvalidOrderKey);
        assert_eq!(err.to_string(), "order key 'ba' ends in the zero digit 'a'");
    }

    #[test]
    fn read_and_write_failures_have_distinct_codes() {
        let missing = || io::Error::from(io::ErrorKind::NotFound);
        let read = SiftError::read("other.json", missing());
        let write = SiftError::write("list.json", missing());
        assert_eq!(read.code(), ErrorCode::SnapshotReadFailed);
        assert_eq!(read.code().code(), "E5003");
        assert_eq!(write.code(), ErrorCode::SnapshotWriteFailed);
        assert!(read.to_string().starts_with("cannot read snapshot other.json"));
    }
}
