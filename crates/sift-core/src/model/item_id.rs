use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique, creation-time-biased item identifier (UUIDv7).
///
/// IDs only break ties between equal order keys; they never decide list
/// position on their own. Ordering is byte order of the UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, for compact display.
    #[must_use]
    pub fn short(&self) -> String {
        let mut text = self.0.simple().to_string();
        text.truncate(8);
        text
    }

    /// Returns true if `prefix` matches the start of this ID, ignoring
    /// hyphens and case.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let wanted: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_time_ordered() {
        let ids: Vec<ItemId> = (0..64).map(|_| ItemId::generate()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        assert_eq!(ids[0].as_uuid().get_version_num(), 7);
    }

    #[test]
    fn display_parse_roundtrip() {
        let id = ItemId::generate();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ItemId>().is_err());
    }

    #[test]
    fn prefix_matching_ignores_hyphens_and_case() {
        let id: ItemId = "0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b".parse().unwrap();
        assert!(id.matches_prefix("0190a5b2"));
        assert!(id.matches_prefix("0190A5B2-7C"));
        assert!(!id.matches_prefix("0191"));
        assert!(!id.matches_prefix(""));
        assert_eq!(id.short(), "0190a5b2");
    }

    #[test]
    fn serializes_as_hyphenated_string() {
        let id: ItemId = "0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b\"");
    }
}
