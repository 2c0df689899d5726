//! Versioned JSON snapshots of an [`ItemStore`].
//!
//! # Format
//!
//! ```json
//! {
//!   "format": "sift-snapshot",
//!   "version": 1,
//!   "keys": "alpha",
//!   "items": [
//!     {
//!       "id": "0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b",
//!       "order": "n",
//!       "title": { "value": "buy milk", "wall_ts": 1718000000000000, "replica": "laptop" },
//!       "state": { "value": "unchecked", "wall_ts": 1718000000000000, "replica": "laptop" }
//!     }
//!   ]
//! }
//! ```
//!
//! Rational snapshots write `"keys": "rational"` and each `order` as
//! `{ "num": "3", "den": "8" }`. Timestamps are integer microseconds. Every
//! value round-trips exactly.
//!
//! Decoding re-validates every order key, rejects duplicate ids and refuses a
//! snapshot written with a different key realization than the one requested.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SiftError;
use crate::model::ItemRecord;
use crate::order::{KeyKind, OrderKey};
use crate::store::ItemStore;

/// Value of the `format` field.
pub const FORMAT: &str = "sift-snapshot";

/// Current snapshot schema version.
pub const VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Header {
    format: String,
    version: u32,
    keys: KeyKind,
}

#[derive(Debug, Serialize)]
struct DocumentRef<'a, K> {
    format: &'static str,
    version: u32,
    keys: KeyKind,
    items: Vec<&'a ItemRecord<K>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "K: OrderKey"))]
struct Document<K> {
    items: Vec<ItemRecord<K>>,
}

/// Read only the header and report which key realization a snapshot uses.
///
/// # Errors
///
/// Returns [`SiftError::Serialization`] if the header is missing, malformed,
/// or names an unsupported format or version.
pub fn peek_kind(text: &str) -> Result<KeyKind, SiftError> {
    let header: Header = serde_json::from_str(text).map_err(decode_error)?;
    if header.format != FORMAT {
        return Err(SiftError::Serialization(format!(
            "unexpected format '{}' (expected '{FORMAT}')",
            header.format
        )));
    }
    if header.version != VERSION {
        return Err(SiftError::Serialization(format!(
            "unsupported snapshot version {} (expected {VERSION})",
            header.version
        )));
    }
    Ok(header.keys)
}

/// Serialize a store to snapshot JSON.
///
/// # Errors
///
/// Returns [`SiftError::Serialization`] if serialization fails.
pub fn encode<K: OrderKey>(store: &ItemStore<K>) -> Result<String, SiftError> {
    let doc = DocumentRef {
        format: FORMAT,
        version: VERSION,
        keys: K::KIND,
        items: store.records().collect(),
    };
    let mut text = serde_json::to_string_pretty(&doc)
        .map_err(|e| SiftError::Serialization(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Decode snapshot JSON into a store of `K` keys.
///
/// # Errors
///
/// - [`SiftError::KeyKindMismatch`] if the snapshot uses the other key realization.
/// - [`SiftError::Serialization`] for any malformed content.
pub fn decode<K: OrderKey>(text: &str) -> Result<ItemStore<K>, SiftError> {
    let found = peek_kind(text)?;
    if found != K::KIND {
        return Err(SiftError::KeyKindMismatch {
            expected: K::KIND,
            found,
        });
    }

    let doc: Document<K> = serde_json::from_str(text).map_err(decode_error)?;
    let mut seen = BTreeSet::new();
    let mut store = ItemStore::new();
    for record in doc.items {
        if !seen.insert(record.id) {
            return Err(SiftError::Serialization(format!(
                "duplicate item id {}",
                record.id
            )));
        }
        store.insert(record);
    }
    Ok(store)
}

/// Load a snapshot file.
///
/// # Errors
///
/// Returns [`SiftError::Read`] if the file cannot be read,
/// [`SiftError::Serialization`] if it is not UTF-8, otherwise the errors of
/// [`decode`].
pub fn load<K: OrderKey>(path: &Path) -> Result<ItemStore<K>, SiftError> {
    let text = read_text(path)?;
    let store = decode(&text)?;
    tracing::debug!(path = %path.display(), items = store.len(), "loaded snapshot");
    Ok(store)
}

/// Read just the key realization of a snapshot file.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_kind(path: &Path) -> Result<KeyKind, SiftError> {
    peek_kind(&read_text(path)?)
}

/// Bytes that are not UTF-8 are a damaged document, not an I/O failure.
fn read_text(path: &Path) -> Result<String, SiftError> {
    let bytes = fs::read(path).map_err(|e| SiftError::read(path, e))?;
    String::from_utf8(bytes)
        .map_err(|e| SiftError::Serialization(format!("snapshot is not valid UTF-8: {e}")))
}

/// Write a snapshot file atomically.
///
/// The document is written to a sibling temp file, flushed, and renamed over
/// `path`, so readers never observe a half-written snapshot. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`SiftError::Write`] on any filesystem failure.
pub fn save<K: OrderKey>(path: &Path, store: &ItemStore<K>) -> Result<(), SiftError> {
    let text = encode(store)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SiftError::write(parent, e))?;
    }

    let tmp = temp_path(path);
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    if let Err(err) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(SiftError::write(path, err));
    }

    tracing::debug!(path = %path.display(), items = store.len(), "saved snapshot");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[allow(clippy::needless_pass_by_value)]
fn decode_error(err: serde_json::Error) -> SiftError {
    SiftError::Serialization(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::order::{AlphaKey, RationalKey};
    use crate::replica::Replica;

    fn sample_alpha() -> ItemStore<AlphaKey> {
        let mut r = Replica::new("laptop", ManualClock::starting_at(1_718_000_000_000_000));
        let a = r.new_item("buy milk", None).unwrap();
        let b = r.new_item("walk dog", Some(&a.id)).unwrap();
        r.toggle(&b.id).unwrap();
        r.into_store()
    }

    #[test]
    fn alpha_roundtrip_is_exact() {
        let store = sample_alpha();
        let text = encode(&store).unwrap();
        assert!(text.contains("\"keys\": \"alpha\""));
        let back: ItemStore<AlphaKey> = decode(&text).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn rational_roundtrip_is_exact() {
        let mut r = Replica::<RationalKey, _>::new("r", ManualClock::starting_at(7));
        let mut prev = r.new_item("0", None).unwrap();
        for i in 1..40 {
            prev = r.new_item(i.to_string(), Some(&prev.id)).unwrap();
        }
        let store = r.into_store();
        let back: ItemStore<RationalKey> = decode(&encode(&store).unwrap()).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let text = encode(&sample_alpha()).unwrap();
        assert_eq!(peek_kind(&text).unwrap(), KeyKind::Alpha);
        assert!(matches!(
            decode::<RationalKey>(&text),
            Err(SiftError::KeyKindMismatch {
                expected: KeyKind::Rational,
                found: KeyKind::Alpha
            })
        ));
    }

    #[test]
    fn invalid_order_key_is_a_serialization_error() {
        let text = encode(&sample_alpha()).unwrap().replacen("\"order\": \"n\"", "\"order\": \"na\"", 1);
        assert!(matches!(decode::<AlphaKey>(&text), Err(SiftError::Serialization(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = sample_alpha();
        let first = store.records().next().unwrap();
        let item = serde_json::to_string(first).unwrap();
        let text = format!(
            r#"{{"format":"sift-snapshot","version":1,"keys":"alpha","items":[{item},{item}]}}"#
        );
        let err = decode::<AlphaKey>(&text).unwrap_err();
        assert!(err.to_string().contains("duplicate item id"));
    }

    #[test]
    fn wrong_format_or_version_is_rejected() {
        let bad_format = r#"{"format":"other","version":1,"keys":"alpha","items":[]}"#;
        let bad_version = r#"{"format":"sift-snapshot","version":9,"keys":"alpha","items":[]}"#;
        assert!(matches!(peek_kind(bad_format), Err(SiftError::Serialization(_))));
        assert!(matches!(peek_kind(bad_version), Err(SiftError::Serialization(_))));
        assert!(matches!(peek_kind("{not json"), Err(SiftError::Serialization(_))));
    }

    #[test]
    fn empty_store_roundtrips() {
        let text = encode(&ItemStore::<AlphaKey>::new()).unwrap();
        let back: ItemStore<AlphaKey> = decode(&text).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/list.json");
        let store = sample_alpha();

        save(&path, &store).unwrap();
        assert!(!dir.path().join("nested/list.json.tmp").exists());
        assert_eq!(load_kind(&path).unwrap(), KeyKind::Alpha);
        let back: ItemStore<AlphaKey> = load(&path).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load::<AlphaKey>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SiftError::Read { .. }));
        assert_eq!(err.code().code(), "E5003");
    }

    #[test]
    fn non_utf8_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, b"\xff\xfe garbage").unwrap();

        assert!(matches!(load_kind(&path), Err(SiftError::Serialization(_))));
        assert!(matches!(
            load::<AlphaKey>(&path),
            Err(SiftError::Serialization(_))
        ));
    }
}
