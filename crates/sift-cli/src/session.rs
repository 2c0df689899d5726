//! Load, modify and save plumbing shared by every command.
//!
//! A command is an [`Operation`]: a function generic over the order key
//! realization. [`execute`] takes the snapshot lock, reads the realization
//! from the snapshot header, loads the store, runs the operation on a
//! [`Replica`] and writes the store back when the operation mutates it.
//!
//! A snapshot that fails to decode is moved aside to `<file>.corrupt` (or
//! `<file>.corrupt.N` when earlier backups exist) and replaced by an empty
//! store, so a damaged file never blocks the user.

use anyhow::{Context as _, Result};
use sift_core::clock::SystemClock;
use sift_core::config::EffectiveConfig;
use sift_core::lock::SnapshotLock;
use sift_core::order::{AlphaKey, KeyKind, OrderKey, RationalKey};
use sift_core::{ErrorCode, ItemId, ItemStore, Replica, SiftError, snapshot};
use std::fs;
use std::path::{Path, PathBuf};

/// A command body, run once against the realization found on disk.
pub trait Operation {
    type Output;

    /// Whether the store is saved after [`Operation::apply`] succeeds.
    const WRITES: bool;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Self::Output>;
}

/// The config file could not be read or did not name a snapshot.
#[derive(Debug, thiserror::Error)]
#[error("{0:#}")]
pub struct ConfigError(pub anyhow::Error);

/// Failure to turn user input into a single item id.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no item matches '{input}'")]
    NotFound { input: String },

    #[error("'{input}' matches {matches} items")]
    Ambiguous { input: String, matches: usize },
}

impl ResolveError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ItemNotFound,
            Self::Ambiguous { .. } => ErrorCode::AmbiguousId,
        }
    }
}

/// Resolve a full id or a unique id prefix. Tombstones are included so a
/// removed item can still be shown or used as an anchor.
pub fn resolve_id<K: OrderKey>(store: &ItemStore<K>, input: &str) -> Result<ItemId, ResolveError> {
    let input = input.trim();
    if let Ok(id) = input.parse::<ItemId>()
        && store.contains(&id)
    {
        return Ok(id);
    }

    let matches = if input.is_empty() {
        Vec::new()
    } else {
        store.find_by_prefix(input)
    };
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ResolveError::NotFound {
            input: input.to_string(),
        }),
        many => Err(ResolveError::Ambiguous {
            input: input.to_string(),
            matches: many.len(),
        }),
    }
}

/// Run `op` against the snapshot named by `config`.
///
/// A missing snapshot behaves like an empty one of the configured
/// realization; it is created on the first write.
pub fn execute<O: Operation>(config: &EffectiveConfig, op: &O) -> Result<O::Output> {
    let _lock = SnapshotLock::acquire(&config.snapshot, config.lock_timeout)?;
    match detect_kind(config)? {
        KeyKind::Alpha => execute_with::<AlphaKey, O>(config, op),
        KeyKind::Rational => execute_with::<RationalKey, O>(config, op),
    }
}

/// Run `op` against a brand-new empty store of realization `kind` and save
/// the result. An existing snapshot is replaced only when `overwrite` is set;
/// the check happens under the lock.
pub fn execute_fresh<O: Operation>(
    config: &EffectiveConfig,
    kind: KeyKind,
    overwrite: bool,
    op: &O,
) -> Result<O::Output> {
    let _lock = SnapshotLock::acquire(&config.snapshot, config.lock_timeout)?;
    if !overwrite && config.snapshot.exists() {
        anyhow::bail!(
            "{} already exists. Use `sift init --force` to start over.",
            config.snapshot.display()
        );
    }
    match kind {
        KeyKind::Alpha => run_and_save::<AlphaKey, O>(config, ItemStore::new(), op),
        KeyKind::Rational => run_and_save::<RationalKey, O>(config, ItemStore::new(), op),
    }
}

fn detect_kind(config: &EffectiveConfig) -> Result<KeyKind> {
    if !config.snapshot.exists() {
        return Ok(config.keys);
    }
    match snapshot::load_kind(&config.snapshot) {
        Ok(kind) => Ok(kind),
        // The loader quarantines it; fall back to the configured realization.
        Err(SiftError::Serialization(_)) => Ok(config.keys),
        Err(err) => Err(err.into()),
    }
}

fn execute_with<K: OrderKey, O: Operation>(
    config: &EffectiveConfig,
    op: &O,
) -> Result<O::Output> {
    let store = load_or_recover::<K>(&config.snapshot)?;
    if O::WRITES {
        run_and_save(config, store, op)
    } else {
        let mut replica = Replica::with_store(config.replica.as_str(), SystemClock::new(), store);
        op.apply(&mut replica)
    }
}

fn run_and_save<K: OrderKey, O: Operation>(
    config: &EffectiveConfig,
    store: ItemStore<K>,
    op: &O,
) -> Result<O::Output> {
    let mut replica = Replica::with_store(config.replica.as_str(), SystemClock::new(), store);
    let output = op.apply(&mut replica)?;
    snapshot::save(&config.snapshot, replica.store())
        .with_context(|| format!("Failed to save {}", config.snapshot.display()))?;
    Ok(output)
}

/// Load a snapshot, quarantining it and starting empty if it is corrupt.
fn load_or_recover<K: OrderKey>(path: &Path) -> Result<ItemStore<K>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot yet; starting empty");
        return Ok(ItemStore::new());
    }
    match snapshot::load::<K>(path) {
        Ok(store) => Ok(store),
        Err(SiftError::Serialization(reason)) => {
            let backup = quarantine(path)?;
            tracing::warn!(
                path = %path.display(),
                backup = %backup.display(),
                %reason,
                "corrupt snapshot quarantined; starting with an empty list"
            );
            eprintln!(
                "warning: {} could not be read ({reason}); moved it to {}",
                path.display(),
                backup.display()
            );
            Ok(ItemStore::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Move a corrupt snapshot aside. Earlier backups are never overwritten.
fn quarantine(path: &Path) -> Result<PathBuf> {
    let backup = corrupt_path(path);
    fs::rename(path, &backup).with_context(|| {
        format!(
            "Failed to quarantine {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    Ok(backup)
}

/// First of `<file>.corrupt`, `<file>.corrupt.1`, `<file>.corrupt.2`, ...
/// that does not exist yet.
fn corrupt_path(path: &Path) -> PathBuf {
    let mut base = path.file_name().unwrap_or_default().to_os_string();
    base.push(".corrupt");
    let mut candidate = path.with_file_name(&base);
    let mut n = 1_u32;
    while candidate.exists() {
        let mut name = base.clone();
        name.push(format!(".{n}"));
        candidate = path.with_file_name(name);
        n += 1;
    }
    candidate
}
