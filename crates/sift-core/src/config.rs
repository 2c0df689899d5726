use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::order::KeyKind;

/// Replica id used when nothing else names one.
pub const DEFAULT_REPLICA: &str = "local";

/// `sift/config.toml` contents. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftConfig {
    /// Replica id stamped on every write from this machine.
    #[serde(default)]
    pub replica: Option<String>,
    /// Snapshot file to operate on.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Key realization for newly initialized snapshots.
    #[serde(default)]
    pub keys: KeyKind,
    /// How long to wait for the snapshot lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            replica: None,
            snapshot: None,
            keys: KeyKind::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Settings after flags, environment and config file are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub replica: String,
    pub snapshot: PathBuf,
    pub keys: KeyKind,
    pub lock_timeout: Duration,
}

/// Default location of the user config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sift/config.toml"))
}

/// Default snapshot location when neither flag, env nor config names one.
pub fn default_snapshot_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("sift/sift.json"))
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<SiftConfig> {
    if !path.exists() {
        return Ok(SiftConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SiftConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the config from `explicit`, or from the default user location.
pub fn load_user_config(explicit: Option<&Path>) -> Result<SiftConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) => load_config(&path),
            None => Ok(SiftConfig::default()),
        },
    }
}

/// Combine flags, `SIFT_REPLICA` / `SIFT_FILE` and the config file.
///
/// Precedence (highest wins): flag, environment, config file, default.
pub fn resolve_config(
    config: &SiftConfig,
    replica_flag: Option<&str>,
    file_flag: Option<&Path>,
) -> Result<EffectiveConfig> {
    let env_replica = env::var("SIFT_REPLICA").ok();
    let env_file = env::var_os("SIFT_FILE").map(PathBuf::from);
    resolve_config_inner(
        config,
        replica_flag,
        file_flag,
        env_replica.as_deref(),
        env_file.as_deref(),
        default_snapshot_path(),
    )
}

fn resolve_config_inner(
    config: &SiftConfig,
    replica_flag: Option<&str>,
    file_flag: Option<&Path>,
    env_replica: Option<&str>,
    env_file: Option<&Path>,
    default_snapshot: Option<PathBuf>,
) -> Result<EffectiveConfig> {
    let replica = [replica_flag, env_replica, config.replica.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REPLICA)
        .to_string();

    let snapshot = file_flag
        .or(env_file)
        .map(Path::to_path_buf)
        .or_else(|| config.snapshot.clone())
        .or(default_snapshot)
        .context("No snapshot location: pass --file, set SIFT_FILE, or set `snapshot` in config")?;

    Ok(EffectiveConfig {
        replica,
        snapshot,
        keys: config.keys,
        lock_timeout: Duration::from_millis(config.lock_timeout_ms),
    })
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}
