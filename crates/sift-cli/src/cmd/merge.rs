use crate::output::{OutputMode, render};
use crate::session::{self, Operation};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::{Replica, snapshot};
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Snapshot file from another replica.
    #[arg(value_name = "OTHER_FILE")]
    pub other: PathBuf,
}

#[derive(Debug, Serialize)]
struct MergeOutput {
    source: String,
    incoming: usize,
    added: usize,
    total: usize,
    visible: usize,
}

struct MergeFrom<'a> {
    other: &'a Path,
}

impl Operation for MergeFrom<'_> {
    type Output = MergeOutput;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<MergeOutput> {
        let other = snapshot::load::<K>(self.other)
            .with_context(|| format!("Failed to read {}", self.other.display()))?;
        let before = replica.store().len();
        replica.merge(&other);
        let total = replica.store().len();
        Ok(MergeOutput {
            source: self.other.display().to_string(),
            incoming: other.len(),
            added: total - before,
            total,
            visible: replica.visible_items().len(),
        })
    }
}

/// Execute `sift merge`: fold another replica's snapshot into ours.
///
/// The other file is only read. Merging the same file twice is a no-op.
///
/// # Errors
///
/// Returns an error if either snapshot cannot be read, if they use different
/// key realizations, or if ours cannot be written.
pub fn run_merge(args: &MergeArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let result = session::execute(config, &MergeFrom { other: &args.other })?;
    render(output, &result, |r, w| {
        writeln!(
            w,
            "Merged {} items from {} ({} new); {} items listed",
            r.incoming, r.source, r.added, r.visible
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::clock::SystemClock;
    use sift_core::order::{AlphaKey, RationalKey};
    use sift_core::{ItemStore, SiftError};

    #[test]
    fn merge_counts_new_records_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");

        let mut theirs = Replica::<AlphaKey>::new("theirs", SystemClock::new());
        theirs.new_item("from them", None).unwrap();
        snapshot::save(&path, theirs.store()).unwrap();

        let mut ours = Replica::<AlphaKey>::new("ours", SystemClock::new());
        ours.new_item("mine", None).unwrap();

        let op = MergeFrom { other: &path };
        let first = op.apply(&mut ours).unwrap();
        assert_eq!((first.incoming, first.added, first.total), (1, 1, 2));

        let second = op.apply(&mut ours).unwrap();
        assert_eq!((second.added, second.total), (0, 2));
    }

    #[test]
    fn merge_rejects_other_realization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        snapshot::save(&path, &ItemStore::<RationalKey>::new()).unwrap();

        let mut ours = Replica::<AlphaKey>::new("ours", SystemClock::new());
        let err = MergeFrom { other: &path }.apply(&mut ours).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiftError>(),
            Some(SiftError::KeyKindMismatch { .. })
        ));
    }
}
