use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sift_core::config::EffectiveConfig;
use sift_core::order::{KeyKind, OrderKey};
use sift_core::{Item, Replica};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Seed the list with four sample items.
    #[arg(long)]
    pub samples: bool,

    /// Order key realization: `alpha` (default) or `rational`.
    #[arg(long, value_name = "KIND")]
    pub keys: Option<KeyKind>,

    /// Replace an existing snapshot with a fresh one.
    #[arg(long)]
    pub force: bool,
}

/// Titles of the sample list and whether each starts checked.
const SAMPLES: [(&str, bool); 4] = [
    ("todo 1", true),
    ("todo 2", false),
    ("todo 3", true),
    ("todo 4", false),
];

#[derive(Debug, Serialize)]
struct InitOutput {
    path: String,
    keys: KeyKind,
    items: Vec<Item>,
}

struct Seed {
    samples: bool,
}

impl Operation for Seed {
    type Output = Vec<Item>;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Vec<Item>> {
        if self.samples {
            let mut last = None;
            for (title, checked) in SAMPLES {
                let record = replica.new_item(title, last.as_ref())?;
                if checked {
                    replica.toggle(&record.id)?;
                }
                last = Some(record.id);
            }
        }
        Ok(replica.visible_items())
    }
}

/// Execute `sift init`: write a new, empty (or sample) snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot exists and `--force` is not set, or if
/// the lock cannot be taken or the file cannot be written.
pub fn run_init(args: &InitArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let keys = args.keys.unwrap_or(config.keys);
    let items = session::execute_fresh(
        config,
        keys,
        args.force,
        &Seed {
            samples: args.samples,
        },
    )?;
    tracing::info!(path = %config.snapshot.display(), %keys, items = items.len(), "initialized snapshot");

    let result = InitOutput {
        path: config.snapshot.display().to_string(),
        keys,
        items,
    };
    render(output, &result, |r, w| {
        writeln!(w, "Initialized {} ({} keys)", r.path, r.keys)?;
        for item in &r.items {
            item_row(w, item)?;
        }
        Ok(())
    })
}
