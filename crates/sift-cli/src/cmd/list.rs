use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::projection;
use sift_core::{Item, Replica};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Include removed items.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    items: Vec<Item>,
    total: usize,
}

struct ListItems {
    all: bool,
}

impl Operation for ListItems {
    type Output = Vec<Item>;
    const WRITES: bool = false;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Vec<Item>> {
        Ok(if self.all {
            projection::all_items(replica.store())
        } else {
            replica.visible_items()
        })
    }
}

/// Execute `sift list`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be locked or read.
pub fn run_list(args: &ListArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let items = session::execute(config, &ListItems { all: args.all })?;
    let result = ListOutput {
        total: items.len(),
        items,
    };
    render(output, &result, |r, w| {
        if r.items.is_empty() {
            return writeln!(w, "No items.");
        }
        for item in &r.items {
            item_row(w, item)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sift_core::clock::SystemClock;
    use sift_core::order::AlphaKey;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_all_flag() {
        assert!(!Wrapper::parse_from(["test"]).args.all);
        assert!(Wrapper::parse_from(["test", "--all"]).args.all);
    }

    #[test]
    fn all_includes_tombstones() {
        let mut replica = Replica::<AlphaKey>::new("r", SystemClock::new());
        let gone = replica.new_item("gone", None).unwrap();
        replica.new_item("kept", Some(&gone.id)).unwrap();
        replica.remove(&gone.id).unwrap();

        let visible = ListItems { all: false }.apply(&mut replica).unwrap();
        let all = ListItems { all: true }.apply(&mut replica).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "gone");
    }
}
