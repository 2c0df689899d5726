use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation, resolve_id};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::{Item, Replica};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Title of the new item.
    pub title: String,

    /// Insert directly after this item (full ID or unique prefix). Without
    /// it the item goes to the top of the list.
    #[arg(long, value_name = "ID")]
    pub after: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddOutput {
    #[serde(flatten)]
    item: Item,
    order: String,
}

struct AddItem<'a> {
    title: &'a str,
    after: Option<&'a str>,
}

impl Operation for AddItem<'_> {
    type Output = AddOutput;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<AddOutput> {
        let after = self
            .after
            .map(|input| resolve_id(replica.store(), input))
            .transpose()?;
        let record = replica.new_item(self.title, after.as_ref())?;
        Ok(AddOutput {
            item: record.view(),
            order: record.order.to_string(),
        })
    }
}

/// Execute `sift add`.
///
/// # Errors
///
/// Returns an error if `--after` does not resolve to one item, or if the
/// snapshot cannot be locked, read or written.
pub fn run_add(args: &AddArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let op = AddItem {
        title: &args.title,
        after: args.after.as_deref(),
    };
    let result = session::execute(config, &op)?;
    render(output, &result, |r, w| {
        write!(w, "Added ")?;
        item_row(w, &r.item)
    })
}
