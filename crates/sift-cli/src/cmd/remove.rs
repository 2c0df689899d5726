use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation, resolve_id};
use anyhow::Result;
use clap::Args;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::{Item, Replica, SiftError};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Item to remove (full ID or unique prefix).
    pub id: String,
}

struct Remove<'a> {
    id: &'a str,
}

impl Operation for Remove<'_> {
    type Output = Item;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Item> {
        let id = resolve_id(replica.store(), self.id)?;
        replica.remove(&id)?;
        let record = replica.store().get(&id).ok_or(SiftError::NotFound(id))?;
        Ok(record.view())
    }
}

/// Execute `sift remove`. Removing an already removed item succeeds.
///
/// # Errors
///
/// Returns an error if the id does not resolve or the snapshot cannot be
/// locked, read or written.
pub fn run_remove(args: &RemoveArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let item = session::execute(config, &Remove { id: &args.id })?;
    render(output, &item, |item, w| {
        write!(w, "Removed ")?;
        item_row(w, item)
    })
}
