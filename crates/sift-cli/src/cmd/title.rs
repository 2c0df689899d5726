use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation, resolve_id};
use anyhow::Result;
use clap::Args;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::{Item, Replica, SiftError};

#[derive(Args, Debug)]
pub struct TitleArgs {
    /// Item to rename (full ID or unique prefix).
    pub id: String,

    /// The new title.
    pub title: String,
}

struct SetTitle<'a> {
    id: &'a str,
    title: &'a str,
}

impl Operation for SetTitle<'_> {
    type Output = Item;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Item> {
        let id = resolve_id(replica.store(), self.id)?;
        replica.set_title(&id, self.title)?;
        let record = replica.store().get(&id).ok_or(SiftError::NotFound(id))?;
        Ok(record.view())
    }
}

/// Execute `sift title`.
///
/// # Errors
///
/// Returns an error if the id does not resolve, the item is removed, or the
/// snapshot cannot be locked, read or written.
pub fn run_title(args: &TitleArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let op = SetTitle {
        id: &args.id,
        title: &args.title,
    };
    let item = session::execute(config, &op)?;
    render(output, &item, |item, w| item_row(w, item))
}
